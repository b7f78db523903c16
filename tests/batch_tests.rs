//! End-to-end batch tests: spreadsheet + resource tree in, document
//! tree out.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use etiketka::archive;
use etiketka::batch::BatchRunner;
use etiketka::config::Config;
use etiketka::observer::test_support::RecordingObserver;
use etiketka::observer::NoopObserver;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Build a minimal xlsx workbook with one sheet of inline strings.
fn write_xlsx(path: &Path, headers: &[&str], rows: &[&[&str]]) {
    fn col_letter(index: usize) -> String {
        let mut name = String::new();
        let mut n = index;
        loop {
            name.insert(0, (b'A' + (n % 26) as u8) as char);
            if n < 26 {
                break;
            }
            n = n / 26 - 1;
        }
        name
    }

    fn sheet_row(row_index: usize, cells: &[&str]) -> String {
        let mut xml = format!("<row r=\"{}\">", row_index + 1);
        for (col, value) in cells.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            xml.push_str(&format!(
                "<c r=\"{}{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                col_letter(col),
                row_index + 1,
                value
            ));
        }
        xml.push_str("</row>");
        xml
    }

    let mut sheet = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
         <sheetData>",
    );
    sheet.push_str(&sheet_row(0, headers));
    for (i, row) in rows.iter().enumerate() {
        sheet.push_str(&sheet_row(i + 1, row));
    }
    sheet.push_str("</sheetData></worksheet>");

    let content_types = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
        <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
        <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
        <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>\
        <Override PartName=\"/xl/worksheets/sheet1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>\
        </Types>";
    let root_rels = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
        <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"xl/workbook.xml\"/>\
        </Relationships>";
    let workbook = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
        xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
        <sheets><sheet name=\"Лист1\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>";
    let workbook_rels = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
        <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet1.xml\"/>\
        </Relationships>";

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, body) in [
        ("[Content_Types].xml", content_types),
        ("_rels/.rels", root_rels),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", workbook_rels),
        ("xl/worksheets/sheet1.xml", sheet.as_str()),
    ] {
        writer.start_file(name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn write_png(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]));
    img.save(path).unwrap();
}

fn pdf_header_ok(path: &Path) -> bool {
    fs::read(path)
        .map(|bytes| bytes.starts_with(b"%PDF-"))
        .unwrap_or(false)
}

#[test]
fn nominal_batch_renders_both_documents_per_row() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("Товары.xlsx");
    write_xlsx(
        &sheet,
        &["наименование", "артикул", "код", "штрихкод"],
        &[
            &["Футболка", "TSH-001", "100", "4600000000011"],
            &["Кепка", "CAP-002", "200", ""],
        ],
    );

    let config = Config::new(dir.path(), dir.path().join("output"));
    let runner = BatchRunner::new(config, &NoopObserver);
    let summary = runner.process(&sheet).unwrap();

    assert_eq!(summary.labels, 2);
    assert_eq!(summary.marks, 2);
    assert_eq!(summary.skipped, 0);
    assert!(summary.succeeded());

    let labels = dir.path().join("output/labels");
    let marks = dir.path().join("output/marks");
    assert!(pdf_header_ok(&labels.join("label_TSH-001_100.pdf")));
    assert!(pdf_header_ok(&labels.join("label_CAP-002_200.pdf")));
    assert!(pdf_header_ok(&marks.join("mark_TSH-001_100.pdf")));
    assert!(pdf_header_ok(&marks.join("mark_CAP-002_200.pdf")));
}

#[test]
fn a_blank_name_inherits_from_the_reference_row() {
    // наименование is not an identifying field, so the reference row
    // donates it; the second row still renders.
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("data.xlsx");
    write_xlsx(
        &sheet,
        &["наименование", "артикул"],
        &[&["Футболка", "TSH-001"], &["", "CAP-002"]],
    );

    let config = Config::new(dir.path(), dir.path().join("output"));
    let runner = BatchRunner::new(config, &NoopObserver);
    let summary = runner.process(&sheet).unwrap();

    assert_eq!(summary.labels, 2);
    assert_eq!(summary.skipped, 0);
    assert!(pdf_header_ok(
        &dir.path().join("output/labels/label_CAP-002_.pdf")
    ));
}

#[test]
fn rows_without_a_name_are_skipped_with_a_warning() {
    // No наименование column at all: nothing can donate a name, so
    // every row is rejected and the batch fails overall.
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("data.xlsx");
    write_xlsx(&sheet, &["артикул"], &[&["GHOST-001"]]);

    let observer = RecordingObserver::default();
    let config = Config::new(dir.path(), dir.path().join("output"));
    let runner = BatchRunner::new(config, &observer);
    let summary = runner.process(&sheet).unwrap();

    assert_eq!(summary.labels, 0);
    assert_eq!(summary.marks, 0);
    assert_eq!(summary.skipped, 1);
    assert!(!summary.succeeded());
    assert!(observer
        .warnings()
        .iter()
        .any(|w| w.contains("наименование")));
    assert!(!dir
        .path()
        .join("output/labels/label_GHOST-001_.pdf")
        .exists());
}

#[test]
fn rows_without_identifiers_use_the_positional_index() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("data.xlsx");
    write_xlsx(&sheet, &["наименование"], &[&["Безымянный товар"]]);

    let config = Config::new(dir.path(), dir.path().join("output"));
    let runner = BatchRunner::new(config, &NoopObserver);
    let summary = runner.process(&sheet).unwrap();

    assert_eq!(summary.labels, 1);
    assert!(pdf_header_ok(
        &dir.path().join("output/labels/label_row_0.pdf")
    ));
    assert!(pdf_header_ok(&dir.path().join("output/marks/mark_row_0.pdf")));
}

#[test]
fn eleven_digit_barcode_is_omitted_but_the_label_still_renders() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("data.xlsx");
    write_xlsx(
        &sheet,
        &["наименование", "артикул", "код", "штрихкод"],
        &[&["Товар", "A-1", "7", "46000000000"]],
    );

    let observer = RecordingObserver::default();
    let config = Config::new(dir.path(), dir.path().join("output"));
    let runner = BatchRunner::new(config, &observer);
    let summary = runner.process(&sheet).unwrap();

    assert_eq!(summary.labels, 1);
    assert!(pdf_header_ok(
        &dir.path().join("output/labels/label_A-1_7.pdf")
    ));
    assert!(observer
        .warnings()
        .iter()
        .any(|w| w.contains("not renderable")));
}

#[test]
fn forbidden_filename_characters_are_replaced() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("data.xlsx");
    write_xlsx(
        &sheet,
        &["наименование", "артикул", "код"],
        &[&["Товар", "A/B", "1*2"]],
    );

    let config = Config::new(dir.path(), dir.path().join("output"));
    let runner = BatchRunner::new(config, &NoopObserver);
    runner.process(&sheet).unwrap();

    assert!(pdf_header_ok(
        &dir.path().join("output/labels/label_A_B_1_2.pdf")
    ));
}

#[test]
fn previews_are_written_when_enabled() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("data.xlsx");
    write_xlsx(
        &sheet,
        &["наименование", "артикул", "код"],
        &[&["Товар", "A-1", "7"]],
    );

    let mut config = Config::new(dir.path(), dir.path().join("output"));
    config.raster_previews = true;
    let runner = BatchRunner::new(config, &NoopObserver);
    runner.process(&sheet).unwrap();

    let labels = dir.path().join("output/labels");
    assert!(labels.join("label_A-1_7.pdf").exists());
    assert!(labels.join("label_A-1_7.png").exists());

    let preview = image::open(labels.join("label_A-1_7.png")).unwrap();
    assert_eq!(preview.width(), 472);
    assert_eq!(preview.height(), 472);
}

#[test]
fn logos_and_mark_images_are_picked_up_from_the_resource_tree() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("img/logos/acme.png"), 100, 60);
    write_png(&dir.path().join("img/mark_images/mark_images.png"), 270, 90);

    let sheet = dir.path().join("data.xlsx");
    write_xlsx(
        &sheet,
        &["наименование", "артикул", "код", "лого"],
        &[&["Товар", "A-1", "7", "ACME"]],
    );

    let config = Config::new(dir.path(), dir.path().join("output"));
    let runner = BatchRunner::new(config, &NoopObserver);
    let summary = runner.process(&sheet).unwrap();
    assert_eq!(summary.labels, 1);
    assert_eq!(summary.marks, 1);
}

#[test]
fn progress_is_reported_at_the_end_of_the_batch() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("data.xlsx");
    write_xlsx(
        &sheet,
        &["наименование", "артикул", "код"],
        &[&["Один", "A", "1"], &["Два", "B", "2"], &["Три", "C", "3"]],
    );

    let observer = RecordingObserver::default();
    let config = Config::new(dir.path(), dir.path().join("output"));
    let runner = BatchRunner::new(config, &observer);
    runner.process(&sheet).unwrap();

    let calls = observer.progress_calls.lock().unwrap().clone();
    assert_eq!(calls, vec![(3, 3)]);
}

#[test]
fn progress_is_reported_every_twenty_five_rows() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("data.xlsx");
    let names: Vec<String> = (0..26).map(|i| format!("Товар {i}")).collect();
    let rows: Vec<Vec<&str>> = names.iter().map(|n| vec![n.as_str()]).collect();
    let row_refs: Vec<&[&str]> = rows.iter().map(|r| r.as_slice()).collect();
    write_xlsx(&sheet, &["наименование"], &row_refs);

    let observer = RecordingObserver::default();
    let config = Config::new(dir.path(), dir.path().join("output"));
    let runner = BatchRunner::new(config, &observer);
    runner.process(&sheet).unwrap();

    let calls = observer.progress_calls.lock().unwrap().clone();
    assert_eq!(calls, vec![(25, 26), (26, 26)]);
}

#[test]
fn unreadable_spreadsheet_is_an_error() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("broken.xlsx");
    fs::write(&bogus, b"not a workbook").unwrap();

    let config = Config::new(dir.path(), dir.path().join("output"));
    let runner = BatchRunner::new(config, &NoopObserver);
    assert!(runner.process(&bogus).is_err());
}

#[test]
fn archive_bundle_round_trip() {
    // Build an upload bundle the way the HTTP shell receives it.
    let source = TempDir::new().unwrap();
    write_xlsx(
        &source.path().join("bundle/Товары.xlsx"),
        &["наименование", "артикул", "код"],
        &[&["Товар", "A-1", "7"]],
    );
    write_png(&source.path().join("bundle/img/logos/acme.png"), 40, 40);

    let work = TempDir::new().unwrap();
    let upload = work.path().join("upload.zip");
    archive::pack(source.path(), &upload).unwrap();

    // Shell flow: unpack, locate, process, pack.
    let input = work.path().join("input");
    fs::create_dir_all(&input).unwrap();
    archive::unpack(&upload, &input).unwrap();

    let spreadsheet = archive::find_spreadsheet(&input).unwrap();
    let base = archive::find_image_base(&input).unwrap();
    assert!(base.ends_with("bundle"));

    let output = work.path().join("output");
    let config = Config::new(&base, &output);
    let runner = BatchRunner::new(config, &NoopObserver);
    let summary = runner.process(&spreadsheet).unwrap();
    assert!(summary.succeeded());

    let result = work.path().join("result.zip");
    archive::pack(&output, &result).unwrap();

    let mut result_zip = zip::ZipArchive::new(File::open(&result).unwrap()).unwrap();
    let names: Vec<String> = (0..result_zip.len())
        .map(|i| result_zip.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(names.contains(&"labels/label_A-1_7.pdf".to_string()));
    assert!(names.contains(&"marks/mark_A-1_7.pdf".to_string()));
}
