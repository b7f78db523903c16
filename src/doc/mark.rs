//! Shipping-mark composition.
//!
//! A mostly-static page: the conventional mark image scaled to width
//! 270 at the top, the row's logo under it, then the fill-in lines
//! (Количество, Вес нетто, Вес брутто) with right-aligned unit
//! suffixes. Only the article line carries row data.

use std::sync::Arc;

use crate::doc::{Page, TextStyle};
use crate::observer::BatchObserver;
use crate::resources::fonts::FontBook;
use crate::resources::{scale_to_width, thumbnail, ResourceCache};
use crate::sheet::normalize::{CanonicalRow, Field};

const TEXT_X: f32 = 50.0;
const LINE_PITCH: f32 = 40.0;
const TEXT_SIZE: f32 = 20.0;
const MARK_WIDTH: u32 = 270;
const LOGO_MAX: u32 = 200;
/// Right edge inset for the unit suffix.
const UNIT_INSET: f32 = 50.0;

/// Compose the shipping-mark page for one normalized row.
pub fn compose(
    row: &CanonicalRow,
    resources: &ResourceCache,
    fonts: &FontBook,
    observer: &dyn BatchObserver,
) -> Page {
    let mut page = Page::new();

    let mut mark_height = 0.0f32;
    let mut has_mark = false;
    if let Some(mark) = resources.mark_image(observer) {
        let scaled = scale_to_width(&mark, MARK_WIDTH);
        let (w, h) = scaled.dimensions();
        mark_height = h as f32;
        has_mark = true;
        page.image(5.0, 3.0, w as f32, h as f32, Arc::new(scaled));
    }

    if let Some(logo) = resources.logo(row.get(Field::Logo), observer) {
        let shrunk = thumbnail(&logo, LOGO_MAX);
        let (w, h) = shrunk.dimensions();
        page.image(10.0, mark_height + 20.0, w as f32, h as f32, Arc::new(shrunk));
    }

    let title = TextStyle::bold(TEXT_SIZE);
    let body = TextStyle::regular(TEXT_SIZE);
    let mut y = if has_mark { mark_height + 120.0 } else { 120.0 };

    // The article slot advances even when empty, keeping the fill-in
    // lines at fixed positions across a batch.
    let code = row.get(Field::Code);
    if !code.is_empty() {
        page.text(TEXT_X, y, format!("Артикул: {code}"), title);
    }
    y += LINE_PITCH;

    page.text(TEXT_X, y, "Количество:", body);
    y += LINE_PITCH;

    let kg_width = fonts.text_width("кг", body);
    let kg_x = 472.0 - UNIT_INSET - kg_width;

    page.text(TEXT_X, y, "Вес нетто:", body);
    page.text(kg_x, y, "кг", body);
    y += LINE_PITCH;

    page.text(TEXT_X, y, "Вес брутто:", body);
    page.text(kg_x, y, "кг", body);

    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::observer::NoopObserver;
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn row(pairs: &[(Field, &str)]) -> CanonicalRow {
        let mut row = CanonicalRow::default();
        for (field, value) in pairs {
            row.set(*field, *value);
        }
        row
    }

    fn fixtures() -> (TempDir, ResourceCache, FontBook) {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path(), dir.path().join("out"));
        (dir, ResourceCache::new(&config), FontBook::bitmap())
    }

    fn write_png(path: &std::path::Path, width: u32, height: u32) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut img = RgbaImage::new(width, height);
        for p in img.pixels_mut() {
            *p = Rgba([0, 0, 0, 255]);
        }
        img.save(path).unwrap();
    }

    #[test]
    fn static_lines_are_always_present() {
        let (_dir, resources, fonts) = fixtures();
        let page = compose(&row(&[]), &resources, &fonts, &NoopObserver);

        let texts = page.text_contents();
        assert_eq!(
            texts,
            vec!["Количество:", "Вес нетто:", "кг", "Вес брутто:", "кг"]
        );
    }

    #[test]
    fn article_line_prints_the_row_code() {
        let (_dir, resources, fonts) = fixtures();
        let page = compose(
            &row(&[(Field::Code, "12345")]),
            &resources,
            &fonts,
            &NoopObserver,
        );

        assert!(page.text_contents().contains(&"Артикул: 12345"));
    }

    #[test]
    fn text_block_shifts_below_the_mark_image() {
        let (dir, resources, fonts) = fixtures();
        write_png(
            &dir.path().join("img/mark_images/mark_images.png"),
            540,
            200,
        );
        let page = compose(&row(&[]), &resources, &fonts, &NoopObserver);

        assert_eq!(page.image_count(), 1);
        // 540x200 scaled to width 270 -> height 100; the text block
        // starts at 220 and the first printed line sits one pitch down
        // (the empty article slot still advances).
        let first_text_y = page.ops.iter().find_map(|op| match op {
            crate::doc::DrawOp::Text { y, .. } => Some(*y),
            _ => None,
        });
        assert_eq!(first_text_y, Some(100.0 + 120.0 + LINE_PITCH));
    }

    #[test]
    fn unit_suffix_is_right_aligned() {
        let (_dir, resources, fonts) = fixtures();
        let page = compose(&row(&[]), &resources, &fonts, &NoopObserver);

        let kg_width = fonts.text_width("кг", TextStyle::regular(TEXT_SIZE));
        let kg_x = page.ops.iter().find_map(|op| match op {
            crate::doc::DrawOp::Text { x, content, .. } if content == "кг" => Some(*x),
            _ => None,
        });
        assert_eq!(kg_x, Some(472.0 - 50.0 - kg_width));
    }

    #[test]
    fn logo_is_pasted_below_the_mark_image() {
        let (dir, resources, fonts) = fixtures();
        write_png(
            &dir.path().join("img/mark_images/mark_images.png"),
            270,
            100,
        );
        write_png(&dir.path().join("img/logos/acme.png"), 50, 40);
        let page = compose(
            &row(&[(Field::Logo, "acme")]),
            &resources,
            &fonts,
            &NoopObserver,
        );

        assert_eq!(page.image_count(), 2);
        let logo_y = page
            .ops
            .iter()
            .filter_map(|op| match op {
                crate::doc::DrawOp::Image { y, width, .. } if *width == 50.0 => Some(*y),
                _ => None,
            })
            .next();
        assert_eq!(logo_y, Some(100.0 + 20.0));
    }
}
