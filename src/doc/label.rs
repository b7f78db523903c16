//! Product label composition.
//!
//! Layout on the 472x472 canvas: logo top-right, wrapped name, then
//! the optional descriptive fields flowing downward. The bottom strip
//! is reserved: code/article at (250, 350), barcode box at (250, 390),
//! certification text at (10, 430) with its icon at (10, 360). Fields
//! stop flowing 50px above the floor so they never enter the strip.

use crate::doc::barcode::Ean13Symbol;
use crate::doc::layout::{wrap, Cursor};
use crate::doc::{Page, TextStyle};
use crate::observer::{BatchObserver, Level};
use crate::resources::fonts::FontBook;
use crate::resources::{thumbnail, ResourceCache};
use crate::sheet::normalize::{CanonicalRow, Field};

const FLOOR: f32 = 470.0;
const LEFT_MARGIN: f32 = 10.0;
const NAME_SIZE: f32 = 20.0;
const NAME_LINE: f32 = 20.0;
const FIELD_SIZE: f32 = 16.0;
const FIELD_LINE: f32 = 15.0;
const FIELD_GAP: f32 = 8.0;
/// Fields stop here; everything below belongs to the footer strip.
const FIELD_FLOOR: f32 = FLOOR - 50.0;
const LOGO_MAX: u32 = 200;

/// Descriptive fields in print order, with their printed labels.
const PRINTED_FIELDS: [(Field, &str); 6] = [
    (Field::Purpose, "Назначение"),
    (Field::Material, "Материал"),
    (Field::Manufacturer, "Производитель"),
    (Field::Importer, "Импортер"),
    (Field::Country, "Страна происхождения"),
    (Field::ProductionDate, "Дата изготовления"),
];

/// Compose the label page for one normalized row.
pub fn compose(
    row: &CanonicalRow,
    resources: &ResourceCache,
    fonts: &FontBook,
    observer: &dyn BatchObserver,
) -> Page {
    let mut page = Page::new();
    let mut cursor = Cursor::new(10.0, FLOOR);

    // Logo top-right, shrunk to fit a 200px square.
    let mut logo_width = 0.0f32;
    let mut logo_height = 0.0f32;
    if let Some(logo) = resources.logo(row.get(Field::Logo), observer) {
        let shrunk = thumbnail(&logo, LOGO_MAX);
        let (w, h) = shrunk.dimensions();
        logo_width = w as f32;
        logo_height = h as f32;
        page.image(
            472.0 - logo_width - 5.0,
            5.0,
            logo_width,
            logo_height,
            std::sync::Arc::new(shrunk),
        );
    }

    // Text beside the logo is narrower; below it, nearly full width.
    let beside_logo_width = if logo_width > 0.0 {
        472.0 - logo_width - 15.0
    } else {
        462.0
    };
    let full_width = 462.0;

    // Product name, wrapped bold against the logo-aware width.
    let name_style = TextStyle::bold(NAME_SIZE);
    let name_lines = wrap(
        row.get(Field::Name),
        |s| fonts.text_width(s, name_style),
        beside_logo_width,
    );
    for line in name_lines {
        if !cursor.fits(NAME_LINE) {
            break;
        }
        page.text(LEFT_MARGIN, cursor.y, line, name_style);
        cursor.advance(NAME_LINE);
    }
    cursor.advance(5.0);

    // Descriptive fields: bold label, wrapped regular value after it.
    let label_style = TextStyle::bold(FIELD_SIZE);
    let value_style = TextStyle::regular(FIELD_SIZE);
    for (field, printed) in PRINTED_FIELDS {
        let value = row.get(field);
        if value.is_empty() {
            continue;
        }
        if !cursor.above(FIELD_FLOOR) {
            break;
        }

        let line_width = if cursor.y < 5.0 + logo_height {
            beside_logo_width
        } else {
            full_width
        };

        let label_text = format!("{printed}:");
        let label_width = fonts.text_width(&label_text, label_style);
        page.text(LEFT_MARGIN, cursor.y, label_text, label_style);

        // The first value line shares the row with its label, so it is
        // wrapped against the remainder of that row. The overflow moves
        // back to the left margin and re-wraps against the full width.
        let mut value_lines = wrap(
            value,
            |s| fonts.text_width(s, value_style),
            line_width - label_width - 5.0,
        );
        if !value_lines.is_empty() {
            let first = value_lines.remove(0);
            page.text(LEFT_MARGIN + label_width + 5.0, cursor.y, first, value_style);

            let overflow = value_lines.join(" ");
            let tail_lines = wrap(&overflow, |s| fonts.text_width(s, value_style), line_width);
            for (i, line) in tail_lines.iter().enumerate() {
                let line_y = cursor.y + (i + 1) as f32 * FIELD_LINE;
                if line_y > FIELD_FLOOR {
                    break;
                }
                page.text(LEFT_MARGIN, line_y, line.clone(), value_style);
            }
            cursor.advance((1 + tail_lines.len()) as f32 * FIELD_LINE);
        }
        cursor.advance(FIELD_GAP);
    }

    footer(row, &mut page, &cursor, resources, fonts, observer);
    page
}

/// The reserved bottom strip: identifiers, barcode, certification.
fn footer(
    row: &CanonicalRow,
    page: &mut Page,
    cursor: &Cursor,
    resources: &ResourceCache,
    fonts: &FontBook,
    observer: &dyn BatchObserver,
) {
    let style = TextStyle::regular(FIELD_SIZE);

    // Code / article slot, only when the field flow stayed above it.
    if cursor.above(350.0) {
        let mut slot_y = 350.0;
        for (label, field) in [("Код", Field::Code), ("Артикул", Field::Article)] {
            let value = row.get(field);
            if value.is_empty() {
                continue;
            }
            page.text(250.0, slot_y, format!("{label}: {value}"), style);
            slot_y += 20.0;
        }
    }

    // Barcode box bottom-right.
    let barcode_value = row.get(Field::Barcode);
    if !barcode_value.is_empty() && cursor.above(400.0) {
        match Ean13Symbol::encode(barcode_value) {
            Some(symbol) => symbol.emit(page, fonts, 250.0, 390.0, 200.0, 80.0),
            None => observer.record(
                Level::Warning,
                &format!("barcode value not renderable: {barcode_value}"),
            ),
        }
    }

    // Certification text (two lines fit above the floor) and icon.
    let certification = row.get(Field::Certification);
    if !certification.is_empty() && cursor.above(420.0) {
        let lines = wrap(certification, |s| fonts.text_width(s, style), 250.0);
        for (i, line) in lines.iter().enumerate() {
            let line_y = 430.0 + i as f32 * FIELD_LINE;
            if line_y + FIELD_LINE > FLOOR {
                break;
            }
            page.text(LEFT_MARGIN, line_y, line.clone(), style);
        }

        let cert_type = row.get(Field::CertificationType);
        if !cert_type.is_empty() {
            if let Some(icon) = resources.certification_icon(cert_type, observer) {
                page.image(LEFT_MARGIN, 360.0, 80.0, 80.0, icon);
            }
        }
    }
}
