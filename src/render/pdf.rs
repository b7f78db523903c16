//! Vector PDF backend.
//!
//! Writes one 40x40mm page per document. Working-space pixels map to
//! millimeters through the fixed canvas scale, with the y axis flipped
//! for PDF's bottom-left origin. Text uses the discovered TTF embedded
//! into the document, or the builtin Helvetica pair when the engine is
//! on the bitmap fallback. Barcode bars become filled polygons, so the
//! printed symbol stays sharp at any zoom.

use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image as PdfImage, ImageTransform, ImageXObject,
    IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Point, Polygon, Px, Rgb,
};

use crate::config::{MM_PER_PX, PAGE_MM};
use crate::doc::{DrawOp, Page, BASELINE_RATIO};
use crate::error::EtiketkaError;
use crate::resources::fonts::FontBook;

const PT_PER_MM: f32 = 72.0 / 25.4;

fn px_to_mm(px: f32) -> f32 {
    px * MM_PER_PX
}

/// Flip a working-space y coordinate to PDF space.
fn flip_y(px: f32) -> Mm {
    Mm(PAGE_MM - px_to_mm(px))
}

struct FontPair {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl FontPair {
    fn pick(&self, bold: bool) -> &IndirectFontRef {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }
}

/// Render a page to a single-page PDF at `path`.
pub fn write_pdf(
    page: &Page,
    fonts: &FontBook,
    title: &str,
    path: &Path,
) -> Result<(), EtiketkaError> {
    let (doc, first_page, first_layer) = PdfDocument::new(title, Mm(PAGE_MM), Mm(PAGE_MM), "page");
    let layer = doc.get_page(first_page).get_layer(first_layer);
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

    let pair = embed_fonts(&doc, fonts)?;

    for op in &page.ops {
        match op {
            DrawOp::Text { x, y, content, style } => {
                let size_pt = px_to_mm(style.size) * PT_PER_MM;
                let baseline = *y + style.size * BASELINE_RATIO;
                layer.use_text(
                    content,
                    size_pt,
                    Mm(px_to_mm(*x)),
                    flip_y(baseline),
                    pair.pick(style.bold),
                );
            }
            DrawOp::Image {
                x,
                y,
                width,
                height,
                image,
            } => embed_image(&layer, *x, *y, *width, *height, image),
            DrawOp::Rect {
                x,
                y,
                width,
                height,
            } => fill_rect(&layer, *x, *y, *width, *height),
        }
    }

    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| EtiketkaError::Pdf(format!("save {}: {e}", path.display())))
}

/// Embed the discovered TTF pair, or fall back to builtin Helvetica.
fn embed_fonts(
    doc: &printpdf::PdfDocumentReference,
    fonts: &FontBook,
) -> Result<FontPair, EtiketkaError> {
    match (fonts.outline_bytes(false), fonts.outline_bytes(true)) {
        (Some(regular), Some(bold)) => {
            let regular = doc
                .add_external_font(Cursor::new(regular.as_slice()))
                .map_err(|e| EtiketkaError::Pdf(format!("font embed: {e}")))?;
            let bold = doc
                .add_external_font(Cursor::new(bold.as_slice()))
                .map_err(|e| EtiketkaError::Pdf(format!("font embed: {e}")))?;
            Ok(FontPair { regular, bold })
        }
        _ => {
            let regular = doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| EtiketkaError::Pdf(format!("builtin font: {e}")))?;
            let bold = doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| EtiketkaError::Pdf(format!("builtin font: {e}")))?;
            Ok(FontPair { regular, bold })
        }
    }
}

fn embed_image(
    layer: &PdfLayerReference,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    source: &image::RgbImage,
) {
    let (px_w, px_h) = source.dimensions();
    if px_w == 0 || px_h == 0 {
        return;
    }

    let xobject = PdfImage::from(ImageXObject {
        width: Px(px_w as usize),
        height: Px(px_h as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: source.as_raw().clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    // Horizontal placement via DPI; the vertical axis gets an extra
    // scale factor when the target box aspect differs from the pixels.
    let target_w_mm = px_to_mm(width);
    let target_h_mm = px_to_mm(height);
    let dpi = px_w as f32 / (target_w_mm / 25.4);
    let natural_h_mm = px_h as f32 / dpi * 25.4;
    let scale_y = if natural_h_mm > 0.0 {
        target_h_mm / natural_h_mm
    } else {
        1.0
    };

    xobject.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(px_to_mm(x))),
            translate_y: Some(flip_y(y + height)),
            dpi: Some(dpi),
            scale_y: Some(scale_y),
            ..Default::default()
        },
    );
}

fn fill_rect(layer: &PdfLayerReference, x: f32, y: f32, width: f32, height: f32) {
    let left = Mm(px_to_mm(x));
    let right = Mm(px_to_mm(x + width));
    let top = flip_y(y);
    let bottom = flip_y(y + height);

    let ring = vec![
        (Point::new(left, top), false),
        (Point::new(right, top), false),
        (Point::new(right, bottom), false),
        (Point::new(left, bottom), false),
    ];
    layer.add_polygon(Polygon {
        rings: vec![ring],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
}
