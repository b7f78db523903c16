//! Raster preview backend: paints a page onto a 472x472 RGB canvas.
//!
//! Text is anti-aliased through the discovered outline font; with the
//! bitmap fallback, Spleen 12x24 glyphs are nearest-neighbor scaled to
//! the requested cell size. Characters the bitmap font lacks render as
//! a box outline so the preview still shows where text sits.

use std::path::Path;

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use image::{imageops::FilterType, Rgb, RgbImage};
use spleen_font::{PSF2Font, FONT_12X24};

use crate::config::PAGE_PX;
use crate::doc::{DrawOp, Page, TextStyle, BASELINE_RATIO};
use crate::error::EtiketkaError;
use crate::resources::fonts::{FontBook, Typeface};

/// Paint a page onto a fresh white canvas.
pub fn rasterize(page: &Page, fonts: &FontBook) -> RgbImage {
    let side = PAGE_PX as u32;
    let mut canvas = RgbImage::from_pixel(side, side, Rgb([255, 255, 255]));

    for op in &page.ops {
        match op {
            DrawOp::Text { x, y, content, style } => {
                draw_text(&mut canvas, fonts, *x, *y, content, *style);
            }
            DrawOp::Image {
                x,
                y,
                width,
                height,
                image,
            } => {
                paste_image(&mut canvas, *x, *y, *width, *height, image);
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
            } => {
                fill_rect(&mut canvas, *x, *y, *width, *height);
            }
        }
    }

    canvas
}

/// Rasterize and save as PNG.
pub fn write_png(page: &Page, fonts: &FontBook, path: &Path) -> Result<(), EtiketkaError> {
    let canvas = rasterize(page, fonts);
    canvas
        .save(path)
        .map_err(|e| EtiketkaError::Image(format!("preview save {}: {e}", path.display())))
}

fn draw_text(canvas: &mut RgbImage, fonts: &FontBook, x: f32, y: f32, text: &str, style: TextStyle) {
    match fonts.face() {
        Typeface::Outline(_) => {
            // outline() is always Some for the outline face
            if let Some(font) = fonts.outline(style.bold) {
                draw_outline_text(canvas, font, x, y, text, style.size);
            }
        }
        Typeface::Bitmap => draw_bitmap_text(canvas, x, y, text, style.size),
    }
}

fn draw_outline_text(canvas: &mut RgbImage, font: &FontArc, x: f32, y: f32, text: &str, size: f32) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);
    let baseline = y + size * BASELINE_RATIO;
    let mut caret = x;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        let glyph = glyph_id.with_scale_and_position(scale, point(caret, baseline));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let cx = px as i32 + bounds.min.x as i32;
                let cy = py as i32 + bounds.min.y as i32;
                blend(canvas, cx, cy, coverage);
            });
        }

        caret += scaled.h_advance(glyph_id);
    }
}

/// Spleen fallback: each char occupies a `size/2 x size` cell.
fn draw_bitmap_text(canvas: &mut RgbImage, x: f32, y: f32, text: &str, size: f32) {
    let Ok(mut spleen) = PSF2Font::new(FONT_12X24) else {
        return;
    };

    let cell_h = size.round().max(1.0) as usize;
    let cell_w = (size / 2.0).round().max(1.0) as usize;
    let mut caret = x.round() as i32;

    for ch in text.chars() {
        let utf8 = ch.to_string();
        let mut src = vec![false; 12 * 24];
        if let Some(glyph) = spleen.glyph_for_utf8(utf8.as_bytes()) {
            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if row_y < 24 && col_x < 12 {
                        src[row_y * 12 + col_x] = on;
                    }
                }
            }
        } else if !ch.is_whitespace() {
            box_glyph(&mut src, 12, 24);
        }

        // Nearest-neighbor scale from the 12x24 cell.
        for dy in 0..cell_h {
            for dx in 0..cell_w {
                let sx = dx * 12 / cell_w;
                let sy = dy * 24 / cell_h;
                if src[sy * 12 + sx] {
                    blend(canvas, caret + dx as i32, y.round() as i32 + dy as i32, 1.0);
                }
            }
        }
        caret += cell_w as i32;
    }
}

/// Box outline standing in for a character the bitmap font lacks.
fn box_glyph(glyph: &mut [bool], width: usize, height: usize) {
    for x in 0..width {
        glyph[x] = true;
        glyph[(height - 1) * width + x] = true;
    }
    for y in 0..height {
        glyph[y * width] = true;
        glyph[y * width + width - 1] = true;
    }
}

fn paste_image(canvas: &mut RgbImage, x: f32, y: f32, width: f32, height: f32, source: &RgbImage) {
    let target_w = width.round().max(1.0) as u32;
    let target_h = height.round().max(1.0) as u32;
    let resized = if source.dimensions() == (target_w, target_h) {
        source.clone()
    } else {
        image::DynamicImage::ImageRgb8(source.clone())
            .resize_exact(target_w, target_h, FilterType::Lanczos3)
            .to_rgb8()
    };

    let ox = x.round() as i32;
    let oy = y.round() as i32;
    for (px, py, pixel) in resized.enumerate_pixels() {
        let cx = ox + px as i32;
        let cy = oy + py as i32;
        if cx >= 0 && cy >= 0 && (cx as u32) < canvas.width() && (cy as u32) < canvas.height() {
            canvas.put_pixel(cx as u32, cy as u32, *pixel);
        }
    }
}

fn fill_rect(canvas: &mut RgbImage, x: f32, y: f32, width: f32, height: f32) {
    let x0 = x.round().max(0.0) as u32;
    let y0 = y.round().max(0.0) as u32;
    let x1 = ((x + width).round() as u32).min(canvas.width());
    let y1 = ((y + height).round() as u32).min(canvas.height());
    for cy in y0..y1 {
        for cx in x0..x1 {
            canvas.put_pixel(cx, cy, Rgb([0, 0, 0]));
        }
    }
}

/// Coverage blend toward black, clipped to the canvas.
fn blend(canvas: &mut RgbImage, x: i32, y: i32, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    let mix = |c: u8| (c as f32 * (1.0 - coverage)).round() as u8;
    *pixel = Rgb([mix(pixel[0]), mix(pixel[1]), mix(pixel[2])]);
}
