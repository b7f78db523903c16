//! Document model: a fixed-canvas display list.
//!
//! Builders compose a [`Page`] of [`DrawOp`]s in the 472x472 working
//! pixel space; the backends in [`crate::render`] turn the same ops
//! into a vector PDF page or a raster PNG preview. Keeping the ops
//! backend-neutral is what lets the barcode stay a lossless vector
//! symbol in the PDF while the preview rasterizes it.

pub mod barcode;
pub mod label;
pub mod layout;
pub mod mark;

use std::sync::Arc;

use image::RgbImage;

/// Text styling: pixel size in working space plus weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
}

impl TextStyle {
    pub fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }

    pub fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }
}

/// One drawing instruction in working-space pixels, origin top-left.
#[derive(Debug, Clone)]
pub enum DrawOp {
    /// A single line of text. `y` is the top of the line box; the
    /// baseline sits at `y + style.size * BASELINE_RATIO`.
    Text {
        x: f32,
        y: f32,
        content: String,
        style: TextStyle,
    },
    /// An opaque RGB image scaled into the given box.
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: Arc<RgbImage>,
    },
    /// A filled black rectangle (barcode bars).
    Rect { x: f32, y: f32, width: f32, height: f32 },
}

/// Fraction of the text size from line top to baseline. Matches the
/// typical ascent of the discovered sans faces closely enough that
/// both backends agree on placement.
pub const BASELINE_RATIO: f32 = 0.8;

/// One composed document page, ready for a backend.
#[derive(Debug, Default, Clone)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, x: f32, y: f32, content: impl Into<String>, style: TextStyle) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            content: content.into(),
            style,
        });
    }

    pub fn image(&mut self, x: f32, y: f32, width: f32, height: f32, image: Arc<RgbImage>) {
        self.ops.push(DrawOp::Image {
            x,
            y,
            width,
            height,
            image,
        });
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
        });
    }

    /// All text content on the page, in draw order. Test helper for
    /// asserting what a document says without rendering it.
    pub fn text_contents(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Count of rect ops (bars) on the page.
    pub fn rect_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rect { .. }))
            .count()
    }

    /// Count of image ops on the page.
    pub fn image_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .count()
    }
}
