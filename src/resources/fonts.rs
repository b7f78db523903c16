//! Typeface discovery and text measurement.
//!
//! Best-effort system-font discovery: the first readable TTF pair from
//! the configured overrides or the platform probe list wins. When
//! nothing is found the engine falls back to the built-in Spleen
//! bitmap face; rendering degrades but never fails.
//!
//! All width measurement routes through here, against the face that
//! will actually draw the text. Proportional fonts make per-character
//! estimates wrong, so outline widths are summed glyph advances.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};

use crate::config::{system_font_candidates, Config};
use crate::doc::TextStyle;
use crate::observer::{BatchObserver, Level};

/// Spleen 12x24 cell proportions, used for bitmap-fallback metrics.
const BITMAP_ASPECT: f32 = 0.5;

/// A discovered outline family: regular + bold, with the raw bytes
/// kept for PDF embedding.
pub struct OutlineFamily {
    pub regular: FontArc,
    pub bold: FontArc,
    pub regular_bytes: Arc<Vec<u8>>,
    pub bold_bytes: Arc<Vec<u8>>,
}

/// The active typeface for a batch.
pub enum Typeface {
    Outline(OutlineFamily),
    /// Built-in Spleen bitmap fallback (fixed-width cells).
    Bitmap,
}

/// Engine-owned font state: one face, loaded once per engine.
pub struct FontBook {
    face: Typeface,
}

impl FontBook {
    /// Probe configured overrides, then the platform font list.
    /// Never fails; logs a warning and falls back to the bitmap face.
    pub fn discover(config: &Config, observer: &dyn BatchObserver) -> Self {
        let mut candidates: Vec<(PathBuf, PathBuf)> = Vec::new();
        if let Some(regular) = &config.font_regular {
            let bold = config.font_bold.clone().unwrap_or_else(|| regular.clone());
            candidates.push((regular.clone(), bold));
        }
        candidates.extend(system_font_candidates());

        for (regular_path, bold_path) in candidates {
            let Ok(regular_bytes) = fs::read(&regular_path) else {
                continue;
            };
            // A missing bold face reuses the regular file.
            let bold_bytes = fs::read(&bold_path).unwrap_or_else(|_| regular_bytes.clone());

            let Ok(regular) = FontArc::try_from_vec(regular_bytes.clone()) else {
                observer.record(
                    Level::Warning,
                    &format!("font load error: {}", regular_path.display()),
                );
                continue;
            };
            let bold = FontArc::try_from_vec(bold_bytes.clone())
                .unwrap_or_else(|_| regular.clone());

            return Self {
                face: Typeface::Outline(OutlineFamily {
                    regular,
                    bold,
                    regular_bytes: Arc::new(regular_bytes),
                    bold_bytes: Arc::new(bold_bytes),
                }),
            };
        }

        observer.record(
            Level::Warning,
            "no system font found, using built-in bitmap font",
        );
        Self {
            face: Typeface::Bitmap,
        }
    }

    /// Force the bitmap fallback (deterministic tests).
    pub fn bitmap() -> Self {
        Self {
            face: Typeface::Bitmap,
        }
    }

    pub fn face(&self) -> &Typeface {
        &self.face
    }

    /// The outline font matching a style, when one is loaded.
    pub fn outline(&self, bold: bool) -> Option<&FontArc> {
        match &self.face {
            Typeface::Outline(family) => Some(if bold { &family.bold } else { &family.regular }),
            Typeface::Bitmap => None,
        }
    }

    /// Raw TTF bytes for PDF embedding.
    pub fn outline_bytes(&self, bold: bool) -> Option<Arc<Vec<u8>>> {
        match &self.face {
            Typeface::Outline(family) => Some(if bold {
                family.bold_bytes.clone()
            } else {
                family.regular_bytes.clone()
            }),
            Typeface::Bitmap => None,
        }
    }

    /// Measured width of `text` at `style`, in working-space pixels.
    pub fn text_width(&self, text: &str, style: TextStyle) -> f32 {
        match &self.face {
            Typeface::Outline(family) => {
                let font = if style.bold {
                    &family.bold
                } else {
                    &family.regular
                };
                let scaled = font.as_scaled(PxScale::from(style.size));
                text.chars()
                    .map(|ch| scaled.h_advance(font.glyph_id(ch)))
                    .sum()
            }
            // Fixed-width cells: the advance is the cell width, which
            // is the font's actual metric, not an estimate.
            Typeface::Bitmap => text.chars().count() as f32 * style.size * BITMAP_ASPECT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_width_is_cell_count() {
        let book = FontBook::bitmap();
        let style = TextStyle::regular(20.0);
        assert_eq!(book.text_width("abcd", style), 4.0 * 10.0);
        assert_eq!(book.text_width("", style), 0.0);
        // Cyrillic counts by scalar, not byte
        assert_eq!(book.text_width("кг", style), 2.0 * 10.0);
    }

    #[test]
    fn bitmap_face_has_no_outline() {
        let book = FontBook::bitmap();
        assert!(book.outline(false).is_none());
        assert!(book.outline_bytes(true).is_none());
    }

    #[test]
    fn wider_text_measures_wider() {
        let book = FontBook::bitmap();
        let style = TextStyle::bold(16.0);
        assert!(book.text_width("длинная строка", style) > book.text_width("кг", style));
    }
}
