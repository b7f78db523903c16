//! EAN-13 barcode rendering.
//!
//! The symbol is emitted as vector ops (bar rectangles plus a
//! human-readable digit row), so it scales losslessly with the page.
//! Values that do not normalize to 12/13 digits are simply not
//! renderable; callers omit the symbol and keep the document.

use barcoders::sym::ean13::EAN13;

use crate::doc::{Page, TextStyle};
use crate::resources::fonts::FontBook;

/// Natural (unscaled) symbol geometry, in abstract module units:
/// 95 modules of bars plus a quiet zone either side.
const QUIET_ZONE: f32 = 5.0;
const MODULE_COUNT: f32 = 95.0;
pub const NATURAL_WIDTH: f32 = MODULE_COUNT + 2.0 * QUIET_ZONE;
const BAR_HEIGHT: f32 = 55.0;
const DIGIT_SIZE: f32 = 14.0;
pub const NATURAL_HEIGHT: f32 = BAR_HEIGHT + DIGIT_SIZE;

/// An encoded EAN-13 symbol: 95 modules plus the full 13 digits for
/// the human-readable row.
pub struct Ean13Symbol {
    modules: Vec<bool>,
    digits: String,
}

/// Reduce a free-form value to its 12 significant digits.
///
/// Strips every non-digit first. Exactly 12 digits pass through;
/// 13 digits drop the trailing check digit (the encoder recomputes
/// it); anything else is not renderable.
pub fn significant_digits(value: &str) -> Option<String> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.chars().count() {
        12 => Some(digits),
        13 => Some(digits[..12].to_string()),
        _ => None,
    }
}

/// EAN-13 check digit over 12 significant digits (weights 1,3,1,3...).
fn check_digit(digits: &str) -> u32 {
    let sum: u32 = digits
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let d = c.to_digit(10).unwrap_or(0);
            if i % 2 == 0 {
                d
            } else {
                d * 3
            }
        })
        .sum();
    (10 - sum % 10) % 10
}

impl Ean13Symbol {
    /// Encode a barcode value, or `None` when it is not renderable.
    pub fn encode(value: &str) -> Option<Self> {
        let significant = significant_digits(value)?;
        let barcode = EAN13::new(&significant).ok()?;
        let modules = barcode.encode().iter().map(|&m| m == 1).collect();
        let digits = format!("{significant}{}", check_digit(&significant));
        Some(Self { modules, digits })
    }

    /// The full 13-digit human-readable string.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Draw the symbol into `page`, anchored at `(x, y)` and uniformly
    /// scaled to fit the `target_width` x `target_height` box.
    pub fn emit(
        &self,
        page: &mut Page,
        fonts: &FontBook,
        x: f32,
        y: f32,
        target_width: f32,
        target_height: f32,
    ) {
        let scale = (target_width / NATURAL_WIDTH).min(target_height / NATURAL_HEIGHT);
        if scale <= 0.0 {
            return;
        }

        let bar_height = BAR_HEIGHT * scale;
        let module_width = scale;
        let bars_x = x + QUIET_ZONE * scale;

        // Merge consecutive dark modules into one rect per run.
        let mut run_start: Option<usize> = None;
        for (idx, &dark) in self.modules.iter().chain(std::iter::once(&false)).enumerate() {
            match (dark, run_start) {
                (true, None) => run_start = Some(idx),
                (false, Some(start)) => {
                    let run_len = (idx - start) as f32;
                    page.rect(
                        bars_x + start as f32 * module_width,
                        y,
                        run_len * module_width,
                        bar_height,
                    );
                    run_start = None;
                }
                _ => {}
            }
        }

        // Human-readable digits, centered under the bars.
        let style = TextStyle::regular(DIGIT_SIZE * scale);
        let spaced = self.spaced_digits();
        let text_width = fonts.text_width(&spaced, style);
        let symbol_width = NATURAL_WIDTH * scale;
        let text_x = x + (symbol_width - text_width).max(0.0) / 2.0;
        page.text(text_x, y + bar_height, spaced, style);
    }

    /// Conventional display grouping: 1-6-6.
    fn spaced_digits(&self) -> String {
        format!(
            "{} {} {}",
            &self.digits[..1],
            &self.digits[1..7],
            &self.digits[7..]
        )
    }
}
