//! Batch driver: spreadsheet in, document tree out.
//!
//! One engine instance per batch. The engine owns the resource cache
//! and the discovered typeface, and reports through the observer it
//! was handed; the shells decide where those messages go.

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::doc::{label, mark, Page};
use crate::error::EtiketkaError;
use crate::observer::{BatchObserver, Level};
use crate::render::{pdf, raster};
use crate::resources::fonts::FontBook;
use crate::resources::ResourceCache;
use crate::sheet::normalize::{normalize_rows, CanonicalRow, Field};

/// Progress is reported every this many rows, and on the last row.
const PROGRESS_STRIDE: usize = 25;

/// Outcome counts for one batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub labels: usize,
    pub marks: usize,
    pub skipped: usize,
}

impl BatchSummary {
    /// A batch succeeds when it produced at least one document.
    pub fn succeeded(&self) -> bool {
        self.labels + self.marks > 0
    }
}

/// Characters Windows forbids in filenames, replaced with `_`.
const FORBIDDEN: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Sanitize one identifier for use inside a filename.
pub fn sanitize(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect()
}

/// Base filename stem for a row: its sanitized identifiers, or the
/// positional index when both are empty.
fn file_stem(row: &CanonicalRow, index: usize) -> String {
    let article = sanitize(row.get(Field::Article));
    let code = sanitize(row.get(Field::Code));
    if article.is_empty() && code.is_empty() {
        format!("row_{index}")
    } else {
        format!("{article}_{code}")
    }
}

pub struct BatchRunner<'a> {
    config: Config,
    resources: ResourceCache,
    fonts: FontBook,
    observer: &'a dyn BatchObserver,
}

impl<'a> BatchRunner<'a> {
    pub fn new(config: Config, observer: &'a dyn BatchObserver) -> Self {
        let resources = ResourceCache::new(&config);
        let fonts = FontBook::discover(&config, observer);
        Self {
            config,
            resources,
            fonts,
            observer,
        }
    }

    /// Process one spreadsheet into the configured output tree.
    ///
    /// Only an unreadable spreadsheet or an uncreatable output tree is
    /// an error; per-row and per-document failures are logged and
    /// counted.
    pub fn process(&self, spreadsheet: &Path) -> Result<BatchSummary, EtiketkaError> {
        let raw = crate::sheet::read_rows(spreadsheet)?;
        let rows = normalize_rows(&raw);

        let labels_dir = self.config.labels_dir();
        let marks_dir = self.config.marks_dir();
        fs::create_dir_all(&labels_dir)?;
        fs::create_dir_all(&marks_dir)?;

        let mut summary = BatchSummary::default();
        let total = rows.len();

        for (index, row) in rows.iter().enumerate() {
            if !row.has_name() {
                self.observer.record(
                    Level::Warning,
                    &format!("skipping row {index}: missing наименование"),
                );
                summary.skipped += 1;
            } else {
                let stem = file_stem(row, index);

                let label_page = label::compose(row, &self.resources, &self.fonts, self.observer);
                if self.write_document(&label_page, &labels_dir, &format!("label_{stem}")) {
                    summary.labels += 1;
                }

                let mark_page = mark::compose(row, &self.resources, &self.fonts, self.observer);
                if self.write_document(&mark_page, &marks_dir, &format!("mark_{stem}")) {
                    summary.marks += 1;
                }
            }

            let done = index + 1;
            if done % PROGRESS_STRIDE == 0 || done == total {
                self.observer.progress(done, total);
            }
        }

        self.observer.record(
            Level::Info,
            &format!(
                "batch finished: {} labels, {} marks, {} skipped",
                summary.labels, summary.marks, summary.skipped
            ),
        );
        Ok(summary)
    }

    /// Write one document (PDF, plus PNG preview when enabled).
    /// Failures are logged and reported as `false`.
    fn write_document(&self, page: &Page, dir: &Path, stem: &str) -> bool {
        let pdf_path = dir.join(format!("{stem}.pdf"));
        if let Err(e) = pdf::write_pdf(page, &self.fonts, stem, &pdf_path) {
            self.observer
                .record(Level::Error, &format!("document write failed: {e}"));
            return false;
        }

        if self.config.raster_previews {
            let png_path = dir.join(format!("{stem}.png"));
            if let Err(e) = raster::write_png(page, &self.fonts, &png_path) {
                // The PDF is already on disk; the preview is best-effort.
                self.observer
                    .record(Level::Warning, &format!("preview write failed: {e}"));
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sanitize_replaces_forbidden_characters() {
        assert_eq!(sanitize(r#"AB\C/D*E?F:G"H<I>J|K"#), "AB_C_D_E_F_G_H_I_J_K");
        assert_eq!(sanitize("  TSH-001  "), "TSH-001");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn file_stem_prefers_identifiers() {
        let mut row = CanonicalRow::default();
        row.set(Field::Article, "TSH/001");
        row.set(Field::Code, "12:34");
        assert_eq!(file_stem(&row, 7), "TSH_001_12_34");
    }

    #[test]
    fn file_stem_falls_back_to_the_row_index() {
        let row = CanonicalRow::default();
        assert_eq!(file_stem(&row, 7), "row_7");
    }

    #[test]
    fn one_sided_identifier_keeps_the_separator() {
        let mut row = CanonicalRow::default();
        row.set(Field::Article, "TSH-001");
        assert_eq!(file_stem(&row, 0), "TSH-001_");
    }

    #[test]
    fn empty_summary_is_a_failure() {
        assert!(!BatchSummary::default().succeeded());
        let some = BatchSummary {
            labels: 1,
            ..Default::default()
        };
        assert!(some.succeeded());
    }
}
