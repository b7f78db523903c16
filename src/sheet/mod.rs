//! Spreadsheet ingestion.
//!
//! Reads the first worksheet of an xlsx/xls file into raw header→value
//! rows. Only this module touches `calamine`; everything downstream
//! works on the normalized row schema from [`normalize`].

pub mod normalize;

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::EtiketkaError;

/// One raw spreadsheet row: header cell text paired with value text,
/// in column order. Headers are kept verbatim; normalization happens
/// in [`normalize::normalize_rows`].
pub type RawRow = Vec<(String, String)>;

/// Read the first worksheet into raw rows.
///
/// The first row is the header row. Blank and error cells collapse to
/// empty strings; numeric cells are stringified the way the sheet
/// shows them (integral floats lose the trailing `.0`).
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>, EtiketkaError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| EtiketkaError::Spreadsheet(format!("failed to open {}: {e}", path.display())))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EtiketkaError::Spreadsheet("workbook has no sheets".into()))?
        .map_err(|e| EtiketkaError::Spreadsheet(format!("failed to read sheet: {e}")))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for row in rows_iter {
        let mut raw: RawRow = Vec::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            let value = row.get(idx).map(cell_to_string).unwrap_or_default();
            raw.push((header.clone(), value));
        }
        rows.push(raw);
    }

    Ok(rows)
}

/// Coerce a cell to display text. Errors and blanks become empty.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            // Barcodes and codes come in as floats; keep them integral.
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}
