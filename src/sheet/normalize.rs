//! Row normalization: aliased headers → canonical fields, plus the
//! reference-row fallback fill.
//!
//! The canonical field names are the Russian spreadsheet headers the
//! documents are built from. Aliases are matched case-insensitively
//! with collapsed whitespace.

use super::RawRow;

/// Canonical row fields, in alias-lookup priority order.
///
/// Order matters: a header matching several alias lists ("код товара"
/// is both an артикул and a код spelling) resolves to the first field
/// that claims it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Article,
    Barcode,
    Certification,
    CertificationType,
    Logo,
    Purpose,
    Material,
    Manufacturer,
    Importer,
    Country,
    ProductionDate,
    Code,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Name,
        Field::Article,
        Field::Barcode,
        Field::Certification,
        Field::CertificationType,
        Field::Logo,
        Field::Purpose,
        Field::Material,
        Field::Manufacturer,
        Field::Importer,
        Field::Country,
        Field::ProductionDate,
        Field::Code,
    ];

    /// Fields exempt from reference-row fallback: they identify the
    /// row and must come from the row itself or stay empty.
    pub const IDENTIFYING: [Field; 6] = [
        Field::Code,
        Field::Article,
        Field::Barcode,
        Field::Certification,
        Field::CertificationType,
        Field::Logo,
    ];

    /// Canonical header spelling.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Field::Name => "наименование",
            Field::Article => "артикул",
            Field::Barcode => "штрихкод",
            Field::Certification => "сертификация",
            Field::CertificationType => "тип сертификации",
            Field::Logo => "лого",
            Field::Purpose => "назначение",
            Field::Material => "материал",
            Field::Manufacturer => "производитель",
            Field::Importer => "импортер",
            Field::Country => "страна происхождения",
            Field::ProductionDate => "дата изготовления",
            Field::Code => "код",
        }
    }

    /// Accepted alternative header spellings (already normalized).
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Name => &["название", "product", "name", "товар"],
            Field::Article => &["арт", "article", "sku", "код товара"],
            Field::Barcode => &["barcode", "штрих-код", "штрих код"],
            Field::Certification => &["сертификат", "certification"],
            Field::CertificationType => &["тип сертификата", "certification type"],
            Field::Logo => &["logo", "логотип"],
            Field::Purpose => &["purpose", "применение"],
            Field::Material => &["material", "состав"],
            Field::Manufacturer => &["manufacturer", "producer"],
            Field::Importer => &["importer"],
            Field::Country => &["country", "страна"],
            Field::ProductionDate => &["production date", "дата"],
            Field::Code => &["code", "код товара"],
        }
    }

    /// Resolve a normalized header to its canonical field.
    pub fn from_header(header: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.canonical_name() == header || f.aliases().contains(&header))
    }

    pub fn is_identifying(self) -> bool {
        Field::IDENTIFYING.contains(&self)
    }

    fn index(self) -> usize {
        Field::ALL.iter().position(|f| *f == self).unwrap()
    }
}

/// Trim, collapse inner whitespace, lowercase.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// One normalized product record. Every canonical field is present
/// (possibly empty); values are immutable after the batch-level
/// fallback pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalRow {
    values: [String; 13],
}

impl CanonicalRow {
    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    /// True when every field is blank.
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.is_empty())
    }

    /// Validation gate: the only mandatory field.
    pub fn has_name(&self) -> bool {
        !self.get(Field::Name).is_empty()
    }
}

/// Map one raw row to canonical form. Unrecognized columns are
/// dropped; when duplicate columns map to the same field, the first
/// non-empty value wins.
pub fn normalize_row(raw: &RawRow) -> CanonicalRow {
    let mut row = CanonicalRow::default();
    for (header, value) in raw {
        if let Some(field) = Field::from_header(&normalize_header(header)) {
            if row.get(field).is_empty() && !value.is_empty() {
                row.set(field, value.clone());
            }
        }
    }
    row
}

/// Normalize a whole sheet and apply the reference-row fallback.
///
/// The reference row is the first row with any non-empty value; it
/// donates its values to every blank non-identifying field of every
/// row in the sheet. A sheet with no data rows gets no fallback.
pub fn normalize_rows(raw_rows: &[RawRow]) -> Vec<CanonicalRow> {
    let mut rows: Vec<CanonicalRow> = raw_rows.iter().map(normalize_row).collect();

    let reference = rows.iter().find(|r| !r.is_blank()).cloned();

    if let Some(reference) = reference {
        for row in &mut rows {
            for field in Field::ALL {
                if !field.is_identifying() && row.get(field).is_empty() {
                    row.set(field, reference.get(field).to_string());
                }
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn header_normalization_collapses_whitespace() {
        assert_eq!(normalize_header("  Страна   Происхождения "), "страна происхождения");
        assert_eq!(normalize_header("BARCODE"), "barcode");
    }

    #[test]
    fn aliases_resolve_to_canonical_fields() {
        assert_eq!(Field::from_header("название"), Some(Field::Name));
        assert_eq!(Field::from_header("sku"), Some(Field::Article));
        assert_eq!(Field::from_header("штрих-код"), Some(Field::Barcode));
        assert_eq!(Field::from_header("страна"), Some(Field::Country));
        assert_eq!(Field::from_header("нечто другое"), None);
    }

    #[test]
    fn ambiguous_alias_goes_to_first_claimant() {
        // "код товара" is listed under both артикул and код; артикул
        // comes first in lookup order.
        assert_eq!(Field::from_header("код товара"), Some(Field::Article));
    }

    #[test]
    fn normalization_is_idempotent_on_canonical_headers() {
        let rows = vec![raw(&[
            ("наименование", "Футболка"),
            ("артикул", "TSH-001"),
            ("назначение", "одежда"),
        ])];
        let first = normalize_rows(&rows);
        let round: Vec<RawRow> = first
            .iter()
            .map(|r| {
                Field::ALL
                    .into_iter()
                    .map(|f| (f.canonical_name().to_string(), r.get(f).to_string()))
                    .collect()
            })
            .collect();
        let second = normalize_rows(&round);
        assert_eq!(first, second);
    }

    #[test]
    fn fallback_fills_optional_fields_only() {
        let rows = vec![
            raw(&[
                ("наименование", "Футболка"),
                ("артикул", "TSH-001"),
                ("назначение", "одежда"),
                ("материал", "хлопок"),
                ("лого", "acme"),
            ]),
            raw(&[("наименование", "Кепка"), ("артикул", "CAP-002")]),
        ];
        let normalized = normalize_rows(&rows);
        let second = &normalized[1];

        // Optional fields inherited from the reference row
        assert_eq!(second.get(Field::Purpose), "одежда");
        assert_eq!(second.get(Field::Material), "хлопок");
        // Identifying fields stay as the row had them
        assert_eq!(second.get(Field::Article), "CAP-002");
        assert_eq!(second.get(Field::Logo), "");
        assert_eq!(second.get(Field::Barcode), "");
    }

    #[test]
    fn reference_row_is_first_non_blank() {
        let rows = vec![
            raw(&[("наименование", "")]),
            raw(&[("наименование", "Первый"), ("материал", "шерсть")]),
            raw(&[("наименование", "Второй")]),
        ];
        let normalized = normalize_rows(&rows);
        assert_eq!(normalized[2].get(Field::Material), "шерсть");
        // The blank leading row also receives optional backfill
        assert_eq!(normalized[0].get(Field::Material), "шерсть");
    }

    #[test]
    fn no_reference_row_means_no_fallback() {
        let rows = vec![raw(&[("наименование", "")]), raw(&[("материал", "")])];
        let normalized = normalize_rows(&rows);
        assert!(normalized.iter().all(|r| r.is_blank()));
    }
}
