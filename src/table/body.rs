// src/table/body.rs
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::head::FieldMap;
use crate::species::Field;

// `5a` at the end of a cell is entry/value 5 carrying footnote a.
static SUFFIX_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<value>.*\d)(?P<letter>[a-z])$").expect("Failed to compile SUFFIX_REF_RE"));

/// A cell's text together with the unit declared by its column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellValue {
    pub value: String,
    pub unit: String,
}

impl CellValue {
    pub fn new(value: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            unit: unit.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
    /// Entry label from the first column, references normalized.
    pub entry: String,
    pub values: BTreeMap<Field, CellValue>,
}

/// Rewrites a trailing `<digit><letter>` footnote reference into bracket form:
/// `5a` becomes `5[a]`, `5` is returned unchanged.
pub fn normalize_reference(cell: &str) -> String {
    SUFFIX_REF_RE.replace(cell, "${value}[${letter}]").into_owned()
}

/// Splits each body line into cells and picks out the mapped fields.
/// Fields whose column lies beyond a short row are left out of that row.
pub fn extract_body(lines: &[String], map: &FieldMap) -> Vec<Row> {
    lines
        .iter()
        .map(|line| {
            let cells: Vec<String> = line.split(',').map(|cell| cell.trim().to_string()).collect();
            let entry = cells.first().map(|c| normalize_reference(c)).unwrap_or_default();

            let values = map
                .mapped()
                .filter(|(_, slot)| slot.index < cells.len())
                .map(|(field, slot)| {
                    (
                        field,
                        CellValue::new(normalize_reference(&cells[slot.index]), slot.unit.clone()),
                    )
                })
                .collect();

            Row { cells, entry, values }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_reference() {
        assert_eq!(normalize_reference("5a"), "5[a]");
        assert_eq!(normalize_reference("5"), "5");
        assert_eq!(normalize_reference("85 (78)c"), "85 (78)c", "reference must follow a digit");
        assert_eq!(normalize_reference("72b"), "72[b]");
        assert_eq!(normalize_reference("Pd2dba3"), "Pd2dba3", "only a trailing letter is a reference");
        assert_eq!(normalize_reference("MeOH"), "MeOH");
        assert_eq!(normalize_reference("5[a]"), "5[a]");
    }

    #[test]
    fn test_extract_body_maps_fields() {
        let map = FieldMap::from_header("entry,catalyst,solvent,time,yield (%)");
        let rows = extract_body(&["1,Pd(OAc)2 (5),MeOH,2 h,85".to_string()], &map);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.entry, "1");
        assert_eq!(row.values[&Field::Metal], CellValue::new("Pd(OAc)2 (5)", ""));
        assert_eq!(row.values[&Field::Solvent], CellValue::new("MeOH", ""));
        assert_eq!(row.values[&Field::Yield], CellValue::new("85", "%"));
    }

    #[test]
    fn test_short_rows_and_references() {
        let map = FieldMap::from_header("entry,catalyst,solvent,yield");
        let rows = extract_body(&["3b,PdCl2,DMF".to_string()], &map);
        let row = &rows[0];
        assert_eq!(row.entry, "3[b]");
        assert!(!row.values.contains_key(&Field::Yield), "yield column is past the row end");
        assert_eq!(row.cells.len(), 3);
    }
}
