// src/table/head.rs
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::species::Field;
use crate::utils::TableError;

// Units live in parentheses; footnote references use brackets.
static UNIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^()]*)\)").expect("Failed to compile UNIT_RE"));
static TIME_SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)t(?:\s|$)").expect("Failed to compile TIME_SYMBOL_RE"));
static TEMPERATURE_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)T(?:\s|$)").expect("Failed to compile TEMPERATURE_SYMBOL_RE"));
static CO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bP?CO\b").expect("Failed to compile CO_RE"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSlot {
    pub index: usize,
    pub unit: String,
}

/// Which column feeds each field, and the unit its header declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    slots: BTreeMap<Field, ColumnSlot>,
}

impl FieldMap {
    /// Maps every field to the last header column whose text matches the field's rule.
    pub fn from_header(header: &str) -> Self {
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();
        let mut slots = BTreeMap::new();

        for field in Field::ALL {
            for (index, column) in columns.iter().enumerate() {
                if column_matches(field, column) {
                    slots.insert(
                        field,
                        ColumnSlot {
                            index,
                            unit: column_unit(column),
                        },
                    );
                }
            }
        }

        tracing::debug!(
            "Header `{}` mapped to {:?}",
            header,
            slots.iter().map(|(f, s)| (f.as_str(), s.index)).collect::<Vec<_>>()
        );
        Self { slots }
    }

    pub fn slot(&self, field: Field) -> Option<&ColumnSlot> {
        self.slots.get(&field)
    }

    pub fn mapped(&self) -> impl Iterator<Item = (Field, &ColumnSlot)> {
        self.slots.iter().map(|(field, slot)| (*field, slot))
    }

    pub fn has(&self, field: Field) -> bool {
        self.slots.contains_key(&field)
    }
}

/// Builds the field map for a table, rejecting tables with no yield-like column.
pub fn map_head(caption: &str, header: &str) -> Result<FieldMap, TableError> {
    let map = FieldMap::from_header(header);
    if !map.has(Field::Yield) {
        return Err(TableError::MissingYieldColumn {
            caption: caption.to_string(),
        });
    }
    Ok(map)
}

fn column_matches(field: Field, column: &str) -> bool {
    let lower = column.to_lowercase();
    if lower.contains(field.as_str()) {
        return true;
    }

    match field {
        Field::Temperature => lower.contains("temp") || TEMPERATURE_SYMBOL_RE.is_match(column),
        Field::Metal => {
            lower.contains("catalyst")
                || column == "Palladium"
                || column.contains("Pd")
                || column.contains("LTA")
                || lower.contains("cat.")
        }
        Field::Gas => CO_RE.is_match(column),
        Field::Reagent => lower.contains("carbonyl"),
        Field::Ligand => column.contains("PR3") || column == "L",
        Field::Time => TIME_SYMBOL_RE.is_match(column),
        Field::Acid => column.contains("HCO2H"),
        _ => false,
    }
}

fn column_unit(column: &str) -> String {
    UNIT_RE
        .captures_iter(column)
        .last()
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_header() {
        let map = FieldMap::from_header("entry,catalyst,solvent,time,yield");
        assert_eq!(map.slot(Field::Metal).map(|s| s.index), Some(1));
        assert_eq!(map.slot(Field::Solvent).map(|s| s.index), Some(2));
        assert_eq!(map.slot(Field::Time).map(|s| s.index), Some(3));
        assert_eq!(map.slot(Field::Yield).map(|s| s.index), Some(4));
        assert!(!map.has(Field::Gas));
        assert!(!map.has(Field::Temperature));
    }

    #[test]
    fn test_synonyms_and_units() {
        let map = FieldMap::from_header("Entry,[Pd] (mol%),L,PCO [MPa],T (°C),t (h),Yield[b] (%)");
        let metal = map.slot(Field::Metal).unwrap();
        assert_eq!((metal.index, metal.unit.as_str()), (1, "mol%"));
        assert_eq!(map.slot(Field::Ligand).map(|s| s.index), Some(2));
        assert_eq!(map.slot(Field::Gas).map(|s| s.index), Some(3));
        assert_eq!(map.slot(Field::Gas).map(|s| s.unit.as_str()), Some(""));
        assert_eq!(map.slot(Field::Temperature).map(|s| s.unit.as_str()), Some("°C"));
        assert_eq!(map.slot(Field::Time).map(|s| s.unit.as_str()), Some("h"));
        assert_eq!(map.slot(Field::Yield).map(|s| s.unit.as_str()), Some("%"));
    }

    #[test]
    fn test_standalone_symbols_only() {
        let map = FieldMap::from_header("entry,Catalyst (mol %),Cs2CO3 (equiv),yield");
        assert_eq!(map.slot(Field::Metal).map(|s| s.index), Some(1));
        assert!(!map.has(Field::Time), "`t (` inside Catalyst is not a time column");
        assert!(!map.has(Field::Gas), "carbonate is not a CO column");
    }

    #[test]
    fn test_last_matching_column_wins() {
        let map = FieldMap::from_header("entry,catalyst,co-catalyst,yield");
        assert_eq!(map.slot(Field::Metal).map(|s| s.index), Some(2));
    }

    #[test]
    fn test_missing_yield_rejected() {
        let err = map_head("Table 9", "entry,catalyst,conversion (%)").unwrap_err();
        assert_eq!(err, TableError::MissingYieldColumn { caption: "Table 9".to_string() });
        assert!(map_head("Table 9", "entry,yield").is_ok());
    }
}
