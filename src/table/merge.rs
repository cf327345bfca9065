// src/table/merge.rs
//! Merge of the three sources of truth for a row.
//!
//! A record starts from the table's base-condition footnote, is overlaid with the
//! row's own cells, then with every footnote the row references. Whatever the
//! sources say, each field must end with exactly one value; rows where that does
//! not hold are reported, not guessed.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::body::Row;
use super::footnote::FootnoteSet;
use crate::species::{Field, FieldValue, Species, DASH};
use crate::utils::MergeError;

static REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([a-z])\]").expect("Failed to compile REF_RE"));

// --- Row cell shapes ---
// PPh3 (3), Pd(OAc)2 (5 mol%)
static NAME_SPACE_QTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>.*?)\s\((?P<qty>\d[^()]*)\)$").expect("Failed to compile NAME_SPACE_QTY_RE"));
// Pd(PPh3)2Cl2/5
static NAME_SLASH_QTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>.*)/(?P<qty>\d+(?:\.\d+)?)$").expect("Failed to compile NAME_SLASH_QTY_RE"));
// AgOAc(1.5)
static NAME_PAREN_QTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>.*)\((?P<qty>\d+(?:\.\d+)?)\)$").expect("Failed to compile NAME_PAREN_QTY_RE"));
// PdCl2 (–)
static NAME_DASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>.*?)\s\(–\)$").expect("Failed to compile NAME_DASH_RE"));
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("Failed to compile NUMBER_RE"));
static RATIO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?(?::\d+(?:\.\d+)?)+$").expect("Failed to compile RATIO_RE"));

/// Final, single-valued conditions of one table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub entry: String,
    pub fields: BTreeMap<Field, FieldValue>,
}

impl Record {
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }
}

/// A row pointed at a footnote letter the table does not define.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub entry: String,
    pub letter: char,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub records: Vec<Record>,
    pub failures: Vec<MergeError>,
    pub dangling: Vec<DanglingReference>,
}

/// What a row cell says about a species field. `None` parts leave the current
/// value untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CellSpecies {
    formula: Option<String>,
    quantity: Option<String>,
}

impl CellSpecies {
    fn into_species(self, field: Field) -> Species {
        match self.formula {
            Some(formula) if formula == DASH => Species::dash(),
            Some(formula) => Species::new(formula, self.quantity),
            None => Species::new(field.as_str(), self.quantity),
        }
    }
}

/// Merges every row of a table. Failed rows are collected, the rest still produce records.
pub fn merge_rows(rows: &[Row], notes: &FootnoteSet) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for row in rows {
        let references = row_references(row);
        for letter in &references {
            if notes.by_letter(*letter).is_none() {
                tracing::debug!("Entry `{}` references undefined footnote [{}]", row.entry, letter);
                outcome.dangling.push(DanglingReference {
                    entry: row.entry.clone(),
                    letter: *letter,
                });
            }
        }

        match merge_row(row, &references, notes) {
            Ok(record) => outcome.records.push(record),
            Err(e) => {
                tracing::warn!("{}", e);
                outcome.failures.push(e);
            }
        }
    }

    outcome
}

/// Footnote letters referenced in the row, in first-seen order: field cells in
/// output column order, then the entry cell. Later letters win conflicting fields.
pub fn row_references(row: &Row) -> Vec<char> {
    let mut letters: Vec<char> = Vec::new();
    let texts = row
        .values
        .values()
        .map(|cell| cell.value.as_str())
        .chain(std::iter::once(row.entry.as_str()));
    for text in texts {
        for caps in REF_RE.captures_iter(text) {
            if let Some(letter) = caps[1].chars().next() {
                if !letters.contains(&letter) {
                    letters.push(letter);
                }
            }
        }
    }
    letters
}

pub fn merge_row(row: &Row, references: &[char], notes: &FootnoteSet) -> Result<Record, MergeError> {
    let entry = strip_references(&row.entry);

    // 1. Base condition
    let mut working: BTreeMap<Field, Vec<FieldValue>> = notes
        .base_footnote()
        .map(|base| base.fields.clone())
        .unwrap_or_default();

    // 2. The row's own cells
    for (field, cell) in &row.values {
        let field = *field;
        let text = strip_references(&cell.value);
        // A blank cell says nothing; the base and footnotes stand.
        if text.is_empty() {
            continue;
        }

        if !field.is_species() {
            let value = if text == DASH { text } else { with_unit(&text, &cell.unit) };
            working.insert(field, vec![FieldValue::Scalar(value)]);
            continue;
        }

        let parsed = parse_cell_species(field, &text, &cell.unit);
        let seeded = working.get(&field).map_or(0, Vec::len);
        if seeded > 1 {
            return Err(MergeError::AmbiguousMerge {
                entry,
                field,
                candidates: seeded,
            });
        }

        match working.get_mut(&field).and_then(|values| values.first_mut()) {
            Some(slot) => {
                let mut current = match slot {
                    FieldValue::Species(species) => species.clone(),
                    FieldValue::Scalar(text) => Species::new(text.clone(), None),
                };
                if let Some(formula) = parsed.formula {
                    if formula == DASH {
                        current = Species::dash();
                    } else {
                        current.formula = formula;
                    }
                }
                if let Some(quantity) = parsed.quantity {
                    current.quantity = Some(quantity);
                }
                *slot = FieldValue::Species(current);
            }
            None => {
                working.insert(field, vec![FieldValue::Species(parsed.into_species(field))]);
            }
        }
    }

    // 3. Referenced footnotes, in reference order
    for letter in references {
        let Some(note) = notes.by_letter(*letter) else {
            continue;
        };

        for (field, entries) in &note.fields {
            let field = *field;
            let Some(first) = entries.first() else {
                continue;
            };
            let current_is_dash = working
                .get(&field)
                .and_then(|values| values.first())
                .map_or(false, FieldValue::is_dash);
            if current_is_dash {
                continue;
            }

            match field {
                Field::Ligand => {
                    let is_label = first
                        .as_species()
                        .map_or(false, |species| species.is_placeholder_for(Field::Ligand));
                    match working.get_mut(&field).and_then(|values| values.first_mut()) {
                        Some(current) if is_label => {
                            let formula = current.formula().to_string();
                            *current = FieldValue::Species(Species::new(formula, first.quantity().map(str::to_string)));
                        }
                        Some(current) => *current = first.clone(),
                        None => {
                            working.insert(field, entries.clone());
                        }
                    }
                }
                Field::Additive => {
                    working.entry(field).or_default().extend(entries.iter().cloned());
                }
                _ => {
                    working.insert(field, entries.clone());
                }
            }
        }
    }

    // 4. Every field must have converged
    let mut fields = BTreeMap::new();
    for (field, mut values) in working {
        if values.len() != 1 {
            return Err(MergeError::AmbiguousMerge {
                entry,
                field,
                candidates: values.len(),
            });
        }
        if let Some(value) = values.pop() {
            fields.insert(field, value);
        }
    }

    Ok(Record { entry, fields })
}

fn strip_references(text: &str) -> String {
    REF_RE.replace_all(text, "").trim().to_string()
}

/// Attaches a column unit to a bare number: `85` + `%` is `85%`, `5` + `mol%` is `5 mol%`.
/// Values that already carry the unit are returned as is.
fn with_unit(value: &str, unit: &str) -> String {
    if unit.is_empty() || value.ends_with(unit) {
        value.to_string()
    } else if unit.starts_with('%') {
        format!("{}{}", value, unit)
    } else {
        format!("{} {}", value, unit)
    }
}

fn quantity_with_unit(qty: &str, unit: &str) -> String {
    if NUMBER_RE.is_match(qty) {
        with_unit(qty, unit)
    } else {
        qty.to_string()
    }
}

fn parse_cell_species(field: Field, text: &str, unit: &str) -> CellSpecies {
    let formula = |name: &str| {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case(field.as_str()) {
            None
        } else {
            Some(name.to_string())
        }
    };

    if text == DASH {
        return CellSpecies {
            formula: Some(DASH.to_string()),
            quantity: None,
        };
    }
    if NUMBER_RE.is_match(text) {
        return CellSpecies {
            formula: None,
            quantity: Some(with_unit(text, unit)),
        };
    }
    if RATIO_RE.is_match(text) {
        return CellSpecies {
            formula: None,
            quantity: Some(text.to_string()),
        };
    }

    for re in [&*NAME_SPACE_QTY_RE, &*NAME_SLASH_QTY_RE, &*NAME_PAREN_QTY_RE] {
        if let Some(caps) = re.captures(text) {
            return CellSpecies {
                formula: formula(&caps["name"]),
                quantity: Some(quantity_with_unit(caps["qty"].trim(), unit)),
            };
        }
    }
    if let Some(caps) = NAME_DASH_RE.captures(text) {
        return CellSpecies {
            formula: formula(&caps["name"]),
            quantity: None,
        };
    }

    CellSpecies {
        formula: formula(text),
        quantity: None,
    }
}
