// src/storage/render.rs
use serde::Serialize;

use crate::extractors::{DocumentReport, TableReport};
use crate::species::Field;
use crate::table::{DanglingReference, IgnoredPhrase, Record};
use crate::utils::StorageError;

pub const DELIMITER: &str = ";";

/// Fixed twelve-field header, then one delimited line per record of every table.
pub fn render_text(tables: &[Vec<Record>]) -> String {
    let mut out = Field::ALL
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(DELIMITER);
    out.push('\n');

    for record in tables.iter().flatten() {
        let line = Field::ALL
            .iter()
            .map(|field| record.get(*field).map(|value| value.to_string()).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(DELIMITER);
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[derive(Serialize)]
struct TableView<'a> {
    caption: &'a str,
    citation: &'a str,
    records: &'a [Record],
    row_failures: Vec<String>,
    ignored_phrases: &'a [IgnoredPhrase],
    dangling_references: &'a [DanglingReference],
}

impl<'a> From<&'a TableReport> for TableView<'a> {
    fn from(report: &'a TableReport) -> Self {
        Self {
            caption: &report.caption,
            citation: &report.citation,
            records: &report.records,
            row_failures: report.row_failures.iter().map(|e| e.to_string()).collect(),
            ignored_phrases: &report.ignored_phrases,
            dangling_references: &report.dangling_references,
        }
    }
}

/// Extracted tables as pretty JSON, with their failures and ignored outcomes.
pub fn render_json(report: &DocumentReport) -> Result<String, StorageError> {
    let tables: Vec<TableView> = report.extracted().map(TableView::from).collect();
    serde_json::to_string_pretty(&tables).map_err(|e| StorageError::SerializationError(e.to_string()))
}
