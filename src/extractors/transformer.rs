// src/extractors/transformer.rs

// --- Imports ---
use crate::config::ExtractorConfig;
use crate::species::{RuleClassifier, SpeciesClassifier};
use crate::table::{
    extract_body, map_head, merge_rows, parse_footnotes, segment_tables, DanglingReference, IgnoredMarkers,
    IgnoredPhrase, Record, TableBlock,
};
use crate::utils::{MergeError, TableError};

// --- Data Structures ---

/// Everything one table produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub caption: String,
    pub citation: String,
    pub records: Vec<Record>,
    pub row_failures: Vec<MergeError>,
    pub ignored_phrases: Vec<IgnoredPhrase>,
    pub dangling_references: Vec<DanglingReference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    Extracted(TableReport),
    /// The table was readable but carries nothing to extract (no yield column).
    Skipped { caption: String, error: TableError },
    /// The table could not be read at all.
    Failed { start_line: usize, error: TableError },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentReport {
    pub tables: Vec<TableOutcome>,
    pub ignored_markers: IgnoredMarkers,
}

impl DocumentReport {
    pub fn extracted(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter_map(|outcome| match outcome {
            TableOutcome::Extracted(report) => Some(report),
            _ => None,
        })
    }

    /// Record lists of the extracted tables, in document order.
    pub fn records(&self) -> Vec<Vec<Record>> {
        self.extracted().map(|report| report.records.clone()).collect()
    }

    pub fn record_count(&self) -> usize {
        self.extracted().map(|report| report.records.len()).sum()
    }

    pub fn row_failure_count(&self) -> usize {
        self.extracted().map(|report| report.row_failures.len()).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.tables
            .iter()
            .filter(|outcome| matches!(outcome, TableOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.tables
            .iter()
            .filter(|outcome| matches!(outcome, TableOutcome::Failed { .. }))
            .count()
    }
}

// --- Main Transformer ---

/// Drives segmentation, head mapping, body and footnote extraction and the merge
/// for every table of a document.
pub struct TableTransformer<C: SpeciesClassifier = RuleClassifier> {
    config: ExtractorConfig,
    classifier: C,
}

impl TableTransformer<RuleClassifier> {
    pub fn with_defaults() -> Self {
        Self::new(ExtractorConfig::default(), RuleClassifier::new())
    }
}

impl<C: SpeciesClassifier> TableTransformer<C> {
    pub fn new(config: ExtractorConfig, classifier: C) -> Self {
        Self { config, classifier }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts every table of a document. Only a strict-boundary mismatch fails the
    /// whole document; everything else is reported per table.
    pub fn parse_document(&self, lines: &[String]) -> Result<DocumentReport, TableError> {
        let segmentation = segment_tables(lines, &self.config)?;
        tracing::info!("Found {} table block(s)", segmentation.blocks.len());

        let tables = segmentation
            .blocks
            .into_iter()
            .map(|(start_line, block)| match block {
                Ok(block) => self.parse_block(&block),
                Err(error) => {
                    tracing::error!("Failed to read table at line {}: {}", start_line, error);
                    TableOutcome::Failed { start_line, error }
                }
            })
            .collect();

        Ok(DocumentReport {
            tables,
            ignored_markers: segmentation.ignored,
        })
    }

    /// Runs one table through head mapping, body extraction, footnotes and merge.
    pub fn parse_block(&self, block: &TableBlock) -> TableOutcome {
        tracing::debug!("Parsing table `{}` ({})", block.caption, block.citation);

        let map = match map_head(&block.caption, &block.header) {
            Ok(map) => map,
            Err(error) => {
                tracing::warn!("{}", error);
                return TableOutcome::Skipped {
                    caption: block.caption.clone(),
                    error,
                };
            }
        };

        let rows = extract_body(&block.rows, &map);
        let notes = parse_footnotes(&block.footnotes, &self.classifier);
        let merged = merge_rows(&rows, &notes);

        tracing::info!(
            "Table `{}`: {} record(s), {} failed row(s), {} footnote(s)",
            block.caption,
            merged.records.len(),
            merged.failures.len(),
            notes.footnotes.len()
        );

        TableOutcome::Extracted(TableReport {
            caption: block.caption.clone(),
            citation: block.citation.clone(),
            records: merged.records,
            row_failures: merged.failures,
            ignored_phrases: notes.ignored,
            dangling_references: merged.dangling,
        })
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{Field, FieldValue, Species};

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(|l| l.trim().to_string()).collect()
    }

    const DOCUMENT: &str = "Palladium-catalysed carbonylation
        Table 1. Optimization of conditions
        entry,catalyst,solvent,time,yield (%)
        1,Pd(OAc)2 (5),MeOH,2 h,85
        2,PdCl2 (5),EtOH,4 h,62a
        3,–,MeOH,2 h,0
        [a] Isolated yield.
        https://doi.org/10.1000/one
        Table 2. Without yield
        entry,catalyst,conversion
        1,Pd(OAc)2,90
        https://doi.org/10.1000/two
        Table 3. Scope
        Entry,substrate,solvent,yield
        1,1a,DMF,77
        2,1b,DMF,68b
        [a] Conditions: Pd(OAc)2 (5 mol%), 80 °C, 12 h. [b] Performed on 5 mmol scale.
        https://doi.org/10.1000/three";

    #[test]
    fn test_document_end_to_end() {
        let report = TableTransformer::with_defaults().parse_document(&lines(DOCUMENT)).unwrap();
        assert_eq!(report.tables.len(), 3);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 0);
        assert!(report.ignored_markers.is_empty());

        let records = report.records();
        assert_eq!(records.len(), 2, "skipped table contributes no record list");
        assert_eq!(records[0].len(), 3, "one record per data row");
        assert_eq!(records[1].len(), 2);

        let first = &records[0][0];
        assert_eq!(
            first.get(Field::Metal),
            Some(&FieldValue::Species(Species::new("Pd(OAc)2", Some("5".to_string()))))
        );
        assert_eq!(first.get(Field::Yield), Some(&FieldValue::Scalar("85%".to_string())));

        let scope = &records[1][0];
        assert_eq!(
            scope.get(Field::Metal),
            Some(&FieldValue::Species(Species::new("Pd(OAc)2", Some("5 mol%".to_string()))))
        );
        assert_eq!(scope.get(Field::Temperature), Some(&FieldValue::Scalar("80 °C".to_string())));
        assert_eq!(scope.get(Field::Time), Some(&FieldValue::Scalar("12 h".to_string())));
        assert_eq!(scope.get(Field::Solvent).map(|v| v.formula()), Some("DMF"));
    }

    #[test]
    fn test_skipped_table_does_not_block_later_tables() {
        let report = TableTransformer::with_defaults().parse_document(&lines(DOCUMENT)).unwrap();
        match &report.tables[1] {
            TableOutcome::Skipped { caption, error } => {
                assert_eq!(caption, "Table 2. Without yield");
                assert!(matches!(error, TableError::MissingYieldColumn { .. }));
            }
            other => panic!("expected a skipped table, got {:?}", other),
        }
        assert!(matches!(report.tables[2], TableOutcome::Extracted(_)));
    }

    #[test]
    fn test_missing_entry_column_fails_only_that_table() {
        let doc = lines(
            "Table 1
             run,yield
             1,50
             http://a
             Table 2
             entry,yield
             1,60
             http://b",
        );
        let report = TableTransformer::with_defaults().parse_document(&doc).unwrap();
        assert!(matches!(
            report.tables[0],
            TableOutcome::Failed { start_line: 0, error: TableError::MissingEntryColumn { .. } }
        ));
        assert_eq!(report.record_count(), 1);
    }

    #[test]
    fn test_ignored_outcomes_are_surfaced() {
        let doc = lines(
            "Table 1
             entry,catalyst,yield
             1,PdCl2,50c
             a Reaction conditions: PdCl2 (5 mol%), under air b Determined by GC
             http://a
             Table 2",
        );
        let report = TableTransformer::with_defaults().parse_document(&doc).unwrap();
        assert_eq!(report.ignored_markers.starts, vec![5]);

        let table = report.extracted().next().unwrap();
        assert_eq!(table.dangling_references.len(), 1);
        assert!(table
            .ignored_phrases
            .iter()
            .any(|p| p.letter == 'b' && p.phrase == "Determined by GC"));
        assert!(table.row_failures.is_empty());
    }

    #[test]
    fn test_strict_boundaries_fail_the_document() {
        let config = ExtractorConfig {
            strict_boundaries: true,
            ..ExtractorConfig::default()
        };
        let transformer = TableTransformer::new(config, RuleClassifier::new());
        let doc = lines("Table 1\nentry,yield\n1,50");
        assert!(matches!(
            transformer.parse_document(&doc),
            Err(TableError::MismatchedBoundaries { starts: 1, ends: 0 })
        ));
    }
}
