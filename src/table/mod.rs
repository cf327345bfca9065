// src/table/mod.rs
pub mod body;
pub mod footnote;
pub mod head;
pub mod merge;
pub mod segment;

// Re-export key table types for convenience
pub use body::{extract_body, normalize_reference, CellValue, Row};
pub use footnote::{parse_footnotes, Footnote, FootnoteSet, IgnoreReason, IgnoredPhrase};
pub use head::{map_head, ColumnSlot, FieldMap};
pub use merge::{merge_rows, DanglingReference, MergeOutcome, Record};
pub use segment::{segment_tables, IgnoredMarkers, Segmentation, TableBlock};
