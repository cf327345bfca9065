// src/utils/error.rs
use thiserror::Error;

use crate::species::Field;

// Table-scoped failures. One of these never stops the rest of the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Table `{caption}` has no `entry` column (header: `{header}`)")]
    MissingEntryColumn { caption: String, header: String },

    #[error("Table `{caption}` has no yield-like column, skipped")]
    MissingYieldColumn { caption: String },

    #[error("Table block starting at line {start} is malformed: {reason}")]
    MalformedBlock { start: usize, reason: String },

    #[error("Table markers are unbalanced: {starts} start markers, {ends} end markers")]
    MismatchedBoundaries { starts: usize, ends: usize },
}

// Row-scoped merge failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("Entry `{entry}`: field `{field}` resolved to {candidates} candidates")]
    AmbiguousMerge {
        entry: String,
        field: Field,
        candidates: usize,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Table extraction failed: {0}")]
    Table(#[from] TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
