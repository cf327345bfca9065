// src/utils/mod.rs
pub mod error;
pub mod logging;

pub use error::{AppError, MergeError, StorageError, TableError}; // Re-export error types for convenience
