// src/extractors/mod.rs
pub mod transformer;

// Re-export key extraction types for convenience
pub use transformer::{DocumentReport, TableOutcome, TableReport, TableTransformer};
