// src/lib.rs
pub mod config;
pub mod extractors;
pub mod input;
pub mod species;
pub mod storage;
pub mod table;
pub mod utils;

// Re-export the types most callers need
pub use config::ExtractorConfig;
pub use extractors::{DocumentReport, TableOutcome, TableReport, TableTransformer};
pub use species::{Field, FieldValue, RuleClassifier, Species, SpeciesClassifier};
pub use table::Record;
pub use utils::AppError;
