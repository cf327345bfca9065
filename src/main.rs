// src/main.rs
use std::path::{Path, PathBuf};

use clap::Parser;
use condition_extractor::extractors::TableTransformer;
use condition_extractor::species::RuleClassifier;
use condition_extractor::storage::{render_json, render_text, StorageManager};
use condition_extractor::utils::{self, AppError};
use condition_extractor::{input, ExtractorConfig};

/// Command Line Interface for the reaction-condition table extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Line-oriented text files holding exported tables
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output directory for records and metadata (prints to stdout when omitted)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Emit JSON instead of the `;`-delimited text rendering
    #[arg(long)]
    json: bool,

    /// Fail a document whose start and end marker counts differ
    #[arg(long)]
    strict_boundaries: bool,

    /// Prefix of the line that opens a table (overrides TABLE_START_MARKER)
    #[arg(long)]
    start_marker: Option<String>,

    /// Prefix of the line that closes a table (overrides TABLE_END_MARKER)
    #[arg(long)]
    end_marker: Option<String>,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Environment config, then CLI overrides
    let mut config = ExtractorConfig::from_env()?;
    if let Some(marker) = &args.start_marker {
        config.start_marker = marker.clone();
    }
    if let Some(marker) = &args.end_marker {
        config.end_marker = marker.clone();
    }
    if args.strict_boundaries {
        config.strict_boundaries = true;
    }
    config.validate()?;

    // 4. Initialize storage only when writing to disk
    let storage = match &args.output_dir {
        Some(dir) => Some(StorageManager::new(dir)?),
        None => None,
    };

    let transformer = TableTransformer::new(config, RuleClassifier::new());
    tracing::debug!("Using extractor config: {:?}", transformer.config());

    // 5. Process each document
    let mut success_count = 0;
    let mut failure_count = 0;

    for path in &args.files {
        tracing::info!("Processing {}", path.display());
        match process_file(&transformer, path, storage.as_ref(), args.json) {
            Ok(records) => {
                tracing::info!("Extracted {} record(s) from {}", records, path.display());
                success_count += 1;
            }
            Err(e) => {
                tracing::error!("Failed to process {}: {}", path.display(), e);
                failure_count += 1;
            }
        }
    }

    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "Failed to extract tables from any of {} document(s)",
            failure_count
        )));
    }

    Ok(())
}

/// Extracts one document and either prints or stores the result. Returns the record count.
fn process_file(
    transformer: &TableTransformer,
    path: &Path,
    storage: Option<&StorageManager>,
    json: bool,
) -> Result<usize, AppError> {
    let lines = input::read_document(path)?;
    let report = transformer.parse_document(&lines)?;

    if !report.ignored_markers.is_empty() {
        tracing::warn!(
            "{}: unmatched table markers at start lines {:?}, end lines {:?}",
            path.display(),
            report.ignored_markers.starts,
            report.ignored_markers.ends
        );
    }

    match storage {
        Some(storage) => {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            if json {
                storage.save_records_json(&stem, &report)?;
            } else {
                storage.save_records(&stem, &report)?;
            }
            storage.save_metadata(&stem, &report)?;
        }
        None => {
            if json {
                println!("{}", render_json(&report)?);
            } else {
                print!("{}", render_text(&report.records()));
            }
        }
    }

    Ok(report.record_count())
}
