// src/config.rs
use crate::utils::AppError;

pub const DEFAULT_START_MARKER: &str = "Table";
pub const DEFAULT_END_MARKER: &str = "http";

/// Knobs for table segmentation. Defaults match the exported CSV layout:
/// a `Table ...` caption line opens a block and the `http...` citation line closes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub start_marker: String,
    pub end_marker: String,
    /// Reject documents whose start and end marker counts differ instead of
    /// pairing the first `min(starts, ends)` markers.
    pub strict_boundaries: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            start_marker: DEFAULT_START_MARKER.to_string(),
            end_marker: DEFAULT_END_MARKER.to_string(),
            strict_boundaries: false,
        }
    }
}

impl ExtractorConfig {
    /// Defaults overridden by `TABLE_START_MARKER`, `TABLE_END_MARKER` and
    /// `STRICT_BOUNDARIES` when set.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(marker) = lookup("TABLE_START_MARKER") {
            config.start_marker = marker;
        }
        if let Some(marker) = lookup("TABLE_END_MARKER") {
            config.end_marker = marker;
        }
        if let Some(flag) = lookup("STRICT_BOUNDARIES") {
            config.strict_boundaries = parse_flag(&flag).ok_or_else(|| {
                AppError::Config(format!("STRICT_BOUNDARIES must be true/false, got `{}`", flag))
            })?;
        }

        config.validate()?;
        tracing::debug!("Loaded extractor config: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.start_marker.trim().is_empty() {
            return Err(AppError::Config("table start marker must not be empty".to_string()));
        }
        if self.end_marker.trim().is_empty() {
            return Err(AppError::Config("table end marker must not be empty".to_string()));
        }
        if self.start_marker == self.end_marker {
            return Err(AppError::Config(format!(
                "table start and end markers must differ (both `{}`)",
                self.start_marker
            )));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
