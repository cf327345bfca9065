// src/input/mod.rs
use std::fs;
use std::path::Path;

use crate::utils::AppError;

/// Reads a table export into lines, dropping non-printable characters from each.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Vec<String>, AppError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let lines = printable_lines(&content);
    tracing::debug!("Read {} line(s) from {}", lines.len(), path.display());
    Ok(lines)
}

pub fn printable_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.chars().filter(|c| !c.is_control()).collect())
        .collect()
}
