// src/table/segment.rs
use serde::Serialize;

use crate::config::ExtractorConfig;
use crate::utils::TableError;

/// One table occurrence, split into its structural parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
    /// Line number of the caption within the document (0-based).
    pub start_line: usize,
    pub caption: String,
    pub header: String,
    pub rows: Vec<String>,
    pub footnotes: Vec<String>,
    pub citation: String,
}

impl TableBlock {
    /// Builds a block from the lines between (and including) a start and end marker.
    /// Rejects blocks too short to hold caption, header and citation, and headers that
    /// do not open with an `entry` column.
    pub fn from_lines(start_line: usize, lines: &[String]) -> Result<Self, TableError> {
        if lines.len() < 3 {
            return Err(TableError::MalformedBlock {
                start: start_line,
                reason: format!("expected caption, header and citation, found {} line(s)", lines.len()),
            });
        }

        let caption = lines[0].clone();
        let header = lines[1].clone();
        let citation = lines[lines.len() - 1].clone();

        let first_column = header.split(',').next().unwrap_or("").trim().to_lowercase();
        if !first_column.starts_with("entry") {
            return Err(TableError::MissingEntryColumn { caption, header });
        }

        let interior = &lines[2..lines.len() - 1];
        let foot_start = interior
            .iter()
            .position(|line| is_footnote_start(line))
            .unwrap_or(interior.len());

        let rows = interior[..foot_start]
            .iter()
            .filter(|line| !line.trim().is_empty())
            .cloned()
            .collect();
        let footnotes = interior[foot_start..].to_vec();

        Ok(Self {
            start_line,
            caption,
            header,
            rows,
            footnotes,
            citation,
        })
    }
}

/// First footnote line: `[a] ...` or a line whose first token is the bare letter `a`.
pub fn is_footnote_start(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("[a]") || line.split_whitespace().next() == Some("a")
}

/// Marker lines that found no partner. Kept so callers can tell a clean document
/// from one whose trailing markers were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IgnoredMarkers {
    pub starts: Vec<usize>,
    pub ends: Vec<usize>,
}

impl IgnoredMarkers {
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty() && self.ends.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Caption line number of each paired block, with the block or the reason it
    /// could not be read.
    pub blocks: Vec<(usize, Result<TableBlock, TableError>)>,
    pub ignored: IgnoredMarkers,
}

/// Pairs start and end marker lines positionally and cuts the document into blocks.
pub fn segment_tables(lines: &[String], config: &ExtractorConfig) -> Result<Segmentation, TableError> {
    let mut starts = Vec::new();
    let mut ends = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if line.starts_with(config.start_marker.as_str()) {
            starts.push(index);
        } else if line.starts_with(config.end_marker.as_str()) {
            ends.push(index);
        }
    }

    if config.strict_boundaries && starts.len() != ends.len() {
        return Err(TableError::MismatchedBoundaries {
            starts: starts.len(),
            ends: ends.len(),
        });
    }

    let paired = starts.len().min(ends.len());
    let ignored = IgnoredMarkers {
        starts: starts[paired..].to_vec(),
        ends: ends[paired..].to_vec(),
    };
    if !ignored.is_empty() {
        tracing::debug!(
            "Ignoring unmatched table markers: starts {:?}, ends {:?}",
            ignored.starts,
            ignored.ends
        );
    }

    let blocks = starts
        .iter()
        .zip(ends.iter())
        .map(|(&start, &end)| {
            let block = if end < start {
                Err(TableError::MalformedBlock {
                    start,
                    reason: format!("end marker at line {} precedes the caption", end),
                })
            } else {
                TableBlock::from_lines(start, &lines[start..=end])
            };
            (start, block)
        })
        .collect();

    Ok(Segmentation { blocks, ignored })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_block_parts() {
        let doc = lines(
            "Table 1. Screening\n\
             entry,catalyst,yield (%)\n\
             1,Pd(OAc)2,85a\n\
             \n\
             2,PdCl2,70\n\
             [a] Reaction conditions: 12 h\n\
             [b] Isolated yield\n\
             https://doi.org/10.1000/x",
        );
        let block = TableBlock::from_lines(0, &doc).unwrap();
        assert_eq!(block.caption, "Table 1. Screening");
        assert_eq!(block.rows.len(), 2, "blank lines are not rows");
        assert_eq!(block.footnotes.len(), 2);
        assert_eq!(block.citation, "https://doi.org/10.1000/x");
    }

    #[test]
    fn test_bare_letter_footnote_start_and_no_footnotes() {
        assert!(is_footnote_start("a Reaction conditions"));
        assert!(is_footnote_start("[a] Reaction conditions"));
        assert!(!is_footnote_start("analysis pending"));
        assert!(!is_footnote_start("1,Pd(OAc)2,85"));

        let doc = lines("Table 2\nEntry,yield\n1,50\n2,60\nhttp://x");
        let block = TableBlock::from_lines(4, &doc).unwrap();
        assert_eq!(block.rows, vec!["1,50".to_string(), "2,60".to_string()]);
        assert!(block.footnotes.is_empty());
        assert_eq!(block.start_line, 4);
    }

    #[test]
    fn test_missing_entry_column() {
        let doc = lines("Table 3\nrun,yield\n1,50\nhttp://x");
        let err = TableBlock::from_lines(0, &doc).unwrap_err();
        assert!(matches!(err, TableError::MissingEntryColumn { .. }));
    }

    #[test]
    fn test_segment_pairs_markers_positionally() {
        let doc = lines(
            "preamble\n\
             Table 1\nentry,yield\n1,50\nhttp://a\n\
             text between\n\
             Table 2\nentry,yield\n1,60\nhttp://b\n\
             Table 3 dangling",
        );
        let segmentation = segment_tables(&doc, &ExtractorConfig::default()).unwrap();
        assert_eq!(segmentation.blocks.len(), 2);
        assert!(segmentation.blocks.iter().all(|(_, b)| b.is_ok()));
        assert_eq!(segmentation.blocks[1].0, 6);
        assert_eq!(segmentation.ignored.starts, vec![10]);
        assert!(segmentation.ignored.ends.is_empty());
    }

    #[test]
    fn test_strict_boundaries_rejects_mismatch() {
        let doc = lines("Table 1\nentry,yield\n1,50\nhttp://a\nhttp://b");
        let config = ExtractorConfig {
            strict_boundaries: true,
            ..ExtractorConfig::default()
        };
        let err = segment_tables(&doc, &config).unwrap_err();
        assert_eq!(err, TableError::MismatchedBoundaries { starts: 1, ends: 2 });
    }

    #[test]
    fn test_inverted_and_short_blocks_are_malformed() {
        let doc = lines("http://early\nTable 1\nentry,yield\nhttp://late\nTable 2\nhttp://c");
        let segmentation = segment_tables(&doc, &ExtractorConfig::default()).unwrap();
        assert_eq!(segmentation.blocks.len(), 2);
        assert!(matches!(segmentation.blocks[0], (1, Err(TableError::MalformedBlock { start: 1, .. }))));
        assert!(matches!(segmentation.blocks[1], (4, Err(TableError::MalformedBlock { start: 4, .. }))));
        assert_eq!(segmentation.ignored.ends, vec![5]);
    }
}
