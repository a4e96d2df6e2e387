//! FASTA parser.
//!
//! Handles single-line and multi-line records. Identifiers are kept for
//! logging; only the sequence data is submitted for prediction.
//!
//! ## FASTA Format
//!
//! ```text
//! >peptide_identifier optional description
//! GILGFVFTL
//! >another_peptide
//! SIIN
//! FEKL
//! ```

use thiserror::Error;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FastaError {
    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// A single FASTA record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Header text up to the first whitespace, without '>' (may be empty)
    pub id: String,
    /// Concatenated sequence lines, whitespace removed
    pub sequence: String,
}

/// Parses FASTA content from a string.
///
/// Blank lines are ignored. Records whose header has no sequence lines are
/// returned with an empty sequence; callers decide what to do with them.
pub fn parse_fasta_str(content: &str) -> FastaResult<Vec<FastaRecord>> {
    let mut records = Vec::new();
    let mut current: Option<FastaRecord> = None;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(record) = current.take() {
                records.push(record);
            }
            let id = header.split_whitespace().next().unwrap_or("").to_string();
            current = Some(FastaRecord {
                id,
                sequence: String::new(),
            });
        } else {
            let Some(record) = current.as_mut() else {
                return Err(FastaError::SequenceWithoutHeader(idx + 1));
            };

            // Fast append: most FASTA lines don't have internal whitespace
            if line.bytes().all(|b| !b.is_ascii_whitespace()) {
                record.sequence.push_str(line);
            } else {
                record
                    .sequence
                    .extend(line.chars().filter(|c| !c.is_whitespace()));
            }
        }
    }

    // Don't forget the last record
    if let Some(record) = current {
        records.push(record);
    }

    Ok(records)
}

/// Number of records with sequence data.
pub fn count_sequences(content: &str) -> FastaResult<usize> {
    Ok(parse_fasta_str(content)?
        .iter()
        .filter(|r| !r.sequence.is_empty())
        .count())
}
