//! Input normalization.
//!
//! Turns the free text of the sequence editor plus an allele selection into
//! a validated [`PredictionRequest`]:
//!
//! - Peptide input: one sequence per line, lines trimmed, blank lines dropped
//! - FASTA input: `>` headers stripped, sequence lines of a record joined
//!
//! Nothing here has side effects.

use thiserror::Error;

use crate::formats::fasta::{parse_fasta_str, FastaError};
use crate::model::{Allele, InputFormat, PredictionRequest};

/// Reasons a submission is refused before reaching the prediction source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Enter at least one sequence")]
    EmptyInput,

    #[error("Unknown HLA allele: {0}")]
    InvalidAllele(String),

    #[error("Sequence without FASTA header at line {0}")]
    SequenceWithoutHeader(usize),
}

impl From<FastaError> for ValidationError {
    fn from(err: FastaError) -> Self {
        match err {
            FastaError::SequenceWithoutHeader(line) => ValidationError::SequenceWithoutHeader(line),
        }
    }
}

/// Normalizes raw text and an allele name into a request.
///
/// The allele must be one of [`Allele::ALL`]; at least one sequence must remain
/// after trimming.
pub fn normalize(
    raw_text: &str,
    input_format: InputFormat,
    allele: &str,
) -> Result<PredictionRequest, ValidationError> {
    let allele: Allele = allele.parse()?;
    build_request(raw_text, input_format, allele)
}

/// Same as [`normalize`] for an allele that is already typed.
pub fn build_request(
    raw_text: &str,
    input_format: InputFormat,
    allele: Allele,
) -> Result<PredictionRequest, ValidationError> {
    let sequences = match input_format {
        InputFormat::Peptide => split_peptides(raw_text),
        InputFormat::Fasta => split_fasta(raw_text)?,
    };

    if sequences.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    Ok(PredictionRequest {
        sequences,
        input_format,
        allele,
    })
}

/// One sequence per trimmed, non-blank line.
pub fn split_peptides(raw_text: &str) -> Vec<String> {
    raw_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// One sequence per FASTA record; records without sequence data are dropped.
pub fn split_fasta(raw_text: &str) -> Result<Vec<String>, ValidationError> {
    let records = parse_fasta_str(raw_text)?;
    Ok(records
        .into_iter()
        .filter(|r| {
            if r.sequence.is_empty() {
                log::debug!("Skipping FASTA record '{}' without sequence", r.id);
            }
            !r.sequence.is_empty()
        })
        .map(|r| r.sequence)
        .collect())
}
