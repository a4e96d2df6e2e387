//! Sequence file ingestion and result output.
//!
//! Supports automatic format detection for:
//! - Plain text (.txt): one peptide per line
//! - CSV (.csv): first column, or a column headed `peptide`
//! - FASTA (.fasta, .fa, .fas, .faa)
//!
//! Format detection priority:
//! 1. Explicit format specification (-f option)
//! 2. File extension
//! 3. Content-based detection
//!
//! Loaded sequences end up as editor text, so they go through the same
//! normalization as typed input when submitted.

pub mod delimited;
pub mod fasta;

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

use crate::model::{InputFormat, PredictionRecord};
use crate::normalize::split_peptides;
use crate::table::format_score;

/// Sequence file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFileFormat {
    Txt,
    Csv,
    Fasta,
}

impl std::fmt::Display for SequenceFileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceFileFormat::Txt => write!(f, "TXT"),
            SequenceFileFormat::Csv => write!(f, "CSV"),
            SequenceFileFormat::Fasta => write!(f, "FASTA"),
        }
    }
}

/// Errors that can occur while loading a sequence file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] io::Error),

    #[error("No sequences found")]
    EmptyFile,

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("FASTA error: {0}")]
    FastaError(#[from] fasta::FastaError),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Sequences read from a file, ready to be placed in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSequences {
    /// Editor text
    pub text: String,
    /// How the editor should interpret `text`
    pub input_format: InputFormat,
    /// Format the file was read as
    pub format: SequenceFileFormat,
    /// Number of sequences found
    pub count: usize,
}

/// Detects format from file extension.
pub fn detect_format_from_extension<P: AsRef<Path>>(path: P) -> Option<SequenceFileFormat> {
    let ext = path.as_ref().extension().and_then(OsStr::to_str)?;
    match ext.to_lowercase().as_str() {
        "txt" | "pep" => Some(SequenceFileFormat::Txt),
        "csv" => Some(SequenceFileFormat::Csv),
        "fa" | "fas" | "fasta" | "faa" => Some(SequenceFileFormat::Fasta),
        _ => None,
    }
}

/// Detects the file format from the first non-empty line.
pub fn detect_format_from_content(content: &str) -> SequenceFileFormat {
    match content.lines().map(str::trim).find(|line| !line.is_empty()) {
        Some(line) if line.starts_with('>') => SequenceFileFormat::Fasta,
        Some(line) if line.contains(',') => SequenceFileFormat::Csv,
        _ => SequenceFileFormat::Txt,
    }
}

/// Parses content with a specific format.
pub fn parse_content(content: &str, format: SequenceFileFormat) -> LoadResult<LoadedSequences> {
    let loaded = match format {
        SequenceFileFormat::Txt => {
            let peptides = split_peptides(content);
            LoadedSequences {
                count: peptides.len(),
                text: peptides.join("\n"),
                input_format: InputFormat::Peptide,
                format,
            }
        }
        SequenceFileFormat::Csv => {
            let peptides = delimited::parse_csv_str(content)?;
            LoadedSequences {
                count: peptides.len(),
                text: peptides.join("\n"),
                input_format: InputFormat::Peptide,
                format,
            }
        }
        SequenceFileFormat::Fasta => LoadedSequences {
            count: fasta::count_sequences(content)?,
            text: content.trim_end().to_string(),
            input_format: InputFormat::Fasta,
            format,
        },
    };

    if loaded.count == 0 {
        return Err(LoadError::EmptyFile);
    }
    Ok(loaded)
}

/// Loads a sequence file with optional format specification.
pub fn load_sequences<P: AsRef<Path>>(
    path: P,
    forced_format: Option<SequenceFileFormat>,
) -> LoadResult<LoadedSequences> {
    let content = fs::read_to_string(&path)?;

    let format = forced_format
        .or_else(|| detect_format_from_extension(&path))
        .unwrap_or_else(|| detect_format_from_content(&content));

    parse_content(&content, format)
}

/// Writes predictions as tab-separated values with a header line.
pub fn write_tsv<W: Write>(mut writer: W, records: &[PredictionRecord]) -> io::Result<()> {
    writeln!(writer, "id\tallele\tmhc\tpeptide\tlabel\tscore")?;
    for r in records {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            r.id,
            r.allele,
            r.mhc_sequence,
            r.peptide,
            r.label,
            format_score(r.score)
        )?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::model::Allele;

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(detect_format_from_extension("peps.txt"), Some(SequenceFileFormat::Txt));
        assert_eq!(detect_format_from_extension("peps.CSV"), Some(SequenceFileFormat::Csv));
        assert_eq!(detect_format_from_extension("peps.fa"), Some(SequenceFileFormat::Fasta));
        assert_eq!(detect_format_from_extension("peps.fasta"), Some(SequenceFileFormat::Fasta));
        assert_eq!(detect_format_from_extension("peps.xlsx"), None);
        assert_eq!(detect_format_from_extension("peps"), None);
    }

    #[test]
    fn test_detect_from_content() {
        assert_eq!(detect_format_from_content("\n\n>pep1\nAAA"), SequenceFileFormat::Fasta);
        assert_eq!(detect_format_from_content("peptide,score\nAAA,1"), SequenceFileFormat::Csv);
        assert_eq!(detect_format_from_content("AAA\nBBB"), SequenceFileFormat::Txt);
        assert_eq!(detect_format_from_content(""), SequenceFileFormat::Txt);
    }

    #[test]
    fn test_load_txt_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "  SIINFEKL\n\n GILGFVFTL\n").unwrap();

        let loaded = load_sequences(file.path(), None).unwrap();
        assert_eq!(loaded.format, SequenceFileFormat::Txt);
        assert_eq!(loaded.text, "SIINFEKL\nGILGFVFTL");
        assert_eq!(loaded.count, 2);
        assert_eq!(loaded.input_format, InputFormat::Peptide);
    }

    #[test]
    fn test_load_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "id,peptide\n1,SIINFEKL\n2,NLVPMVATV").unwrap();

        let loaded = load_sequences(file.path(), None).unwrap();
        assert_eq!(loaded.format, SequenceFileFormat::Csv);
        assert_eq!(loaded.text, "SIINFEKL\nNLVPMVATV");
    }

    #[test]
    fn test_load_fasta_by_content() {
        let mut file = tempfile::Builder::new().suffix(".dat").tempfile().unwrap();
        writeln!(file, ">a\nSIIN\nFEKL\n>b\nGILGFVFTL\n").unwrap();

        let loaded = load_sequences(file.path(), None).unwrap();
        assert_eq!(loaded.format, SequenceFileFormat::Fasta);
        assert_eq!(loaded.input_format, InputFormat::Fasta);
        assert_eq!(loaded.count, 2);
        assert!(loaded.text.starts_with(">a"));
    }

    #[test]
    fn test_forced_format_wins() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "SIINFEKL,GILGFVFTL").unwrap();

        let loaded = load_sequences(file.path(), Some(SequenceFileFormat::Txt)).unwrap();
        assert_eq!(loaded.text, "SIINFEKL,GILGFVFTL");
        assert_eq!(loaded.count, 1);
    }

    #[test]
    fn test_empty_and_missing_files() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(load_sequences(file.path(), None), Err(LoadError::EmptyFile)));
        assert!(matches!(
            load_sequences("/nonexistent/peps.txt", None),
            Err(LoadError::IoError(_))
        ));
    }

    #[test]
    fn test_write_tsv() {
        let records = vec![PredictionRecord {
            id: "0000002a-0000".to_string(),
            allele: Allele::A0201,
            mhc_sequence: "YFAMYQENMAHTDANTLYIIRDYTWVARVYRGY".to_string(),
            peptide: "SIINFEKL".to_string(),
            label: 1,
            score: 0.25,
        }];
        let mut out = Vec::new();
        write_tsv(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id\tallele\tmhc\tpeptide\tlabel\tscore");
        assert_eq!(
            lines[1],
            "0000002a-0000\tHLA-A*02:01\tYFAMYQENMAHTDANTLYIIRDYTWVARVYRGY\tSIINFEKL\t1\t0.250000000000"
        );
    }
}
