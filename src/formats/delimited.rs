//! CSV peptide lists.
//!
//! Accepts either a bare first column of peptides or a table with a header
//! row naming a `peptide` (or `sequence`) column.

use csv::{ReaderBuilder, Trim};

/// Header names recognised as the peptide column.
const PEPTIDE_HEADERS: [&str; 2] = ["peptide", "sequence"];

/// Extracts peptides from CSV content.
///
/// Rows are allowed to have different lengths; empty cells are skipped.
pub fn parse_csv_str(content: &str) -> Result<Vec<String>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut peptides = Vec::new();
    let mut column = 0;

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;

        if row_idx == 0 {
            let header = record
                .iter()
                .position(|field| PEPTIDE_HEADERS.iter().any(|h| field.eq_ignore_ascii_case(h)));
            if let Some(idx) = header {
                column = idx;
                continue;
            }
        }

        if let Some(field) = record.get(column) {
            if !field.is_empty() {
                peptides.push(field.to_string());
            }
        }
    }

    Ok(peptides)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_column_without_header() {
        let peptides = parse_csv_str("SIINFEKL,0.9\nGILGFVFTL,0.2\n").unwrap();
        assert_eq!(peptides, vec!["SIINFEKL", "GILGFVFTL"]);
    }

    #[test]
    fn test_named_peptide_column() {
        let content = "id,Peptide,source\n1, SIINFEKL ,ova\n2,,empty\n3,NLVPMVATV,cmv\n";
        let peptides = parse_csv_str(content).unwrap();
        assert_eq!(peptides, vec!["SIINFEKL", "NLVPMVATV"]);
    }

    #[test]
    fn test_ragged_rows() {
        let content = "sequence\nSIINFEKL,extra,fields\nGILGFVFTL\n";
        let peptides = parse_csv_str(content).unwrap();
        assert_eq!(peptides, vec!["SIINFEKL", "GILGFVFTL"]);
    }

    #[test]
    fn test_quoted_fields() {
        let peptides = parse_csv_str("\"SIINFEKL\",\"a, b\"\n").unwrap();
        assert_eq!(peptides, vec!["SIINFEKL"]);
    }
}
