use std::collections::HashSet;
use std::path::Path;

use crate::core::types::PairId;
use crate::parsing::ParseError;
use crate::utils::validation::validate_genome_id;

/// Parse a manifest file listing `<reference_id> <query_id>` pairs
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_manifest_file(path: &Path) -> Result<Vec<PairId>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_manifest_text(&content)
}

/// Parse manifest text.
///
/// The first non-empty, non-comment line is a header and is ignored. Fields
/// are separated by tabs or spaces; columns after the second are ignored.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a line has fewer than 2 fields,
/// an id is not usable in a file name, or a pair is listed twice.
pub fn parse_manifest_text(text: &str) -> Result<Vec<PairId>, ParseError> {
    let mut pairs = Vec::new();
    let mut seen = HashSet::new();
    let mut header_skipped = false;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if !header_skipped {
            header_skipped = true;
            continue;
        }

        let line_num = i + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(ParseError::InvalidFormat(format!(
                "Manifest line {line_num} has fewer than 2 fields"
            )));
        }

        for id in &fields[..2] {
            validate_genome_id(id).map_err(|e| {
                ParseError::InvalidFormat(format!("Manifest line {line_num}: '{id}': {e}"))
            })?;
        }

        let pair = PairId::new(fields[0], fields[1]);
        if !seen.insert(pair.clone()) {
            return Err(ParseError::InvalidFormat(format!(
                "Manifest line {line_num} repeats pair {pair}"
            )));
        }
        pairs.push(pair);
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest_skips_header() {
        let text = "reference\tquery\nH37Rv\tL1\nH37Rv  L2\n";
        let pairs = parse_manifest_text(text).unwrap();
        assert_eq!(
            pairs,
            vec![PairId::new("H37Rv", "L1"), PairId::new("H37Rv", "L2")]
        );
    }

    #[test]
    fn test_header_after_comments() {
        let text = "# pairs to compare\n\nref query\nA B\n";
        let pairs = parse_manifest_text(text).unwrap();
        assert_eq!(pairs, vec![PairId::new("A", "B")]);
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(parse_manifest_text("ref\tquery\n").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let err = parse_manifest_text("r q\nA B\nA B\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_underscored_pairs_keep_distinct_stems() {
        let pairs = parse_manifest_text("r q\nA_vs_B C\nA B_vs_C\n").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_ne!(pairs[0].file_stem(), pairs[1].file_stem());
        assert!(parse_manifest_text("r q\nA+B C\n").is_err());
    }

    #[test]
    fn test_unsafe_id_rejected() {
        assert!(parse_manifest_text("r q\n../etc B\n").is_err());
        assert!(parse_manifest_text("r q\nA\n").is_err());
    }
}
