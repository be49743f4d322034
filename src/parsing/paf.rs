//! Parser for PAF (Pairwise mApping Format) alignments.
//!
//! Columns (tab-separated, 0-based half-open coordinates):
//!
//! | # | Field | Meaning here |
//! |---|-------|--------------|
//! | 1-4 | qname, qlen, qstart, qend | query genome contig |
//! | 5 | strand | `+` or `-` |
//! | 6-9 | tname, tlen, tstart, tend | reference genome contig |
//! | 10-12 | matches, block length, mapq | ignored |
//! | 13+ | `TAG:TYPE:VALUE` | `cg:Z:` CIGAR is required |
//!
//! The CIGAR must come from a base-level alignment (`minimap2 -c`); with
//! `--eqx` it distinguishes `=` from `X`, otherwise `M` columns are resolved
//! against the sequences by the extractor.

use std::path::Path;

use crate::core::segment::{AlignOp, AlignmentSegment, OpKind};
use crate::core::types::Strand;
use crate::parsing::ParseError;

const MANDATORY_COLUMNS: usize = 12;

/// Parse a PAF file into alignment segments, in file order
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` for the first line that cannot be parsed.
pub fn parse_paf_file(path: &Path) -> Result<Vec<AlignmentSegment>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_paf_text(&content)
}

/// Parse PAF text into alignment segments, in input order
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` naming the 1-based line number of the
/// first malformed record.
pub fn parse_paf_text(text: &str) -> Result<Vec<AlignmentSegment>, ParseError> {
    let mut segments = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let line_num = i + 1;
        let segment = parse_paf_line(line)
            .map_err(|msg| ParseError::InvalidFormat(format!("PAF line {line_num}: {msg}")))?;
        segments.push(segment);
    }

    Ok(segments)
}

fn parse_paf_line(line: &str) -> Result<AlignmentSegment, String> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if fields.len() < MANDATORY_COLUMNS {
        return Err(format!(
            "expected at least {MANDATORY_COLUMNS} columns, found {}",
            fields.len()
        ));
    }

    let strand = Strand::parse(fields[4]).ok_or_else(|| format!("invalid strand '{}'", fields[4]))?;

    let cigar = fields[MANDATORY_COLUMNS..]
        .iter()
        .find_map(|tag| tag.strip_prefix("cg:Z:"))
        .ok_or_else(|| "missing cg:Z: CIGAR tag (align with base-level output)".to_string())?;

    let segment = AlignmentSegment {
        query_contig: fields[0].to_string(),
        query_length: parse_coord(fields[1], "query length")?,
        query_start: parse_coord(fields[2], "query start")?,
        query_end: parse_coord(fields[3], "query end")?,
        strand,
        reference_contig: fields[5].to_string(),
        reference_length: parse_coord(fields[6], "reference length")?,
        reference_start: parse_coord(fields[7], "reference start")?,
        reference_end: parse_coord(fields[8], "reference end")?,
        ops: parse_cigar(cigar)?,
    };

    segment.validate()?;
    Ok(segment)
}

fn parse_coord(field: &str, what: &str) -> Result<u64, String> {
    field
        .parse()
        .map_err(|_| format!("invalid {what} '{field}'"))
}

/// Parse a CIGAR string restricted to `M`, `=`, `X`, `I` and `D`.
///
/// Adjacent operations of the same kind are kept separate, in input order.
///
/// # Errors
///
/// Returns a description of the problem for empty strings, zero lengths,
/// missing lengths, or unsupported operations.
pub fn parse_cigar(cigar: &str) -> Result<Vec<AlignOp>, String> {
    if cigar.is_empty() {
        return Err("empty CIGAR".to_string());
    }

    let mut ops = Vec::new();
    let mut len: Option<u64> = None;

    for c in cigar.chars() {
        if let Some(digit) = c.to_digit(10) {
            let current = len.unwrap_or(0);
            len = Some(
                current
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(u64::from(digit)))
                    .ok_or_else(|| format!("CIGAR length overflow in '{cigar}'"))?,
            );
            continue;
        }

        let kind = match c {
            'M' | '=' => OpKind::Match,
            'X' => OpKind::Mismatch,
            'I' => OpKind::Insertion,
            'D' => OpKind::Deletion,
            other => return Err(format!("unsupported CIGAR operation '{other}'")),
        };

        match len.take() {
            Some(0) => return Err(format!("zero-length CIGAR operation '{c}'")),
            Some(n) => ops.push(AlignOp::new(kind, n)),
            None => return Err(format!("CIGAR operation '{c}' has no length")),
        }
    }

    if len.is_some() {
        return Err(format!("CIGAR '{cigar}' ends with a dangling length"));
    }

    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "L1_chr\t200\t100\t110\t+\tH37Rv_chr\t300\t100\t110\t9\t10\t60\tNM:i:1\tcg:Z:5=1X4=";

    #[test]
    fn test_parse_cigar() {
        let ops = parse_cigar("5=1X4M2I3D").unwrap();
        assert_eq!(
            ops,
            vec![
                AlignOp::new(OpKind::Match, 5),
                AlignOp::new(OpKind::Mismatch, 1),
                AlignOp::new(OpKind::Match, 4),
                AlignOp::new(OpKind::Insertion, 2),
                AlignOp::new(OpKind::Deletion, 3),
            ]
        );
    }

    #[test]
    fn test_parse_cigar_rejects_bad_input() {
        assert!(parse_cigar("").is_err());
        assert!(parse_cigar("M").is_err());
        assert!(parse_cigar("5S10M").is_err());
        assert!(parse_cigar("0M").is_err());
        assert!(parse_cigar("10M5").is_err());
    }

    #[test]
    fn test_parse_paf_line() {
        let segments = parse_paf_text(LINE).unwrap();
        assert_eq!(segments.len(), 1);
        let seg = &segments[0];
        assert_eq!(seg.reference_contig, "H37Rv_chr");
        assert_eq!(seg.reference_start, 100);
        assert_eq!(seg.reference_end, 110);
        assert_eq!(seg.query_contig, "L1_chr");
        assert_eq!(seg.strand, Strand::Forward);
        assert_eq!(seg.ops.len(), 3);
    }

    #[test]
    fn test_parse_paf_skips_comments_and_blanks() {
        let text = format!("# aligner output\n\n{LINE}\n{LINE}\n");
        assert_eq!(parse_paf_text(&text).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_cigar_reports_line() {
        let text = "q\t10\t0\t10\t+\tr\t10\t0\t10\t10\t10\t60\n";
        let err = parse_paf_text(&format!("{LINE}\n{text}")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 2"), "{msg}");
        assert!(msg.contains("cg:Z:"), "{msg}");
    }

    #[test]
    fn test_span_mismatch_is_rejected() {
        let bad = LINE.replace("cg:Z:5=1X4=", "cg:Z:5=1X3=");
        assert!(parse_paf_text(&bad).is_err());
    }

    #[test]
    fn test_overflowing_cigar_total_is_rejected() {
        let bad = LINE.replace("cg:Z:5=1X4=", "cg:Z:18446744073709551615=1=");
        let msg = parse_paf_text(&bad).unwrap_err().to_string();
        assert!(msg.contains("overflows"), "{msg}");

        let bad = LINE.replace("cg:Z:5=1X4=", "cg:Z:10=18446744073709551615I1I");
        assert!(parse_paf_text(&bad).is_err());
    }

    #[test]
    fn test_invalid_strand() {
        let bad = LINE.replace("\t+\t", "\t*\t");
        assert!(parse_paf_text(&bad).is_err());
    }
}
