//! Parser for BED-style mask interval lists.
//!
//! Only the first three columns (`contig`, `start`, `end`) are used; extra
//! columns are ignored. `track`, `browser` and `#` lines are skipped.

use std::path::Path;

use crate::core::interval::MaskInterval;
use crate::parsing::ParseError;

/// Parse a BED file into mask intervals
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if a line is malformed.
pub fn parse_bed_file(path: &Path) -> Result<Vec<MaskInterval>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_bed_text(&content)
}

/// Parse BED text into mask intervals
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a line has fewer than 3 fields,
/// non-numeric coordinates, or `start >= end`.
pub fn parse_bed_text(text: &str) -> Result<Vec<MaskInterval>, ParseError> {
    let mut intervals = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with('#')
            || line.starts_with("track")
            || line.starts_with("browser")
        {
            continue;
        }

        let line_num = i + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(ParseError::InvalidFormat(format!(
                "BED line {line_num} has fewer than 3 fields"
            )));
        }

        let start: u64 = fields[1].parse().map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid start on BED line {line_num}: '{}'",
                fields[1]
            ))
        })?;
        let end: u64 = fields[2].parse().map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid end on BED line {line_num}: '{}'",
                fields[2]
            ))
        })?;

        let interval = MaskInterval::new(fields[0], start, end).ok_or_else(|| {
            ParseError::InvalidFormat(format!(
                "BED line {line_num}: start {start} is not before end {end}"
            ))
        })?;
        intervals.push(interval);
    }

    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bed_text() {
        let bed = "track name=repeats\n# comment\nchr1\t100\t108\tPE_PGRS\t0\t+\nchr1 200 250\n\n";
        let intervals = parse_bed_text(bed).unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0], MaskInterval::new("chr1", 100, 108).unwrap());
        assert_eq!(intervals[1].start, 200);
    }

    #[test]
    fn test_empty_bed_is_empty_mask() {
        assert!(parse_bed_text("").unwrap().is_empty());
    }

    #[test]
    fn test_bed_rejects_inverted_interval() {
        let err = parse_bed_text("chr1\t10\t10\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_bed_rejects_short_and_non_numeric_lines() {
        assert!(parse_bed_text("chr1\t10\n").is_err());
        assert!(parse_bed_text("chr1\tten\t20\n").is_err());
        assert!(parse_bed_text("chr1\t-5\t20\n").is_err());
    }
}
