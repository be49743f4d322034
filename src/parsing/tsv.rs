//! Tab-separated tables exchanged between pipeline stages.
//!
//! - **Difference table**: one [`DifferenceRecord`] per line, produced by the
//!   extractor and consumed/produced by the mask filter.
//! - **Scenario counts**: wide format, `reference_id query_id <labels...>`,
//!   one row per pair. Only observed labels appear as columns, so the table
//!   for a pair without variation is just the two id columns.
//! - **Merged summary**: `reference_id query_id status <labels...> total`.
//!
//! Absent loci are written as `.` in both the contig and position columns.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use crate::core::counts::{MergedSummary, ScenarioCount};
use crate::core::record::{DifferenceRecord, Locus};
use crate::core::types::{Operation, PairId, Scenario};
use crate::parsing::ParseError;

pub const DIFFERENCE_HEADER: [&str; 10] = [
    "reference_id",
    "query_id",
    "reference_contig",
    "reference_pos",
    "query_contig",
    "query_pos",
    "operation",
    "length",
    "reference_bases",
    "query_bases",
];

const MISSING: &str = ".";
const NOT_AVAILABLE: &str = "NA";

/// Write a difference table, header included
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_difference_table<W: Write>(
    writer: &mut W,
    records: &[DifferenceRecord],
) -> std::io::Result<()> {
    writeln!(writer, "{}", DIFFERENCE_HEADER.join("\t"))?;

    for record in records {
        let (ref_contig, ref_pos) = locus_fields(record.reference.as_ref());
        let (query_contig, query_pos) = locus_fields(record.query.as_ref());
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            record.pair.reference,
            record.pair.query,
            ref_contig,
            ref_pos,
            query_contig,
            query_pos,
            record.operation,
            record.length,
            record.reference_bases,
            record.query_bases,
        )?;
    }

    Ok(())
}

fn locus_fields(locus: Option<&Locus>) -> (&str, String) {
    match locus {
        Some(l) => (l.contig.as_str(), l.pos.to_string()),
        None => (MISSING, MISSING.to_string()),
    }
}

/// Parse a difference table file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` for the first malformed line.
pub fn parse_difference_file(path: &Path) -> Result<Vec<DifferenceRecord>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_difference_text(&content)
}

/// Parse difference table text. A header line, if present, is skipped.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` naming the 1-based line of the first
/// record that does not match the schema. Records are never coerced.
pub fn parse_difference_text(text: &str) -> Result<Vec<DifferenceRecord>, ParseError> {
    let mut records = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') || line.starts_with("reference_id\t") {
            continue;
        }

        let line_num = i + 1;
        let record = parse_difference_line(line).map_err(|msg| {
            ParseError::InvalidFormat(format!("Difference table line {line_num}: {msg}"))
        })?;
        records.push(record);
    }

    Ok(records)
}

fn parse_difference_line(line: &str) -> Result<DifferenceRecord, String> {
    let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
    if fields.len() != DIFFERENCE_HEADER.len() {
        return Err(format!(
            "expected {} columns, found {}",
            DIFFERENCE_HEADER.len(),
            fields.len()
        ));
    }

    let reference = parse_locus(fields[2], fields[3], "reference")?;
    let query = parse_locus(fields[4], fields[5], "query")?;
    if reference.is_none() && query.is_none() {
        return Err("record has neither a reference nor a query coordinate".to_string());
    }

    let operation =
        Operation::parse(fields[6]).ok_or_else(|| format!("unknown operation '{}'", fields[6]))?;
    let length: u64 = fields[7]
        .parse()
        .map_err(|_| format!("invalid length '{}'", fields[7]))?;

    if fields[8].is_empty() || fields[9].is_empty() {
        return Err("empty bases column".to_string());
    }

    Ok(DifferenceRecord {
        pair: PairId::new(fields[0], fields[1]),
        reference,
        query,
        operation,
        length,
        reference_bases: fields[8].to_string(),
        query_bases: fields[9].to_string(),
    })
}

fn parse_locus(contig: &str, pos: &str, side: &str) -> Result<Option<Locus>, String> {
    match (contig, pos) {
        (MISSING, MISSING) => Ok(None),
        (MISSING, _) | (_, MISSING) => Err(format!(
            "{side} contig and position must both be present or both be '.'"
        )),
        (contig, pos) => {
            let pos: u64 = pos
                .parse()
                .map_err(|_| format!("invalid {side} position '{pos}'"))?;
            Ok(Some(Locus::new(contig, pos)))
        }
    }
}

/// Write scenario counts in wide format.
///
/// Columns are the union of labels observed in `counts`, in taxonomy order.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_scenario_counts<W: Write>(
    writer: &mut W,
    counts: &[ScenarioCount],
) -> std::io::Result<()> {
    let mut labels: Vec<Scenario> = counts
        .iter()
        .flat_map(|c| c.counts.keys().copied())
        .collect();
    labels.sort_unstable();
    labels.dedup();

    let mut header = vec!["reference_id", "query_id"];
    header.extend(labels.iter().map(|s| s.label()));
    writeln!(writer, "{}", header.join("\t"))?;

    for count in counts {
        let mut row = vec![count.pair.reference.to_string(), count.pair.query.to_string()];
        row.extend(labels.iter().map(|&s| count.get(s).to_string()));
        writeln!(writer, "{}", row.join("\t"))?;
    }

    Ok(())
}

/// Parse a scenario count file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if the content is invalid.
pub fn parse_scenario_count_file(path: &Path) -> Result<Vec<ScenarioCount>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_scenario_count_text(&content)
}

/// Parse wide-format scenario counts. Columns present in the header are
/// recorded for every row, including explicit zeros.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the header is missing or has unknown
/// or repeated labels, or a row has the wrong width or a non-integer count.
pub fn parse_scenario_count_text(text: &str) -> Result<Vec<ScenarioCount>, ParseError> {
    let mut labels: Option<Vec<Scenario>> = None;
    let mut counts = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let line_num = i + 1;
        let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();

        let Some(columns) = &labels else {
            labels = Some(parse_count_header(&fields).map_err(|msg| {
                ParseError::InvalidFormat(format!("Scenario count header (line {line_num}): {msg}"))
            })?);
            continue;
        };

        if fields.len() != columns.len() + 2 {
            return Err(ParseError::InvalidFormat(format!(
                "Scenario count line {line_num}: expected {} columns, found {}",
                columns.len() + 2,
                fields.len()
            )));
        }

        let mut count = ScenarioCount::new(PairId::new(fields[0], fields[1]));
        for (scenario, value) in columns.iter().zip(&fields[2..]) {
            let n: u64 = value.parse().map_err(|_| {
                ParseError::InvalidFormat(format!(
                    "Scenario count line {line_num}: invalid count '{value}' for {scenario}"
                ))
            })?;
            count.counts.insert(*scenario, n);
        }
        counts.push(count);
    }

    if labels.is_none() {
        return Err(ParseError::InvalidFormat(
            "Scenario count table has no header".to_string(),
        ));
    }

    Ok(counts)
}

fn parse_count_header(fields: &[&str]) -> Result<Vec<Scenario>, String> {
    if fields.len() < 2 || fields[0] != "reference_id" || fields[1] != "query_id" {
        return Err("expected 'reference_id\\tquery_id' as the first columns".to_string());
    }

    let mut seen = HashSet::new();
    let mut labels = Vec::with_capacity(fields.len() - 2);
    for field in &fields[2..] {
        let scenario =
            Scenario::parse(field).ok_or_else(|| format!("unknown scenario label '{field}'"))?;
        if !seen.insert(scenario) {
            return Err(format!("scenario label '{field}' repeated"));
        }
        labels.push(scenario);
    }
    Ok(labels)
}

/// Write the merged summary; incomplete rows have `NA` cells
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_merged_summary<W: Write>(
    writer: &mut W,
    summary: &MergedSummary,
) -> std::io::Result<()> {
    let mut header = vec!["reference_id", "query_id", "status"];
    header.extend(summary.columns.iter().map(|s| s.label()));
    header.push("total");
    writeln!(writer, "{}", header.join("\t"))?;

    for row in &summary.rows {
        let mut cells = vec![
            row.pair.reference.to_string(),
            row.pair.query.to_string(),
            row.status.to_string(),
        ];
        match (&row.counts, row.total()) {
            (Some(values), Some(total)) => {
                cells.extend(values.iter().map(ToString::to_string));
                cells.push(total.to_string());
            }
            _ => {
                cells.extend(
                    std::iter::repeat(NOT_AVAILABLE.to_string()).take(summary.columns.len() + 1),
                );
            }
        }
        writeln!(writer, "{}", cells.join("\t"))?;
    }

    Ok(())
}
