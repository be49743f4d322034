//! Cross-pair merge of scenario counts into one summary table.
//!
//! - Columns are the union of scenario labels observed across all inputs, in
//!   taxonomy order, so a pair lacking a scenario gets an explicit zero.
//! - Rows keep the order the entries are supplied in. The orchestrator
//!   supplies manifest order; file discovery sorts by file name.
//! - Two entries for the same pair are an error; neither is picked.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::counts::{MergedSummary, RowStatus, ScenarioCount, SummaryRow};
use crate::core::types::{PairId, Scenario};
use crate::parsing::tsv::parse_scenario_count_file;
use crate::pipeline::config::COUNTS_SUFFIX;
use crate::pipeline::PipelineError;

/// Outcome of one pair, as seen by the merger
#[derive(Debug, Clone)]
pub enum PairEntry {
    Counted(ScenarioCount),
    /// The pair produced no counts; its row is marked incomplete
    Failed(PairId),
}

impl PairEntry {
    fn pair(&self) -> &PairId {
        match self {
            Self::Counted(count) => &count.pair,
            Self::Failed(pair) => pair,
        }
    }
}

/// Merge per-pair counts, in the given order
///
/// # Errors
///
/// Returns `PipelineError::DuplicatePair` if two counts share a pair.
pub fn merge_counts(counts: &[ScenarioCount]) -> Result<MergedSummary, PipelineError> {
    let entries: Vec<PairEntry> = counts.iter().cloned().map(PairEntry::Counted).collect();
    merge_entries(&entries)
}

/// Merge counted and failed pairs, in the given order
///
/// # Errors
///
/// Returns `PipelineError::DuplicatePair` if two entries share a pair.
pub fn merge_entries(entries: &[PairEntry]) -> Result<MergedSummary, PipelineError> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.pair()) {
            return Err(PipelineError::DuplicatePair {
                pair: entry.pair().clone(),
            });
        }
    }

    let columns: Vec<Scenario> = entries
        .iter()
        .filter_map(|entry| match entry {
            PairEntry::Counted(count) => Some(count.counts.keys().copied()),
            PairEntry::Failed(_) => None,
        })
        .flatten()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows = entries
        .iter()
        .map(|entry| match entry {
            PairEntry::Counted(count) => SummaryRow {
                pair: count.pair.clone(),
                status: RowStatus::Complete,
                counts: Some(columns.iter().map(|&s| count.get(s)).collect()),
            },
            PairEntry::Failed(pair) => SummaryRow {
                pair: pair.clone(),
                status: RowStatus::Incomplete,
                counts: None,
            },
        })
        .collect();

    Ok(MergedSummary { columns, rows })
}

/// Find per-pair count files (`*.counts.tsv`) in `dir`, sorted by file name
///
/// # Errors
///
/// Returns `PipelineError::MissingInput` if `dir` is not a directory, or an
/// I/O error if it cannot be listed.
pub fn discover_count_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingInput {
            path: dir.to_path_buf(),
        });
    }

    let suffix = format!(".{COUNTS_SUFFIX}");
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&suffix));
        if matches && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    debug!(dir = %dir.display(), files = files.len(), "Discovered count files");
    Ok(files)
}

/// Read and merge count files, rows in file order then row order
///
/// # Errors
///
/// Returns `PipelineError::MissingInput` for a file that does not exist,
/// `PipelineError::MalformedRecord` for a file that cannot be parsed, or
/// `PipelineError::DuplicatePair` if two rows claim the same pair.
pub fn merge_count_files(paths: &[PathBuf]) -> Result<MergedSummary, PipelineError> {
    let mut counts = Vec::new();
    for path in paths {
        crate::pipeline::require_file(path)?;
        let parsed = parse_scenario_count_file(path).map_err(|e| {
            PipelineError::MalformedRecord(format!("{}: {e}", path.display()))
        })?;
        counts.extend(parsed);
    }

    let summary = merge_counts(&counts)?;
    info!(
        files = paths.len(),
        rows = summary.rows.len(),
        columns = summary.columns.len(),
        "Merged scenario counts"
    );
    Ok(summary)
}
