//! Runs the pipeline for every pair of a manifest.
//!
//! Pairs are processed one at a time, in manifest order. A failing pair is
//! logged and recorded, and the batch moves on; the summary marks it
//! incomplete rather than reporting zero variation.
//!
//! Per-pair intermediates are named `<reference>+<query>.<stage>` so that
//! independent runs can share an output directory.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::counts::{MergedSummary, ScenarioCount};
use crate::core::interval::IntervalSet;
use crate::core::types::{GenomeId, PairId};
use crate::parsing::bed::parse_bed_file;
use crate::parsing::fasta::load_genome;
use crate::parsing::manifest::parse_manifest_file;
use crate::parsing::paf::parse_paf_file;
use crate::parsing::tsv::{write_difference_table, write_merged_summary, write_scenario_counts};
use crate::pipeline::aligner::Aligner;
use crate::pipeline::config::{PipelineConfig, COUNTS_SUFFIX};
use crate::pipeline::count::count_scenarios;
use crate::pipeline::mask::apply_masks;
use crate::pipeline::merge::{merge_entries, PairEntry};
use crate::pipeline::transform::{extract_differences, TransformOptions};
use crate::pipeline::{require_file, PipelineError};

/// Per-pair tables derived from the alignment
const DERIVED_SUFFIXES: [&str; 3] = ["diff.tsv", "masked.tsv", COUNTS_SUFFIX];

/// A pair that could not be processed
#[derive(Debug, Clone, Serialize)]
pub struct PairFailure {
    pub pair: PairId,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: MergedSummary,
    pub failures: Vec<PairFailure>,
    pub summary_path: PathBuf,
}

pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    aligner: &'a dyn Aligner,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(config: &'a PipelineConfig, aligner: &'a dyn Aligner) -> Self {
        Self { config, aligner }
    }

    /// Read the manifest and run every pair it lists
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingInput` if the manifest does not exist,
    /// `PipelineError::MalformedRecord` if it cannot be parsed, or an I/O error
    /// if the output directory or summary cannot be written. Per-pair errors
    /// are reported in the [`RunReport`] instead.
    pub fn run_manifest(&self, manifest: &Path) -> Result<RunReport, PipelineError> {
        require_file(manifest)?;
        let pairs = parse_manifest_file(manifest)?;
        info!(manifest = %manifest.display(), pairs = pairs.len(), "Loaded manifest");
        self.run(&pairs)
    }

    /// Run every pair in order, then merge and write the summary
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the output directory or summary cannot be written.
    pub fn run(&self, pairs: &[PairId]) -> Result<RunReport, PipelineError> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let mut entries = Vec::with_capacity(pairs.len());
        let mut failures = Vec::new();

        for (i, pair) in pairs.iter().enumerate() {
            info!(pair = %pair, "Processing pair {}/{}", i + 1, pairs.len());
            match self.run_pair(pair) {
                Ok(count) => entries.push(PairEntry::Counted(count)),
                Err(e) => {
                    warn!(pair = %pair, error = %e, "Skipping pair");
                    failures.push(PairFailure {
                        pair: pair.clone(),
                        reason: e.to_string(),
                    });
                    entries.push(PairEntry::Failed(pair.clone()));
                }
            }
        }

        let summary = merge_entries(&entries)?;
        let summary_path = self.config.summary_path();
        write_file(&summary_path, |w| write_merged_summary(w, &summary))?;

        info!(
            completed = summary.complete_rows(),
            failed = failures.len(),
            summary = %summary_path.display(),
            "Pipeline finished"
        );

        Ok(RunReport {
            summary,
            failures,
            summary_path,
        })
    }

    /// Align, extract, mask and count one pair, writing its intermediates
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingInput` for a missing FASTA or BED file,
    /// `PipelineError::Aligner` if no alignment could be produced, or any
    /// error from the extract, mask and count stages.
    pub fn run_pair(&self, pair: &PairId) -> Result<ScenarioCount, PipelineError> {
        self.clear_outputs(pair)?;

        let reference_fasta = self.config.fasta_path(&pair.reference)?;
        let query_fasta = self.config.fasta_path(&pair.query)?;
        let reference_mask = self.load_mask(&pair.reference)?;
        let query_mask = self.load_mask(&pair.query)?;

        let paf_path = self.config.pair_path(pair, "paf");
        if self.config.reuse_alignments && paf_path.is_file() {
            info!(paf = %paf_path.display(), "Reusing existing alignment");
        } else {
            self.aligner.align(&reference_fasta, &query_fasta, &paf_path)?;
        }
        if !paf_path.is_file() {
            return Err(PipelineError::Aligner(format!(
                "no alignment written to {}",
                paf_path.display()
            )));
        }

        let reference = load_genome(&reference_fasta, pair.reference.as_str())?;
        let query = load_genome(&query_fasta, pair.query.as_str())?;
        let segments = parse_paf_file(&paf_path)?;

        let options = TransformOptions {
            overlap_policy: self.config.overlap_policy,
            emit_gaps: self.config.emit_gaps,
        };
        let records = extract_differences(&reference, &query, &segments, &options)?;
        write_file(&self.config.pair_path(pair, "diff.tsv"), |w| {
            write_difference_table(w, &records)
        })?;

        let masked = apply_masks(&records, &reference_mask, &query_mask);
        write_file(&self.config.pair_path(pair, "masked.tsv"), |w| {
            write_difference_table(w, &masked.records)
        })?;

        let count = count_scenarios(pair, &masked.records)?;
        write_file(&self.config.pair_path(pair, COUNTS_SUFFIX), |w| {
            write_scenario_counts(w, std::slice::from_ref(&count))
        })?;

        Ok(count)
    }

    /// Remove the derived tables of an earlier run so a failure cannot leave
    /// them behind for `merge --dir` to pick up. The alignment is kept for
    /// `reuse_alignments`.
    fn clear_outputs(&self, pair: &PairId) -> Result<(), PipelineError> {
        for suffix in DERIVED_SUFFIXES {
            let path = self.config.pair_path(pair, suffix);
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed previous output"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn load_mask(&self, id: &GenomeId) -> Result<IntervalSet, PipelineError> {
        let path = self.config.mask_path(id);
        if !path.is_file() {
            if self.config.require_masks {
                return Err(PipelineError::MissingInput { path });
            }
            warn!(genome = %id, path = %path.display(), "No mask file, nothing will be masked");
            return Ok(IntervalSet::new());
        }

        let intervals = parse_bed_file(&path)?;
        let mask = IntervalSet::from_intervals(&intervals);
        if mask.is_empty() {
            debug!(genome = %id, path = %path.display(), "Mask file has no intervals");
        }
        Ok(mask)
    }
}

/// Create `path` and fill it through a buffered writer
///
/// # Errors
///
/// Returns any I/O error from creating, writing or flushing the file.
pub fn write_file<F>(path: &Path, fill: F) -> Result<(), PipelineError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    fill(&mut writer)?;
    writer.flush()?;
    Ok(())
}
