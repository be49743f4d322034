//! Explicit pipeline configuration.
//!
//! Every stage receives its input and output locations from a
//! [`PipelineConfig`], so nothing depends on the current working directory.
//! The configuration can be loaded from JSON and then overridden from the
//! command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::types::{GenomeId, PairId};
use crate::parsing::fasta::FASTA_EXTENSIONS;
use crate::pipeline::PipelineError;

/// File name of the merged summary inside the output directory
pub const SUMMARY_FILE_NAME: &str = "summary.tsv";

/// Suffix of per-pair scenario count files, used by merge discovery
pub const COUNTS_SUFFIX: &str = "counts.tsv";

/// How records from overlapping alignment segments are reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Keep the record from the first segment reporting a reference coordinate
    #[default]
    FirstSeen,
    /// Keep every record, even when segments overlap
    KeepAll,
}

/// External aligner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// Aligner executable
    pub program: PathBuf,

    /// Assembly-to-assembly preset (`asm5`, `asm10`, `asm20`)
    pub preset: String,

    /// Extra arguments appended before the input files
    pub extra_args: Vec<String>,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("minimap2"),
            preset: "asm5".to_string(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding `<id>.fasta` files
    pub genome_dir: PathBuf,

    /// Directory holding `<id>.bed` files; defaults to `genome_dir`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_dir: Option<PathBuf>,

    /// Directory receiving intermediates and the summary
    pub output_dir: PathBuf,

    pub overlap_policy: OverlapPolicy,

    /// Emit Gap records for unaligned reference and query regions. Ambiguous
    /// runs inside those regions are reported as NRUN records either way.
    pub emit_gaps: bool,

    /// Treat a missing BED file as a failed pair rather than an empty mask
    pub require_masks: bool,

    /// Reuse an existing PAF for a pair instead of re-running the aligner
    pub reuse_alignments: bool,

    pub aligner: AlignerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            genome_dir: PathBuf::from("."),
            mask_dir: None,
            output_dir: PathBuf::from("varscen_out"),
            overlap_policy: OverlapPolicy::FirstSeen,
            emit_gaps: true,
            require_masks: true,
            reuse_alignments: false,
            aligner: AlignerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; absent keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingInput` if the file does not exist, or
    /// `PipelineError::Config` if it is not valid JSON for this schema.
    pub fn load_from_file(path: &Path) -> Result<Self, PipelineError> {
        crate::pipeline::require_file(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a configuration from JSON
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Config` if the JSON does not match the schema.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json).map_err(|e| PipelineError::Config(e.to_string()))
    }

    #[must_use]
    pub fn mask_dir(&self) -> &Path {
        self.mask_dir.as_deref().unwrap_or(&self.genome_dir)
    }

    /// Resolve the FASTA of a genome, trying each known extension in turn
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingInput` naming `<genome_dir>/<id>.fasta`
    /// when no candidate exists.
    pub fn fasta_path(&self, id: &GenomeId) -> Result<PathBuf, PipelineError> {
        FASTA_EXTENSIONS
            .iter()
            .map(|ext| self.genome_dir.join(format!("{id}.{ext}")))
            .find(|path| path.is_file())
            .ok_or_else(|| PipelineError::MissingInput {
                path: self.genome_dir.join(format!("{id}.fasta")),
            })
    }

    #[must_use]
    pub fn mask_path(&self, id: &GenomeId) -> PathBuf {
        self.mask_dir().join(format!("{id}.bed"))
    }

    /// Pair-unique intermediate path, e.g. `<output_dir>/H37Rv+L1.paf`
    #[must_use]
    pub fn pair_path(&self, pair: &PairId, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{suffix}", pair.file_stem()))
    }

    #[must_use]
    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(SUMMARY_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_json_partial() {
        let config = PipelineConfig::from_json(
            r#"{"genome_dir": "/data/genomes", "overlap_policy": "keep-all", "aligner": {"preset": "asm20"}}"#,
        )
        .unwrap();
        assert_eq!(config.genome_dir, PathBuf::from("/data/genomes"));
        assert_eq!(config.overlap_policy, OverlapPolicy::KeepAll);
        assert_eq!(config.aligner.preset, "asm20");
        assert_eq!(config.aligner.program, PathBuf::from("minimap2"));
        assert!(config.emit_gaps);
        assert_eq!(config.mask_dir(), Path::new("/data/genomes"));
    }

    #[test]
    fn test_from_json_rejects_unknown_policy() {
        let err = PipelineConfig::from_json(r#"{"overlap_policy": "last-seen"}"#).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_missing_config_file() {
        let err = PipelineConfig::load_from_file(Path::new("/nonexistent/varscen.json")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { .. }));
    }

    #[test]
    fn test_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("L1.fa"), ">c\nA\n").unwrap();

        let config = PipelineConfig {
            genome_dir: dir.path().to_path_buf(),
            output_dir: PathBuf::from("/out"),
            ..PipelineConfig::default()
        };

        assert_eq!(
            config.fasta_path(&GenomeId::new("L1")).unwrap(),
            dir.path().join("L1.fa")
        );
        match config.fasta_path(&GenomeId::new("L2")) {
            Err(PipelineError::MissingInput { path }) => {
                assert_eq!(path, dir.path().join("L2.fasta"));
            }
            other => panic!("expected MissingInput, got {other:?}"),
        }

        let pair = PairId::new("H37Rv", "L1");
        assert_eq!(
            config.pair_path(&pair, "paf"),
            PathBuf::from("/out/H37Rv+L1.paf")
        );
        assert_eq!(config.summary_path(), PathBuf::from("/out/summary.tsv"));
        assert_eq!(config.mask_path(&GenomeId::new("L1")), dir.path().join("L1.bed"));
    }
}
