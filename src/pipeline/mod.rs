//! The difference-extraction, masking and scenario-counting pipeline.
//!
//! Stages, in data-flow order:
//!
//! - [`transform`]: Walk PAF segments against both genomes and emit [`DifferenceRecord`]s
//! - [`mask`]: Drop records that fall in untrusted reference or query intervals
//! - [`count`]: Classify surviving records into scenarios and tally them per pair
//! - [`merge`]: Combine per-pair tallies into one comparative summary
//! - [`orchestrator`]: Run all of the above for every pair of a manifest
//!
//! Each stage is a plain function over in-memory values; file names and
//! directories only appear in [`config`] and [`orchestrator`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use varscen::core::interval::IntervalSet;
//! use varscen::parsing::{fasta::load_genome, paf::parse_paf_file};
//! use varscen::pipeline::{count, mask, transform};
//! use std::path::Path;
//!
//! let reference = load_genome(Path::new("H37Rv.fasta"), "H37Rv").unwrap();
//! let query = load_genome(Path::new("L1.fasta"), "L1").unwrap();
//! let segments = parse_paf_file(Path::new("H37Rv+L1.paf")).unwrap();
//!
//! let records = transform::extract_differences(
//!     &reference,
//!     &query,
//!     &segments,
//!     &transform::TransformOptions::default(),
//! )
//! .unwrap();
//! let masked = mask::apply_masks(&records, &IntervalSet::new(), &IntervalSet::new());
//! let counts = count::count_scenarios(&records[0].pair, &masked.records).unwrap();
//! println!("{:?}", counts.counts);
//! ```
//!
//! [`DifferenceRecord`]: crate::core::record::DifferenceRecord

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::PairId;
use crate::parsing::ParseError;

pub mod aligner;
pub mod config;
pub mod count;
pub mod mask;
pub mod merge;
pub mod orchestrator;
pub mod transform;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Missing input file: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Unclassifiable record: {0}")]
    Classification(String),

    #[error("Duplicate pair in merge input: {pair}")]
    DuplicatePair { pair: PairId },

    #[error("Aligner failed: {0}")]
    Aligner(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ParseError> for PipelineError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Io(io) => Self::Io(io),
            ParseError::InvalidFormat(msg) | ParseError::Noodles(msg) => Self::MalformedRecord(msg),
        }
    }
}

/// Fail with `MissingInput` unless `path` is an existing file
///
/// # Errors
///
/// Returns `PipelineError::MissingInput` naming the path.
pub fn require_file(path: &std::path::Path) -> Result<(), PipelineError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::MissingInput {
            path: path.to_path_buf(),
        })
    }
}
