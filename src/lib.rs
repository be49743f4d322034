//! # varscen
//!
//! A library for counting variation scenarios between pairs of genome assemblies.
//!
//! Given a reference strain and one or more query strains, `varscen` turns a
//! pairwise whole-genome alignment into a table of per-position differences,
//! removes the ones that fall in untrusted regions, and classifies the rest into
//! a fixed set of scenarios. Counts from many pairs are merged into a single
//! comparative table.
//!
//! ## Features
//!
//! - **Strand-agnostic extraction**: Reverse-strand alignments are reported in
//!   forward reference orientation
//! - **Interval masking**: Reference- and query-side BED masks with O(log n) lookups
//! - **Fixed taxonomy**: `SNP`, `Insertion`, `Deletion`, `N_region`, `Gap`, with
//!   documented precedence
//! - **Reproducible merges**: Deterministic row and column order, duplicate pairs rejected
//! - **Partial-failure tolerance**: A failing pair is reported, never counted as zero
//!
//! ## Example
//!
//! ```rust,no_run
//! use varscen::{Pipeline, PipelineConfig};
//! use varscen::pipeline::aligner::Minimap2Aligner;
//! use std::path::Path;
//!
//! let config = PipelineConfig {
//!     genome_dir: "genomes".into(),
//!     output_dir: "out".into(),
//!     ..PipelineConfig::default()
//! };
//! let aligner = Minimap2Aligner::new(config.aligner.clone());
//!
//! let report = Pipeline::new(&config, &aligner)
//!     .run_manifest(Path::new("pairs.tsv"))
//!     .unwrap();
//!
//! for failure in &report.failures {
//!     eprintln!("{}: {}", failure.pair, failure.reason);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Genomes, alignment segments, difference records and counts
//! - [`parsing`]: Readers and writers for FASTA, PAF, BED, manifests and TSV tables
//! - [`pipeline`]: Extraction, masking, counting, merging and orchestration
//! - [`cli`]: Command-line interface implementation
//! - [`utils`]: Input validation helpers

pub mod cli;
pub mod core;
pub mod parsing;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::counts::{MergedSummary, ScenarioCount};
pub use crate::core::record::DifferenceRecord;
pub use crate::core::types::*;
pub use crate::pipeline::config::PipelineConfig;
pub use crate::pipeline::orchestrator::Pipeline;
pub use crate::pipeline::PipelineError;
