//! Parsers and writers for the files the pipeline reads and produces.
//!
//! This module provides:
//!
//! - **PAF alignments**: Segments with a base-level `cg:Z:` CIGAR
//! - **FASTA assemblies**: Whole genomes loaded into memory (plain or gzip)
//! - **BED masks**: Untrusted reference/query intervals
//! - **Manifests**: The list of (reference, query) pairs to process
//! - **TSV tables**: Difference tables, scenario counts and merged summaries
//!
//! ## Example
//!
//! ```rust,no_run
//! use varscen::parsing::paf::parse_paf_file;
//! use varscen::parsing::fasta::load_genome;
//! use std::path::Path;
//!
//! let segments = parse_paf_file(Path::new("H37Rv+L1.paf")).unwrap();
//! let reference = load_genome(Path::new("H37Rv.fasta"), "H37Rv").unwrap();
//! ```

use thiserror::Error;

pub mod bed;
pub mod fasta;
pub mod manifest;
pub mod paf;
pub mod tsv;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),
}
