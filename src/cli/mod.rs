//! Command-line interface for varscen.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **run**: Run the whole pipeline for every pair of a manifest
//! - **transform**: Extract differences from one PAF alignment
//! - **mask**: Remove differences inside reference or query mask intervals
//! - **count**: Classify differences and count scenarios per pair
//! - **merge**: Merge per-pair scenario counts into one summary table
//!
//! ## Usage
//!
//! ```text
//! # Full pipeline, FASTA and BED files named after genome ids
//! varscen run pairs.tsv --genome-dir genomes/ --output-dir out/
//!
//! # Standalone stages
//! varscen transform --paf H37Rv+L1.paf --ref H37Rv.fasta --query L1.fasta -o diff.tsv
//! varscen mask --input diff.tsv --ref H37Rv.bed --query L1.bed -o masked.tsv
//! varscen count --input masked.tsv -o counts.tsv
//! varscen merge --dir out/ -o summary.tsv
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::{Parser, Subcommand};

pub mod count;
pub mod mask;
pub mod merge;
pub mod run;
pub mod transform;

#[derive(Parser)]
#[command(name = "varscen")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Count variation scenarios between pairs of genome assemblies")]
#[command(
    long_about = "varscen compares pairs of genome assemblies and counts SNPs, insertions, deletions, gaps and N-regions between them.\n\nFor each reference/query pair it:\n- Aligns the two assemblies with minimap2\n- Extracts per-position differences from the alignment\n- Removes differences inside untrusted (masked) regions\n- Classifies and counts what remains\n\nPer-pair counts are merged into one summary table, one row per pair."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for reports (tables written with --output are always TSV)
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline over a manifest of genome pairs
    Run(run::RunArgs),

    /// Extract differences from a PAF alignment
    Transform(transform::TransformArgs),

    /// Remove differences falling in masked intervals
    Mask(mask::MaskArgs),

    /// Count scenarios in a difference table
    Count(count::CountArgs),

    /// Merge per-pair scenario counts
    Merge(merge::MergeArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Open `path` for writing, or stdout when no path is given
pub(crate) fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    })
}
