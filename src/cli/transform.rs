use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::cli::{open_output, OutputFormat};
use crate::core::record::DifferenceRecord;
use crate::core::types::Operation;
use crate::parsing::fasta::{genome_id_from_path, load_genome};
use crate::parsing::paf::parse_paf_file;
use crate::parsing::tsv::write_difference_table;
use crate::pipeline::config::OverlapPolicy;
use crate::pipeline::transform::{extract_differences, TransformOptions};
use crate::utils::validation::validate_genome_id;

#[derive(Args)]
pub struct TransformArgs {
    /// PAF alignment with base-level CIGAR (`minimap2 -c`)
    #[arg(long, required = true)]
    pub paf: PathBuf,

    /// Reference FASTA (the PAF target)
    #[arg(long = "ref", required = true)]
    pub reference: PathBuf,

    /// Query FASTA
    #[arg(long, required = true)]
    pub query: PathBuf,

    /// Reference genome id (default: FASTA file name without extension)
    #[arg(long)]
    pub reference_id: Option<String>,

    /// Query genome id (default: FASTA file name without extension)
    #[arg(long)]
    pub query_id: Option<String>,

    /// How to treat records from overlapping alignment segments
    #[arg(long, default_value = "first-seen")]
    pub overlap_policy: OverlapPolicy,

    /// Do not emit Gap records for unaligned regions
    #[arg(long)]
    pub no_gaps: bool,

    /// Difference table output (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: TransformArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let reference_id = resolve_id(args.reference_id.as_deref(), &args.reference)?;
    let query_id = resolve_id(args.query_id.as_deref(), &args.query)?;

    let reference = load_genome(&args.reference, &reference_id)
        .with_context(|| format!("Failed to load {}", args.reference.display()))?;
    let query = load_genome(&args.query, &query_id)
        .with_context(|| format!("Failed to load {}", args.query.display()))?;
    let segments = parse_paf_file(&args.paf)
        .with_context(|| format!("Failed to parse {}", args.paf.display()))?;

    if verbose {
        eprintln!(
            "{reference_id}: {} contigs, {} bp",
            reference.contig_names.len(),
            reference.total_length()
        );
        eprintln!(
            "{query_id}: {} contigs, {} bp",
            query.contig_names.len(),
            query.total_length()
        );
        eprintln!("Alignment segments: {}", segments.len());
    }

    let options = TransformOptions {
        overlap_policy: args.overlap_policy,
        emit_gaps: !args.no_gaps,
    };
    let records = extract_differences(&reference, &query, &segments, &options)?;

    let mut out = open_output(args.output.as_deref())?;
    write_difference_table(&mut out, &records)?;
    out.flush()?;

    // With the table on stdout there is no room for a report
    if args.output.is_some() {
        match format {
            OutputFormat::Text => print_text_summary(&records),
            OutputFormat::Json => print_json_summary(&records)?,
            OutputFormat::Tsv => {}
        }
    }

    Ok(())
}

/// Explicit id, or the id implied by the FASTA file name
fn resolve_id(explicit: Option<&str>, fasta: &Path) -> anyhow::Result<String> {
    let id = match explicit {
        Some(id) => id.to_string(),
        None => genome_id_from_path(fasta).ok_or_else(|| {
            anyhow::anyhow!(
                "Cannot derive a genome id from '{}'; pass it explicitly",
                fasta.display()
            )
        })?,
    };
    validate_genome_id(&id)?;
    Ok(id)
}

fn operation_counts(records: &[DifferenceRecord]) -> Vec<(Operation, usize)> {
    [
        Operation::Snp,
        Operation::Insertion,
        Operation::Deletion,
        Operation::NRun,
        Operation::Gap,
    ]
    .into_iter()
    .map(|op| (op, records.iter().filter(|r| r.operation == op).count()))
    .collect()
}

fn print_text_summary(records: &[DifferenceRecord]) {
    println!("Extracted {} difference records", records.len());
    for (op, n) in operation_counts(records) {
        println!("  {:<5} {n}", op.label());
    }
}

fn print_json_summary(records: &[DifferenceRecord]) -> anyhow::Result<()> {
    let by_operation: serde_json::Map<String, serde_json::Value> = operation_counts(records)
        .into_iter()
        .map(|(op, n)| (op.label().to_string(), n.into()))
        .collect();
    let output = serde_json::json!({
        "records": records.len(),
        "by_operation": by_operation,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
