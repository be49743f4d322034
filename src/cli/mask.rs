use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::cli::{open_output, OutputFormat};
use crate::core::interval::IntervalSet;
use crate::parsing::bed::parse_bed_file;
use crate::parsing::tsv::{parse_difference_file, write_difference_table};
use crate::pipeline::mask::{apply_masks, MaskStats};
use crate::pipeline::require_file;

#[derive(Args)]
pub struct MaskArgs {
    /// Difference table produced by `transform`
    #[arg(long, required = true)]
    pub input: PathBuf,

    /// BED file of untrusted reference intervals
    #[arg(long = "ref")]
    pub reference: Option<PathBuf>,

    /// BED file of untrusted query intervals
    #[arg(long)]
    pub query: Option<PathBuf>,

    /// Masked difference table output (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: MaskArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    require_file(&args.input)?;
    let records = parse_difference_file(&args.input)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;

    let reference_mask = load_mask(args.reference.as_deref())?;
    let query_mask = load_mask(args.query.as_deref())?;

    if verbose {
        eprintln!("Input records: {}", records.len());
        eprintln!("Reference mask intervals: {}", reference_mask.source_count());
        eprintln!("Query mask intervals: {}", query_mask.source_count());
    }

    let outcome = apply_masks(&records, &reference_mask, &query_mask);

    let mut out = open_output(args.output.as_deref())?;
    write_difference_table(&mut out, &outcome.records)?;
    out.flush()?;

    if args.output.is_some() {
        match format {
            OutputFormat::Text => print_text_stats(&outcome.stats),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&outcome.stats)?);
            }
            OutputFormat::Tsv => {}
        }
    }

    Ok(())
}

fn load_mask(path: Option<&Path>) -> anyhow::Result<IntervalSet> {
    let Some(path) = path else {
        return Ok(IntervalSet::new());
    };
    require_file(path)?;
    let intervals =
        parse_bed_file(path).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(IntervalSet::from_intervals(&intervals))
}

fn print_text_stats(stats: &MaskStats) {
    println!("Masking Results");
    println!("{}", "=".repeat(40));
    println!("  Input records:        {}", stats.input);
    println!("  Removed (reference):  {}", stats.removed_by_reference);
    println!("  Removed (query):      {}", stats.removed_by_query);
    println!("  Retained:             {}", stats.retained());
}
