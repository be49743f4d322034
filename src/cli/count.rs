use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{open_output, OutputFormat};
use crate::core::counts::ScenarioCount;
use crate::core::types::PairId;
use crate::parsing::tsv::{parse_difference_file, write_scenario_counts};
use crate::pipeline::count::{count_by_pair, count_scenarios};
use crate::pipeline::require_file;
use crate::utils::validation::validate_genome_id;

#[derive(Args)]
pub struct CountArgs {
    /// Masked difference table
    #[arg(long, required = true)]
    pub input: PathBuf,

    /// Reference genome id; with --query-id, names the pair even when the
    /// table is empty
    #[arg(long, requires = "query_id")]
    pub reference_id: Option<String>,

    /// Query genome id
    #[arg(long, requires = "reference_id")]
    pub query_id: Option<String>,

    /// Scenario count output (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: CountArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    require_file(&args.input)?;
    let records = parse_difference_file(&args.input)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;

    if verbose {
        eprintln!("Input records: {}", records.len());
    }

    let counts = match (&args.reference_id, &args.query_id) {
        (Some(reference), Some(query)) => {
            validate_genome_id(reference)?;
            validate_genome_id(query)?;
            vec![count_scenarios(&PairId::new(reference, query), &records)?]
        }
        _ => {
            let counts = count_by_pair(&records)?;
            if counts.is_empty() {
                anyhow::bail!(
                    "{} has no records; pass --reference-id and --query-id to name the pair",
                    args.input.display()
                );
            }
            counts
        }
    };

    let mut out = open_output(args.output.as_deref())?;
    write_scenario_counts(&mut out, &counts)?;
    out.flush()?;

    if args.output.is_some() {
        match format {
            OutputFormat::Text => print_text_counts(&counts),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&counts)?),
            OutputFormat::Tsv => {}
        }
    }

    Ok(())
}

fn print_text_counts(counts: &[ScenarioCount]) {
    for count in counts {
        println!("{}  (total {})", count.pair, count.total());
        for (scenario, n) in &count.counts {
            println!("  {:<10} {n}", scenario.label());
        }
    }
}
