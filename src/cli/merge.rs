use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crate::cli::{open_output, OutputFormat};
use crate::core::counts::MergedSummary;
use crate::parsing::tsv::write_merged_summary;
use crate::pipeline::merge::{discover_count_files, merge_count_files};

#[derive(Args)]
pub struct MergeArgs {
    /// Scenario count files, merged in the order given
    #[arg(conflicts_with = "dir", required_unless_present = "dir")]
    pub files: Vec<PathBuf>,

    /// Merge every `*.counts.tsv` in this directory, in file name order
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Summary output (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: MergeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let files = match &args.dir {
        Some(dir) => discover_count_files(dir)?,
        None => args.files.clone(),
    };

    if verbose {
        eprintln!("Merging {} count files", files.len());
        for file in &files {
            eprintln!("  {}", file.display());
        }
    }

    let summary = merge_count_files(&files)?;

    let mut out = open_output(args.output.as_deref())?;
    write_merged_summary(&mut out, &summary)?;
    out.flush()?;

    if args.output.is_some() {
        match format {
            OutputFormat::Text => print_text_summary(&summary),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            OutputFormat::Tsv => {}
        }
    }

    Ok(())
}

fn print_text_summary(summary: &MergedSummary) {
    let labels: Vec<&str> = summary.columns.iter().map(|s| s.label()).collect();
    println!(
        "Merged {} pairs, columns: {}",
        summary.rows.len(),
        labels.join(", ")
    );
}
