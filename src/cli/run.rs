use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::counts::MergedSummary;
use crate::parsing::tsv::write_merged_summary;
use crate::pipeline::aligner::Minimap2Aligner;
use crate::pipeline::config::{OverlapPolicy, PipelineConfig};
use crate::pipeline::orchestrator::{Pipeline, RunReport};

#[derive(Args)]
pub struct RunArgs {
    /// Manifest of pairs: a header line, then `<reference_id> <query_id>` per line
    #[arg(required = true)]
    pub manifest: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding `<id>.fasta` files
    #[arg(long)]
    pub genome_dir: Option<PathBuf>,

    /// Directory holding `<id>.bed` mask files (default: genome directory)
    #[arg(long)]
    pub mask_dir: Option<PathBuf>,

    /// Directory for intermediates and `summary.tsv`
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// How to treat records from overlapping alignment segments
    #[arg(long)]
    pub overlap_policy: Option<OverlapPolicy>,

    /// Do not emit Gap records for unaligned regions
    #[arg(long)]
    pub no_gaps: bool,

    /// Treat a missing BED file as an empty mask instead of failing the pair
    #[arg(long)]
    pub allow_missing_masks: bool,

    /// Reuse existing PAF files in the output directory
    #[arg(long)]
    pub reuse_alignments: bool,

    /// Aligner executable
    #[arg(long)]
    pub aligner: Option<PathBuf>,

    /// minimap2 preset (asm5, asm10, asm20)
    #[arg(long)]
    pub preset: Option<String>,
}

impl RunArgs {
    fn resolve_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load_from_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(dir) = &self.genome_dir {
            config.genome_dir.clone_from(dir);
        }
        if let Some(dir) = &self.mask_dir {
            config.mask_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(policy) = self.overlap_policy {
            config.overlap_policy = policy;
        }
        if self.no_gaps {
            config.emit_gaps = false;
        }
        if self.allow_missing_masks {
            config.require_masks = false;
        }
        if self.reuse_alignments {
            config.reuse_alignments = true;
        }
        if let Some(program) = &self.aligner {
            config.aligner.program.clone_from(program);
        }
        if let Some(preset) = &self.preset {
            config.aligner.preset.clone_from(preset);
        }

        Ok(config)
    }
}

pub fn run(args: RunArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.resolve_config()?;

    if verbose {
        eprintln!("Genomes: {}", config.genome_dir.display());
        eprintln!("Masks: {}", config.mask_dir().display());
        eprintln!("Output: {}", config.output_dir.display());
    }

    let aligner = Minimap2Aligner::new(config.aligner.clone());
    let report = Pipeline::new(&config, &aligner).run_manifest(&args.manifest)?;

    match format {
        OutputFormat::Text => print_text_report(&report),
        OutputFormat::Json => print_json_report(&report)?,
        OutputFormat::Tsv => write_merged_summary(&mut std::io::stdout().lock(), &report.summary)?,
    }

    Ok(())
}

fn print_text_report(report: &RunReport) {
    let summary: &MergedSummary = &report.summary;

    println!("Pipeline Results");
    println!("{}", "=".repeat(60));
    println!(
        "\nPairs: {} completed, {} failed",
        summary.complete_rows(),
        report.failures.len()
    );

    for row in &summary.rows {
        match (&row.counts, row.total()) {
            (Some(values), Some(total)) => {
                println!("\n{}  (total {total})", row.pair);
                for (scenario, value) in summary.columns.iter().zip(values) {
                    println!("  {:<10} {value}", scenario.label());
                }
            }
            _ => println!("\n{}  (incomplete)", row.pair),
        }
    }

    if !report.failures.is_empty() {
        println!("\nFailures:");
        for failure in &report.failures {
            println!("  {}: {}", failure.pair, failure.reason);
        }
    }

    println!("\nSummary written to {}", report.summary_path.display());
}

fn print_json_report(report: &RunReport) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "summary_path": report.summary_path.display().to_string(),
        "summary": report.summary,
        "failures": report.failures,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: RunArgs,
    }

    #[test]
    fn test_flags_override_defaults() {
        let wrapper = Wrapper::parse_from([
            "varscen",
            "pairs.tsv",
            "--genome-dir",
            "/data/genomes",
            "--overlap-policy",
            "keep-all",
            "--no-gaps",
            "--allow-missing-masks",
            "--preset",
            "asm20",
        ]);
        let config = wrapper.args.resolve_config().unwrap();

        assert_eq!(config.genome_dir, PathBuf::from("/data/genomes"));
        assert_eq!(config.mask_dir(), std::path::Path::new("/data/genomes"));
        assert_eq!(config.overlap_policy, OverlapPolicy::KeepAll);
        assert!(!config.emit_gaps);
        assert!(!config.require_masks);
        assert!(!config.reuse_alignments);
        assert_eq!(config.aligner.preset, "asm20");
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"output_dir": "/from/file", "emit_gaps": false}"#).unwrap();

        let wrapper = Wrapper::parse_from([
            "varscen",
            "pairs.tsv",
            "--config",
            path.to_str().unwrap(),
            "--output-dir",
            "/from/flag",
        ]);
        let config = wrapper.args.resolve_config().unwrap();

        assert_eq!(config.output_dir, PathBuf::from("/from/flag"));
        assert!(!config.emit_gaps);
    }
}
