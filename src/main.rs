use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod parsing;
mod pipeline;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("varscen=debug,info")
    } else {
        EnvFilter::new("varscen=warn")
    };

    // Tables may be streamed to stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Run(args) => {
            cli::run::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Transform(args) => {
            cli::transform::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Mask(args) => {
            cli::mask::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Count(args) => {
            cli::count::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Merge(args) => {
            cli::merge::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
