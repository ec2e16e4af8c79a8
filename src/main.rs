use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use covconvert::convert::convert;
use covconvert::detect::{detect_format, Format};
use covconvert::provider::covdata::CovdataProvider;

/// covconvert — merge block-coverage artifacts and export them as LCOV or XML.
#[derive(Parser)]
#[command(name = "covconvert", version, about)]
struct Cli {
    /// Report to write. A `.xml` extension selects the XML dump, anything
    /// else is written as LCOV.
    destination: PathBuf,

    /// Coverage artifacts to merge, in order.
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    /// Override format detection.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Log merge and aggregation progress to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are reported through the same path.
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<String> {
    let format = cli
        .format
        .unwrap_or_else(|| detect_format(&cli.destination));
    tracing::debug!(%format, sources = cli.sources.len(), "starting conversion");

    convert(&CovdataProvider, &cli.destination, &cli.sources, format)
        .with_context(|| format!("Failed to convert coverage into {}", cli.destination.display()))
}
