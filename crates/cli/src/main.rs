//! Runs every catchment in a Stormline project file and prints the results
//! as JSON on stdout.
//!
//! Logs go to stderr and are filtered with `RUST_LOG`, for example
//! `RUST_LOG=stormline=debug stormline project.toml`.

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use stormline_design::{Project, ProjectReport};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stormline", version, about = "Size stormwater drainage channels")]
struct Args {
    /// Project file with catchments, channels, and optional config and
    /// reference tables.
    project: PathBuf,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Process catchments one at a time.
    #[arg(long)]
    sequential: bool,

    /// Print only the batch summary.
    #[arg(long)]
    summary_only: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let report = run(&args)?;

    let stdout = io::stdout().lock();
    match (args.summary_only, args.pretty) {
        (true, true) => serde_json::to_writer_pretty(stdout, &report.summary)?,
        (true, false) => serde_json::to_writer(stdout, &report.summary)?,
        (false, true) => serde_json::to_writer_pretty(stdout, &report)?,
        (false, false) => serde_json::to_writer(stdout, &report)?,
    }
    println!();
    Ok(())
}

fn run(args: &Args) -> Result<ProjectReport> {
    let source = fs::read_to_string(&args.project)
        .with_context(|| format!("failed to read {}", args.project.display()))?;
    let mut project = Project::from_toml_str(&source)
        .with_context(|| format!("invalid project file {}", args.project.display()))?;
    if args.sequential {
        project.config.parallel = false;
    }

    info!(
        project = %args.project.display(),
        catchments = project.catchments.len(),
        channels = project.channels.len(),
        "loaded project"
    );
    let report = project.run();
    if report.summary.failed > 0 {
        warn!(
            failed = report.summary.failed,
            "some catchments could not be processed"
        );
    }
    Ok(report)
}
