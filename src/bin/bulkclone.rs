//! CLI for cloning every repository of a GitHub organization.

use anyhow::{Context, Result};
use bulkclone::config::DEFAULT_API_URL;
use bulkclone::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bulkclone")]
#[command(author, version, about = "Shallow-clone every repository of a GitHub organization", long_about = None)]
struct Cli {
    /// How many git repos should be pulled in parallel (max is 10)
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// GitHub API endpoint, for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Clone over SSH or HTTPS
    #[arg(long, value_enum, default_value_t = Protocol::Ssh)]
    protocol: Protocol,

    /// Fetch the whole repository list before cloning, one repository at a time
    #[arg(long)]
    sequential: bool,

    /// GitHub organization
    organization: String,

    /// Path to clone repos to
    destination: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(report) => {
            println!("Done: {}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let error = e.downcast_ref::<BulkCloneError>();
            eprintln!("Error: {:#}", e);
            ExitCode::from(error.map_or(2, BulkCloneError::exit_code))
        }
    }
}

fn run() -> Result<RunReport> {
    // The token is required before anything else is looked at.
    let token = Config::token_from_env()?;
    let cli = Cli::parse();

    let config = Config::new(cli.organization, cli.destination, token)
        .workers(cli.workers)
        .api_url(cli.api_url)
        .protocol(cli.protocol)
        .sequential(cli.sequential);
    config.validate()?;

    bulkclone::pipeline::run(&config)
        .with_context(|| format!("Bulk clone of {} failed", config.organization))
}
