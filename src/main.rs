//! Blockchain node data API conformance checker (`check-spec`)
//!
//! Runs a fixed sequence of checks against a node's online and offline
//! endpoints and reports every requirement as success or failure.
//!
//! # Architecture Overview
//!
//! ```text
//!   check-spec.toml
//!        │
//!        ▼
//!   ┌─────────┐    ┌──────────────────────────────────────────────┐
//!   │ config  │───▶│                 SpecChecker                  │
//!   └─────────┘    │                                              │
//!                  │  ┌──────────┐   preflight   ┌─────────────┐  │      online
//!                  │  │ fetcher  │──────────────▶│  run_checks │  │◀──── node
//!                  │  │ online + │◀──────────────│ status/list │  │      offline
//!                  │  │ offline  │   requests    │ options/... │  │◀──── node
//!                  │  └──────────┘               └──────┬──────┘  │
//!                  └────────────────────────────────────┼─────────┘
//!                                                       ▼
//!                                               ┌──────────────┐
//!                                               │  RunReport   │──▶ table / JSON
//!                                               └──────────────┘
//!
//!   Cross-cutting: observability (logs, metrics), resilience (retry),
//!                  lifecycle (Ctrl-C cancels account discovery)
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use api_spec_check::checks::SpecChecker;
use api_spec_check::config::loader::load_config;
use api_spec_check::lifecycle::{signals, Shutdown};
use api_spec_check::observability::{logging, metrics};
use api_spec_check::report;

#[derive(Parser)]
#[command(name = "check-spec")]
#[command(version, about = "Check a blockchain node's data API for conformance", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write a Prometheus text snapshot of the run's metrics to this path
    #[arg(long)]
    metrics_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability)?;

    tracing::info!(
        config = %cli.config.display(),
        blockchain = %config.network.blockchain,
        network = %config.network.network,
        online_url = %config.online_url,
        "check-spec v0.1.0 starting"
    );

    let metrics_handle = match &cli.metrics_out {
        Some(_) => Some(metrics::init_metrics()?),
        None => None,
    };

    let shutdown = Arc::new(Shutdown::new());
    signals::cancel_on_ctrl_c(shutdown.clone());

    let checker = SpecChecker::connect(config).await?;
    let report = checker.run(shutdown.subscribe()).await;

    if cli.json {
        println!("{}", report::render_json(&report)?);
    } else {
        print!("{}", report::render_table(&report));
    }

    if let (Some(path), Some(handle)) = (&cli.metrics_out, &metrics_handle) {
        std::fs::write(path, handle.render())?;
        tracing::info!(path = %path.display(), "Metrics snapshot written");
    }

    if report.passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!(failures = report.failure_count(), "Node does not conform");
        Ok(ExitCode::FAILURE)
    }
}
