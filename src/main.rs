use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use lotto_history_lib::{Config, Harvester, LottoClient, RunOutcome, Sleep, config, export_rows};

/// Download the Lotto draw history into a CSV file, one day per request.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// First date to fetch (YYYY-MM-DD), overrides LOTTO_START_DATE
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Last date to fetch (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// CSV destination, overrides LOTTO_OUTPUT_FILE
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pause between requests in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Read environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Exit with status 2 when the run stopped before the end date
    #[arg(long)]
    strict: bool,
}

/// Flags given on the command line win over values loaded from the environment.
fn apply_overrides(args: &Args, config: &mut Config) {
    if let Some(start_date) = args.start_date {
        config.start_date = start_date;
    }
    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if let Some(delay_ms) = args.delay_ms {
        config.request_delay = Duration::from_millis(delay_ms);
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.request_timeout = Duration::from_secs(timeout_secs);
    }
}

/// `RUST_LOG` replaces the default `info` level entirely when set.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}

fn exit_status(outcome: &RunOutcome, strict: bool) -> u8 {
    match outcome {
        RunOutcome::Aborted { .. } if strict => 2,
        _ => 0,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    match &args.env_file {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None => {
            dotenv::dotenv().ok();
        }
    }

    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();

    let mut config = config::load()?;
    apply_overrides(&args, &mut config);
    if config.api_key.is_empty() {
        warn!("LOTTO_API_KEY is not set, requests will be rejected by the API");
    }

    let end_date = args.end_date.unwrap_or_else(|| Local::now().date_naive());
    let client = LottoClient::new(&config)?;
    let harvester = Harvester::new(
        client,
        Sleep(config.request_delay),
        config.start_date,
        end_date,
    );

    let report = harvester.run().await;

    export_rows(&report.rows, &config.output_path)?;

    match &report.outcome {
        RunOutcome::Completed => info!(
            "Completed: {} draws recorded, {} days without a draw",
            report.rows.len(),
            report.skipped
        ),
        RunOutcome::Aborted { date, error } => warn!(
            "Stopped early at {} ({}): {} draws recorded before the failure",
            date,
            error,
            report.rows.len()
        ),
    }

    Ok(ExitCode::from(exit_status(&report.outcome, args.strict)))
}
