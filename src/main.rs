//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the Catalog-Harvest content flattener.

use catalog_harvest::config::{
    load_config_with_hash, parse_start_date, require_api_key, resolve_api_key_from_env, validate,
    Config, HarvestStrategy,
};
use catalog_harvest::harvest::{print_summary, run_harvest};
use catalog_harvest::sink::clear_output;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: a paginated content catalog flattener
///
/// Catalog-Harvest lists every tag under a section, pages through the
/// content of each tag from a start date onward, and writes one row per
/// article to a CSV or SQLite file.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A paginated content catalog flattener", long_about = None)]
struct Cli {
    /// Section (category) to harvest
    #[arg(short, long, default_value = "business")]
    section: String,

    /// Earliest publication date (YYYY-MM-DD)
    #[arg(short, long, default_value = "2021-01-01")]
    time: String,

    /// Output file; `.db`/`.sqlite` selects SQLite, anything else CSV
    #[arg(short, long, value_name = "PATH")]
    path: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Pagination strategy (throttled or eager)
    #[arg(long)]
    strategy: Option<HarvestStrategy>,

    /// Pause between page fetches under the throttled strategy (milliseconds)
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // A missing .env is not an error
    dotenvy::dotenv().ok();

    let (mut config, config_hash) = load_configuration(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    validate(&config)?;
    resolve_api_key_from_env(&mut config);

    // Fail before the previous output is removed
    if let Err(e) = require_api_key(&config) {
        tracing::error!("{}", e);
        return Err(e.into());
    }

    let start_date = match parse_start_date(&cli.time) {
        Ok(date) => date,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    if clear_output(Path::new(&config.output.path))? {
        tracing::info!("Removed previous output at {}", config.output.path);
    }

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    match run_harvest(&config, &cli.section, start_date, config_hash, cancel).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if one was given, otherwise the built-in defaults
fn load_configuration(
    path: Option<&Path>,
) -> Result<(Config, Option<String>), Box<dyn std::error::Error>> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok((Config::default(), None));
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, Some(hash)))
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Command-line flags take precedence over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(path) = &cli.path {
        config.output.path = path.display().to_string();
        // Re-infer the format from the new extension
        config.output.format = None;
    }
    if let Some(strategy) = cli.strategy {
        config.harvest.strategy = strategy;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.harvest.tick_interval_ms = tick_ms;
    }
}

/// Cancels the run on Ctrl-C; collectors drop their partial buffers
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling harvest");
            cancel.cancel();
        }
    });
}
