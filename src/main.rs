//! weblog-stats - access log summarizer
//!
//! A CLI tool that downloads a comma-separated web-server access log and
//! reports the share of image requests, the most popular browser and the
//! number of hits per hour of day.
//!
//! Exit codes:
//!   0 - Statistics printed
//!   1 - Download failed, or an argument/config error

mod analysis;
mod cli;
mod config;
mod fetch;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use fetch::{FetchError, FetchOptions, Fetcher};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("weblog-stats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .weblogstats.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr; stdout carries only the report.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Download, aggregate and report. Returns the process exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let url = args.log_url().to_string();
    info!("Running with URL = {}", url);

    // Step 1: Download the log
    let options = FetchOptions {
        timeout: config.fetch.timeout_seconds.map(Duration::from_secs),
        user_agent: config.fetch.user_agent.clone(),
        show_progress: !args.quiet,
    };
    let fetcher = Fetcher::new(options)?;

    let fetched = fetcher.fetch(&url).await;

    // Steps 2 and 3: Aggregate and report
    match build_report(fetched, config.report.format)? {
        Some(output) => {
            print!("{}", output);
            Ok(0)
        }
        None => Ok(1),
    }
}

/// Aggregate a downloaded log and render the report.
///
/// A failed download is reported on stderr and yields `None`; the log is
/// never aggregated in that case.
fn build_report(
    fetched: Result<String, FetchError>,
    format: OutputFormat,
) -> Result<Option<String>> {
    let contents = match fetched {
        Ok(contents) => contents,
        Err(e) => {
            error!(url = e.url().unwrap_or_default(), "Download failed");
            eprintln!("{}", e);
            return Ok(None);
        }
    };

    let stats = analysis::aggregate(&contents);
    info!(
        "Processed {} hits ({} with a valid timestamp)",
        stats.total_hits,
        stats.timed_hits()
    );

    let output = match format {
        OutputFormat::Text => report::generate_text_report(&stats),
        OutputFormat::Json => {
            let mut json = report::generate_json_report(&stats)?;
            json.push('\n');
            json
        }
    };

    Ok(Some(output))
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
