//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// weblog-stats - summarize a web-server access log
///
/// Downloads a comma-separated access log and reports the share of image
/// requests, the most popular browser and hits per hour of day.
///
/// Examples:
///   weblog-stats --url http://example.com/weblog.csv
///   weblog-stats --url http://example.com/weblog.csv --format json
///   weblog-stats --url http://example.com/weblog.csv --timeout 30 --quiet
///   weblog-stats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// URL of the access log to download
    #[arg(
        short,
        long,
        value_name = "URL",
        env = "WEBLOG_STATS_URL",
        required_unless_present = "init_config"
    )]
    pub url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .weblogstats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    ///
    /// By default the download waits as long as the connection stays open.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format (text, json)
    ///
    /// Defaults to the config file setting, or text.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress spinner)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .weblogstats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the log URL (empty if not set; validate first).
    pub fn log_url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // The URL shape is left to the HTTP client; only reject a blank one.
        if self.log_url().trim().is_empty() {
            return Err("A log URL is required (--url)".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
