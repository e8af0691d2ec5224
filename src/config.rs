//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.weblogstats.toml` files.

use crate::cli::OutputFormat;
use crate::fetch::downloader::default_user_agent;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".weblogstats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds. Absent means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// User-Agent header sent with the request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

/// Report settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.weblogstats.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(timeout) = args.timeout {
            self.fetch.timeout_seconds = Some(timeout);
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.fetch.timeout_seconds.is_none());
        assert!(config.fetch.user_agent.starts_with("weblog-stats/"));
        assert_eq!(config.report.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[fetch]
timeout_seconds = 45
user_agent = "stats-bot/2.0"

[report]
format = "json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.fetch.timeout_seconds, Some(45));
        assert_eq!(config.fetch.user_agent, "stats-bot/2.0");
        assert_eq!(config.report.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str("[report]\nformat = \"text\"\n").unwrap();
        assert!(config.fetch.timeout_seconds.is_none());
        assert_eq!(config.fetch.user_agent, default_user_agent());
    }

    #[test]
    fn test_merge_with_args_prefers_explicit_flags() {
        let mut config: Config = toml::from_str("[fetch]\ntimeout_seconds = 10\n").unwrap();
        let args = Args::try_parse_from(["weblog-stats", "--url", "http://x", "--format", "json"])
            .unwrap();

        config.merge_with_args(&args);
        assert_eq!(config.fetch.timeout_seconds, Some(10));
        assert_eq!(config.report.format, OutputFormat::Json);

        let args = Args::try_parse_from(["weblog-stats", "--url", "http://x", "--timeout", "3"])
            .unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.fetch.timeout_seconds, Some(3));
        assert_eq!(config.report.format, OutputFormat::Json);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[fetch]\ntimeout_seconds = 7\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.fetch.timeout_seconds, Some(7));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[fetch\ntimeout_seconds = ").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[fetch]"));
        assert!(toml_str.contains("[report]"));
        assert!(toml_str.contains("format = \"text\""));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.report.format, OutputFormat::Text);
    }
}
