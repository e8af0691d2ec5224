//! Access-log download over HTTP.
//!
//! This module fetches the raw log text with reqwest. Anything other than
//! a `200 OK` response is reported as a [`FetchError`] instead of text.

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Reasons a log could not be downloaded.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with something other than 200.
    #[error("Failed to download the file from {url} (HTTP {status})")]
    Status { url: String, status: StatusCode },

    /// The request never produced a response (DNS, refused, timeout...).
    #[error("Failed to download the file from {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be read as text.
    #[error("Failed to read the response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// The URL the failed request was sent to, if one was sent.
    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Body { url, .. } => Some(url),
            FetchError::Client(_) => None,
        }
    }
}

/// Options for downloading a log.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Whole-request timeout (None waits until the transport gives up).
    pub timeout: Option<Duration>,
    /// User-Agent header sent with the request.
    pub user_agent: String,
    /// Whether to draw a spinner on stderr while downloading.
    pub show_progress: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: default_user_agent(),
            show_progress: true,
        }
    }
}

/// User-Agent sent when none is configured.
pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Downloads access logs.
pub struct Fetcher {
    http_client: reqwest::Client,
    options: FetchOptions,
}

impl Fetcher {
    /// Build a fetcher and its HTTP client.
    pub fn new(options: FetchOptions) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(options.user_agent.clone());

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        // Loopback test servers must not be routed through a proxy from the environment.
        #[cfg(test)]
        let builder = builder.no_proxy();

        let http_client = builder.build().map_err(FetchError::Client)?;

        Ok(Self {
            http_client,
            options,
        })
    }

    /// Download `url` and return its body as text.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        info!("Downloading log: {}", url);

        let spinner = self.start_spinner(url);
        let result = self.request(url).await;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        if let Ok(body) = &result {
            info!("Downloaded {} bytes from {}", body.len(), url);
        }

        result
    }

    async fn request(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }

    fn start_spinner(&self, url: &str) -> Option<ProgressBar> {
        if !self.options.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(format!("Downloading {}", url));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}
