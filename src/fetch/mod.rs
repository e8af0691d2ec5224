//! Log retrieval.
//!
//! This module downloads the access log that the rest of the pipeline
//! aggregates.

pub mod downloader;

pub use downloader::{FetchError, FetchOptions, Fetcher};
