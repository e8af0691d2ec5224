//! Analysis modules.
//!
//! Turns the raw text of an access log into hit statistics.

pub mod aggregator;

pub use aggregator::aggregate;
