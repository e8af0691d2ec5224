//! Statistics report generation.
//!
//! This module renders aggregated access-log statistics as plain text
//! (the default) or JSON.

use crate::models::{Browser, Statistics};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Generate the plain-text report.
pub fn generate_text_report(stats: &Statistics) -> String {
    let mut output = String::new();

    output.push_str(&generate_image_section(stats));
    output.push_str(&generate_browser_section(stats));
    output.push_str(&generate_hourly_section(&stats.hour_counts));

    output
}

/// Image share line, empty when there were no hits.
fn generate_image_section(stats: &Statistics) -> String {
    match stats.image_percentage() {
        Some(percentage) => format!(
            "Image requests account for {:.1}% of all requests\n",
            percentage
        ),
        None => String::new(),
    }
}

/// Most popular browser line, empty when no browser was recognized.
fn generate_browser_section(stats: &Statistics) -> String {
    if stats.browser_counts.is_empty() {
        return String::new();
    }

    match stats.most_popular_browser() {
        Some((browser, hits)) => format!("Most popular browser: {} with {} hits\n", browser, hits),
        None => String::new(),
    }
}

/// Hourly breakdown, one line per hour that saw traffic.
fn generate_hourly_section(hour_counts: &BTreeMap<u32, u64>) -> String {
    let mut section = String::new();

    section.push_str("\nHourly Hit Counts:\n");
    for (hour, hits) in hour_counts {
        section.push_str(&format!("Hour {:02} has {} hits\n", hour, hits));
    }

    section
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    stats: &'a Statistics,
    image_percentage: Option<f64>,
    most_popular_browser: Option<Browser>,
}

/// Generate a JSON report.
pub fn generate_json_report(stats: &Statistics) -> Result<String> {
    let report = JsonReport {
        stats,
        image_percentage: stats.image_percentage(),
        most_popular_browser: stats.most_popular_browser().map(|(browser, _)| browser),
    };

    serde_json::to_string_pretty(&report).map_err(Into::into)
}
