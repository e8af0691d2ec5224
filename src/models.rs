//! Data models for access-log statistics.
//!
//! This module contains the record view produced by the parser and the
//! counters accumulated over a whole log.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Minimum number of comma-separated fields in a valid row.
pub const RECORD_FIELDS: usize = 5;

/// One row of the access log, borrowed from the downloaded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord<'a> {
    /// Requested path.
    pub path: &'a str,
    /// Access timestamp, expected as `MM/DD/YYYY HH:MM:SS`.
    pub access_time: &'a str,
    /// Raw user-agent string.
    pub user_agent: &'a str,
    /// HTTP status code (not interpreted).
    #[allow(dead_code)] // Present in every row, never counted
    pub status: &'a str,
    /// Response size in bytes (not interpreted).
    #[allow(dead_code)] // Present in every row, never counted
    pub size: &'a str,
}

/// Browser family detected from a user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Browser {
    Firefox,
    Chrome,
    InternetExplorer,
    Safari,
}

impl Browser {
    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Browser::Firefox => "Firefox",
            Browser::Chrome => "Chrome",
            Browser::InternetExplorer => "Internet Explorer",
            Browser::Safari => "Safari",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Browser {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Per-browser hit counter that remembers first-observation order.
///
/// The order matters for `most_popular`: on a tie, the browser seen first
/// in the log wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserCounts {
    entries: Vec<(Browser, u64)>,
}

impl BrowserCounts {
    /// Count one hit for `browser`.
    pub fn record(&mut self, browser: Browser) {
        match self.entries.iter_mut().find(|(b, _)| *b == browser) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((browser, 1)),
        }
    }

    /// Hits recorded for `browser` (0 if never seen).
    #[cfg(test)]
    pub fn get(&self, browser: Browser) -> u64 {
        self.entries
            .iter()
            .find(|(b, _)| *b == browser)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate in first-observation order.
    pub fn iter(&self) -> impl Iterator<Item = (Browser, u64)> + '_ {
        self.entries.iter().copied()
    }

    /// Browser with the most hits; ties go to the earliest observed.
    pub fn most_popular(&self) -> Option<(Browser, u64)> {
        let mut best: Option<(Browser, u64)> = None;
        for (browser, count) in self.iter() {
            match best {
                Some((_, top)) if count <= top => {}
                _ => best = Some((browser, count)),
            }
        }
        best
    }
}

impl Serialize for BrowserCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (browser, count) in &self.entries {
            map.serialize_entry(browser.label(), count)?;
        }
        map.end()
    }
}

/// Counters accumulated over one access log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Structurally valid rows.
    pub total_hits: u64,
    /// Rows whose path ends in an image extension.
    pub image_hits: u64,
    /// Rows credited to each detected browser.
    pub browser_counts: BrowserCounts,
    /// Rows per hour of day, for rows with a parseable timestamp.
    pub hour_counts: BTreeMap<u32, u64>,
}

impl Statistics {
    /// Percentage of hits that requested an image, or `None` with no hits.
    pub fn image_percentage(&self) -> Option<f64> {
        if self.total_hits == 0 {
            return None;
        }
        Some(self.image_hits as f64 / self.total_hits as f64 * 100.0)
    }

    pub fn most_popular_browser(&self) -> Option<(Browser, u64)> {
        self.browser_counts.most_popular()
    }

    /// Sum of all hour buckets.
    pub fn timed_hits(&self) -> u64 {
        self.hour_counts.values().sum()
    }
}
