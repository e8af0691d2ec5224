//! Access-log parsing and hit aggregation.
//!
//! Each line of the log is one comma-separated record. Rows are split
//! naively on `,`: quoted fields and escaped commas are not supported.

use crate::models::{Browser, LogRecord, Statistics, RECORD_FIELDS};
use chrono::{NaiveDate, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

// ====== REGEX PATTERNS ======

/// `MM/DD/YYYY HH:MM:SS`; every field but the year may drop its leading zero.
static ACCESS_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(1[0-2]|0[1-9]|[1-9])/(3[01]|[12][0-9]|0[1-9]|[1-9]| [1-9])/([0-9]{4})\s+(2[0-3]|[01][0-9]|[0-9]):([0-5][0-9]|[0-9]):([0-5][0-9]|[0-9])$",
    )
    .expect("access time pattern is valid")
});

static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|gif|png)$").expect("image pattern is valid"));

/// Browser signatures in priority order. Chrome must stay ahead of Safari.
static BROWSER_PATTERNS: Lazy<Vec<(Browser, Regex)>> = Lazy::new(|| {
    [
        (Browser::Firefox, r"Mozilla.*Firefox"),
        (Browser::Chrome, r"Mozilla.*Chrome"),
        (Browser::InternetExplorer, r"Mozilla.*MSIE"),
        (Browser::Safari, r"Mozilla.*Safari"),
    ]
    .into_iter()
    .map(|(browser, pattern)| (browser, Regex::new(pattern).expect("browser pattern is valid")))
    .collect()
});

/// Split a line into a record, or `None` if it has too few fields.
pub fn parse_record(line: &str) -> Option<LogRecord<'_>> {
    let mut fields = line.split(',');
    let record = LogRecord {
        path: fields.next()?,
        access_time: fields.next()?,
        user_agent: fields.next()?,
        status: fields.next()?,
        size: fields.next()?,
    };
    Some(record)
}

/// Whether the requested path ends in `.jpg`, `.gif` or `.png`.
pub fn is_image_request(path: &str) -> bool {
    IMAGE_RE.is_match(path)
}

/// First browser whose signature matches the user agent.
pub fn classify_browser(user_agent: &str) -> Option<Browser> {
    BROWSER_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(user_agent))
        .map(|(browser, _)| *browser)
}

/// Hour of day (0-23) of an access timestamp.
///
/// The date must exist on the calendar and the year must be 1 or later.
pub fn parse_hour(access_time: &str) -> Option<u32> {
    let caps = ACCESS_TIME_RE.captures(access_time)?;
    let field = |i: usize| caps[i].trim().parse::<u32>().ok();

    let year = i32::try_from(field(3)?).ok().filter(|y| *y >= 1)?;
    NaiveDate::from_ymd_opt(year, field(1)?, field(2)?)?;
    let time = NaiveTime::from_hms_opt(field(4)?, field(5)?, field(6)?)?;

    Some(time.hour())
}

/// Line terminators recognized between rows, `\r` on its own included.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Non-empty rows of the log text.
fn split_rows(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_line_break).filter(|row| !row.is_empty())
}

/// Aggregate statistics over the full text of an access log.
pub fn aggregate(text: &str) -> Statistics {
    let mut stats = Statistics::default();
    let mut lines = 0usize;
    let mut skipped = 0usize;

    for line in split_rows(text) {
        lines += 1;

        let Some(record) = parse_record(line) else {
            skipped += 1;
            continue;
        };

        stats.total_hits += 1;

        if is_image_request(record.path) {
            stats.image_hits += 1;
        }

        if let Some(browser) = classify_browser(record.user_agent) {
            stats.browser_counts.record(browser);
        }

        if let Some(hour) = parse_hour(record.access_time) {
            *stats.hour_counts.entry(hour).or_insert(0) += 1;
        }
    }

    debug!(
        "Aggregated {} lines: {} hits, {} rows with fewer than {} fields",
        lines, stats.total_hits, skipped, RECORD_FIELDS
    );

    stats
}
