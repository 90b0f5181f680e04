//! Locale-aware timestamp normalization.
//!
//! Exports written with a German UI carry month abbreviations such as
//! `16 Dez 2025, 15:06`. The first abbreviation found is swapped for its
//! English form, then a fixed list of shapes is tried. Naive timestamps are UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::DateParseError;

/// German (and English) three-letter months mapped to the English abbreviation.
const MONTH_ABBREVIATIONS: &[(&str, &str)] = &[
    ("jan", "Jan"),
    ("feb", "Feb"),
    ("mär", "Mar"),
    ("mrz", "Mar"),
    ("mar", "Mar"),
    ("apr", "Apr"),
    ("mai", "May"),
    ("jun", "Jun"),
    ("jul", "Jul"),
    ("aug", "Aug"),
    ("sep", "Sep"),
    ("okt", "Oct"),
    ("nov", "Nov"),
    ("dez", "Dec"),
];

static MONTH_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    let alternatives: Vec<&str> = MONTH_ABBREVIATIONS.iter().map(|(de, _)| *de).collect();
    Regex::new(&format!(r"(?i)\b({})", alternatives.join("|"))).ok()
});

const DATETIME_FORMATS: &[&str] = &[
    "%d %b %Y, %H:%M",
    "%d %b %Y, %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%b %d, %Y, %H:%M",
    "%b %d, %Y %H:%M",
    "%d %B %Y, %H:%M",
    "%d %B %Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y, %H:%M",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d %b %Y"];

/// Result of normalizing one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum DateOutcome {
    Parsed(DateTime<Utc>),
    /// The text matched no known shape. The caller decides what to substitute.
    Fallback(DateParseError),
}

impl DateOutcome {
    /// The parsed instant, or `now` when parsing failed.
    pub fn or_instant(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DateOutcome::Parsed(dt) => *dt,
            DateOutcome::Fallback(_) => now,
        }
    }

    pub fn into_result(self) -> Result<DateTime<Utc>, DateParseError> {
        match self {
            DateOutcome::Parsed(dt) => Ok(dt),
            DateOutcome::Fallback(err) => Err(err),
        }
    }
}

/// Replace the first German month abbreviation with its English equivalent.
pub fn translate_month(input: &str) -> String {
    let Some(pattern) = MONTH_PATTERN.as_ref() else {
        return input.to_string();
    };

    pattern
        .replace(input, |caps: &regex::Captures| {
            let found = caps[1].to_lowercase();
            MONTH_ABBREVIATIONS
                .iter()
                .find(|(de, _)| *de == found)
                .map(|(_, en)| en.to_string())
                .unwrap_or_else(|| caps[1].to_string())
        })
        .into_owned()
}

/// Normalize a free-text timestamp.
pub fn normalize_date(input: &str) -> DateOutcome {
    let raw = input.trim();
    if raw.is_empty() {
        return DateOutcome::Fallback(DateParseError::new(input, "empty timestamp"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return DateOutcome::Parsed(dt.with_timezone(&Utc));
    }

    let text = translate_month(raw);

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&text, fmt) {
            return DateOutcome::Parsed(naive.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&text, fmt) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return DateOutcome::Parsed(naive.and_utc());
            }
        }
    }

    DateOutcome::Fallback(DateParseError::new(input, "unrecognized timestamp format"))
}
