//! Normalization of the heterogeneous date strings found in progress records.
//!
//! Completion dates arrive in several encodings depending on which backend
//! wrote them: ISO-8601 timestamps, `DD/MM/YYYY`, `YYYY-MM-DD`, `DD-MM-YYYY`,
//! and occasionally free-form text. Normalization never fails: unparseable
//! input degrades to a sentinel so rendering is never blocked.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;

/// Outcome of normalizing a raw date string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedDate {
    /// A valid calendar date.
    Date(NaiveDate),
    /// The record carried no date at all.
    NoDate,
    /// The record carried a date that could not be parsed.
    Invalid,
}

impl NormalizedDate {
    #[must_use]
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            NormalizedDate::Date(date) => Some(date),
            NormalizedDate::NoDate | NormalizedDate::Invalid => None,
        }
    }

    #[must_use]
    pub fn is_date(self) -> bool {
        matches!(self, NormalizedDate::Date(_))
    }
}

impl fmt::Display for NormalizedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedDate::Date(date) => write!(f, "{}", date.format("%b %-d, %Y")),
            NormalizedDate::NoDate => write!(f, "No Date"),
            NormalizedDate::Invalid => write!(f, "Invalid Date"),
        }
    }
}

/// Parse a raw date string into a canonical calendar date or a sentinel.
///
/// Encodings are tried in priority order:
/// 1. strings containing `T` or `Z` are treated as ISO-8601 timestamps;
/// 2. slash-delimited three-part strings as `DD/MM/YYYY`;
/// 3. hyphen-delimited three-part strings as `YYYY-MM-DD` when the first
///    segment has four digits, `DD-MM-YYYY` otherwise;
/// 4. anything else non-empty gets a generic parse attempt.
///
/// Missing or empty input yields [`NormalizedDate::NoDate`]; input that looks
/// like a date but does not name a real one yields [`NormalizedDate::Invalid`].
#[must_use]
pub fn normalize(raw: Option<&str>) -> NormalizedDate {
    let Some(raw) = raw else {
        return NormalizedDate::NoDate;
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return NormalizedDate::NoDate;
    }

    if raw.contains('T') || raw.contains('Z') {
        return parse_iso(raw);
    }

    let slash_parts: Vec<&str> = raw.split('/').collect();
    if slash_parts.len() == 3 {
        return date_from_parts(slash_parts[2], slash_parts[1], slash_parts[0]);
    }

    let hyphen_parts: Vec<&str> = raw.split('-').collect();
    if hyphen_parts.len() == 3 {
        let year_first =
            hyphen_parts[0].len() == 4 && hyphen_parts[0].bytes().all(|b| b.is_ascii_digit());
        return if year_first {
            date_from_parts(hyphen_parts[0], hyphen_parts[1], hyphen_parts[2])
        } else {
            date_from_parts(hyphen_parts[2], hyphen_parts[1], hyphen_parts[0])
        };
    }

    parse_generic(raw)
}

fn parse_iso(raw: &str) -> NormalizedDate {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return NormalizedDate::Date(parsed.date_naive());
    }
    // Timestamps without an offset, e.g. "2024-01-15T10:30:00".
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return NormalizedDate::Date(parsed.date());
        }
    }
    NormalizedDate::Invalid
}

fn date_from_parts(year: &str, month: &str, day: &str) -> NormalizedDate {
    match (
        year.trim().parse::<i32>(),
        month.trim().parse::<u32>(),
        day.trim().parse::<u32>(),
    ) {
        (Ok(year), Ok(month), Ok(day)) => NaiveDate::from_ymd_opt(year, month, day)
            .map_or(NormalizedDate::Invalid, NormalizedDate::Date),
        _ => NormalizedDate::Invalid,
    }
}

fn parse_generic(raw: &str) -> NormalizedDate {
    for format in ["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"] {
        if let Ok(parsed) = NaiveDate::parse_from_str(raw, format) {
            return NormalizedDate::Date(parsed);
        }
    }
    NormalizedDate::Invalid
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
