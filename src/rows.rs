//! Leading-cell tokenising and row classification.
//!
//! The finviz news table only prints the date on the first row of each day:
//!
//! ```text
//! Jan-05-24 02:30PM   <- date-bearing
//!           01:15PM   <- continuation (time only)
//! Today 09:00AM       <- date-bearing, relative marker
//! ```
//!
//! [`classify`] decides which kind a row is from its leading cell tokens.
//! It does not parse dates or times, that is the tracker's job.

use crate::error::RowDecodeWarning;
use once_cell::sync::Lazy;
use regex::Regex;

/// The relative "today" marker printed instead of a date.
pub const TODAY_MARKER: &str = "Today";

static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+-\d{1,2}-\d{2}$").unwrap());

static TIME_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}(?i:[AP]M)?$").unwrap());

/// Classification of one news table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    /// Starts a new day. `date_token` is either a literal date or [`TODAY_MARKER`].
    DateBearing {
        date_token: String,
        time_token: String,
    },
    /// Same day as the row above; the cell opens with blank padding before the time.
    ContinuationWithTime { time_token: String },
    /// Same day as the row above; the cell holds only the time.
    ContinuationTimeOnly { time_token: String },
}

impl RowKind {
    pub fn is_continuation(&self) -> bool {
        !matches!(self, RowKind::DateBearing { .. })
    }
}

/// Split leading-cell text into tokens on any whitespace, `&nbsp;` included.
///
/// A leading run of `&nbsp;` padding followed by an ordinary space yields an
/// empty first token, which marks a continuation row whose time follows
/// blank padding. Padding glued to the time (`&nbsp;&nbsp;01:10PM`) does not.
pub fn tokenize(cell_text: &str) -> Vec<&str> {
    let trimmed = cell_text.trim_matches(|c: char| c.is_ascii_whitespace());
    let rest = trimmed.trim_start_matches('\u{a0}');
    let padded =
        rest.len() < trimmed.len() && rest.starts_with(|c: char| c.is_ascii_whitespace());

    let mut tokens = Vec::new();
    if padded {
        tokens.push("");
    }
    tokens.extend(rest.split_whitespace());
    tokens
}

pub fn is_today_marker(token: &str) -> bool {
    token.eq_ignore_ascii_case(TODAY_MARKER)
}

pub fn looks_like_date(token: &str) -> bool {
    is_today_marker(token) || DATE_TOKEN.is_match(token)
}

pub fn looks_like_time(token: &str) -> bool {
    TIME_TOKEN.is_match(token)
}

/// Classify a row from its leading cell tokens.
///
/// The date shape is tested first; anything else falls through to the
/// continuation shapes.
pub fn classify(tokens: &[&str]) -> Result<RowKind, RowDecodeWarning> {
    let Some(&first) = tokens.first() else {
        return Err(RowDecodeWarning::Empty);
    };

    if looks_like_date(first) {
        return match tokens.get(1) {
            Some(time) if !time.is_empty() => Ok(RowKind::DateBearing {
                date_token: first.to_string(),
                time_token: time.to_string(),
            }),
            _ => Err(RowDecodeWarning::MissingTime(first.to_string())),
        };
    }

    if first.is_empty() {
        return match tokens.iter().skip(1).find(|t| !t.is_empty()) {
            Some(time) if looks_like_time(time) => Ok(RowKind::ContinuationWithTime {
                time_token: time.to_string(),
            }),
            Some(other) => Err(RowDecodeWarning::UnrecognisedToken(other.to_string())),
            None => Err(RowDecodeWarning::Empty),
        };
    }

    if looks_like_time(first) {
        return Ok(RowKind::ContinuationTimeOnly {
            time_token: first.to_string(),
        });
    }

    Err(RowDecodeWarning::UnrecognisedToken(first.to_string()))
}
