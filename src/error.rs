//! Error types for fetching, table parsing, row decoding, and configuration.
//!
//! Failures are scoped to the smallest unit they affect:
//!
//! | Type | Scope | Effect |
//! |------|-------|--------|
//! | [`FetchError`] | one ticker | ticker contributes no headlines, batch continues |
//! | [`ScrapeError`] | one ticker | ticker contributes no headlines, batch continues |
//! | [`RowDecodeWarning`] | one table row | row skipped, walk continues |
//!
//! A row without a usable headline link is not an error at all; the
//! extractor simply returns `None`.

use reqwest::StatusCode;
use thiserror::Error;

/// Transport failure reported by a [`crate::fetch::MarkupFetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} for {url}")]
    Status { status: StatusCode, url: String },
    #[error("invalid page url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// Per-ticker failure. The aggregator logs it and moves on to the next ticker.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("news table `{marker}` not found in page")]
    MissingTable { marker: String },
    #[error("invalid selector `{0}`")]
    Selector(String),
}

/// A table row whose leading cell could not be turned into a date or time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowDecodeWarning {
    #[error("row has no leading cell")]
    NoLeadingCell,
    #[error("leading cell is empty")]
    Empty,
    #[error("leading token `{0}` is neither a date nor a time")]
    UnrecognisedToken(String),
    #[error("date token `{0}` has no time token after it")]
    MissingTime(String),
    #[error("could not parse date `{0}`")]
    BadDate(String),
    #[error("could not parse time `{0}`")]
    BadTime(String),
}

/// Failure loading the optional YAML configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
