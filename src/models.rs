//! Data models for request configuration and scraped headlines.
//!
//! - [`RequestHeaders`]: base URL template plus HTTP headers, shared read-only
//!   by every fetch
//! - [`HeadlineRecord`]: one fully resolved headline row
//! - [`ResultSet`]: every record of a run, in ticker-request order, queryable
//!   by date

use chrono::{NaiveDate, NaiveTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder substituted with the ticker when present in a base URL.
pub const TICKER_PLACEHOLDER: &str = "{ticker}";

/// Base URL template and headers sent with every quote page request.
///
/// Built once from the CLI and config file, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeaders {
    /// Quote page address template, e.g. `https://finviz.com/quote.ashx?t=`.
    pub base_url: String,
    /// Header name to value, sent verbatim.
    pub headers: BTreeMap<String, String>,
}

impl RequestHeaders {
    /// Headers the way the finviz quote page expects them: a browser-like
    /// user agent and the base URL as referer.
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let mut headers = BTreeMap::new();
        headers.insert("User-Agent".to_string(), user_agent.into());
        headers.insert("Referer".to_string(), base_url.clone());
        Self { base_url, headers }
    }

    /// Add or replace one header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Page address for one ticker.
    ///
    /// The ticker is percent-encoded and either substituted for `{ticker}`
    /// or appended to the base URL.
    pub fn page_url(&self, ticker: &str) -> String {
        let encoded = urlencoding::encode(ticker);
        if self.base_url.contains(TICKER_PLACEHOLDER) {
            self.base_url.replace(TICKER_PLACEHOLDER, &encoded)
        } else {
            format!("{}{}", self.base_url, encoded)
        }
    }
}

/// A single headline with its reconstructed publication date and time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlineRecord {
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Ticker whose news table the headline came from.
    pub entity: String,
    pub headline: String,
    pub url: String,
}

/// Ordered headlines of a whole run.
///
/// Records are grouped by ticker in request order, and within a ticker keep
/// the table's row order. Several records may share a date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<HeadlineRecord>,
}

impl ResultSet {
    pub fn new(records: Vec<HeadlineRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeadlineRecord> {
        self.records.iter()
    }

    /// Records published on `date`, in result order.
    pub fn on(&self, date: NaiveDate) -> impl Iterator<Item = &HeadlineRecord> {
        self.records.iter().filter(move |r| r.date == date)
    }

    /// Records scraped for one ticker.
    pub fn for_entity<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a HeadlineRecord> {
        self.records.iter().filter(move |r| r.entity == entity)
    }

    /// Distinct dates, in the order they first appear.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).unique().collect()
    }
}

impl From<Vec<HeadlineRecord>> for ResultSet {
    fn from(records: Vec<HeadlineRecord>) -> Self {
        Self::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: (i32, u32, u32), entity: &str, headline: &str) -> HeadlineRecord {
        HeadlineRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            entity: entity.to_string(),
            headline: headline.to_string(),
            url: format!("https://example.com/{}", headline),
        }
    }

    #[test]
    fn test_page_url_appends_ticker() {
        let headers = RequestHeaders::new("https://finviz.com/quote.ashx?t=", "Mozilla/5.0");
        assert_eq!(
            headers.page_url("AAPL"),
            "https://finviz.com/quote.ashx?t=AAPL"
        );
    }

    #[test]
    fn test_page_url_substitutes_placeholder_and_encodes() {
        let headers =
            RequestHeaders::new("https://finviz.com/quote.ashx?t={ticker}&p=d", "Mozilla/5.0");
        assert_eq!(
            headers.page_url("BRK B"),
            "https://finviz.com/quote.ashx?t=BRK%20B&p=d"
        );
    }

    #[test]
    fn test_default_headers_include_referer() {
        let headers = RequestHeaders::new("https://finviz.com/quote.ashx?t=", "Mozilla/5.0")
            .with_header("Accept", "text/html");
        assert_eq!(headers.headers["User-Agent"], "Mozilla/5.0");
        assert_eq!(headers.headers["Referer"], "https://finviz.com/quote.ashx?t=");
        assert_eq!(headers.headers["Accept"], "text/html");
    }

    #[test]
    fn test_result_set_date_queries() {
        let set = ResultSet::new(vec![
            record((2024, 1, 5), "AAA", "a1"),
            record((2024, 1, 4), "AAA", "a2"),
            record((2024, 1, 5), "BBB", "b1"),
            record((2024, 1, 3), "BBB", "b2"),
        ]);

        let jan5 = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let on: Vec<_> = set.on(jan5).map(|r| r.headline.as_str()).collect();
        assert_eq!(on, vec!["a1", "b1"]);

        assert_eq!(
            set.dates(),
            vec![
                jan5,
                NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            ]
        );
        assert_eq!(set.for_entity("BBB").count(), 2);
    }

    #[test]
    fn test_result_set_serializes_as_array() {
        let set = ResultSet::new(vec![record((2024, 1, 5), "AAA", "a1")]);
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"date\":\"2024-01-05\""));
        assert!(json.contains("\"time\":\"09:30:00\""));

        let back: ResultSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
