//! finviz quote page news table scraper.
//!
//! Each quote page (`https://finviz.com/quote.ashx?t=AAPL`) carries a
//! `<table id="news-table">` whose rows look like:
//!
//! ```html
//! <tr><td>Jan-05-24 02:30PM</td><td><a href="..." target="_blank">Headline</a></td></tr>
//! <tr><td>&nbsp;&nbsp;01:10PM</td><td><a href="..." target="_blank">Headline</a></td></tr>
//! ```
//!
//! Only the first row of each day repeats the date, so the rows are walked in
//! order with a [`DateTimeTracker`] reconstructing the date of every row.

use crate::error::{RowDecodeWarning, ScrapeError};
use crate::models::HeadlineRecord;
use crate::rows::{classify, tokenize};
use crate::tracker::{DateTimeTracker, DayBudgetGuard};
use crate::utils::collapse_whitespace;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Structural marker of the news table on a quote page.
pub const NEWS_TABLE_MARKER: &str = "table#news-table";

/// Anchors that carry a publishable headline. Private entries have none.
pub const HEADLINE_ANCHOR: &str = r#"a[target="_blank"]"#;

static NEWS_TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse(NEWS_TABLE_MARKER).unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse(HEADLINE_ANCHOR).unwrap());

/// Headline text and link pulled from one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub text: String,
    pub url: String,
}

/// Walk parameters for one ticker.
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Reference date for the "Today" marker.
    pub today: NaiveDate,
    pub max_days: usize,
}

/// Locates the news table in a quote page and turns its rows into records.
#[derive(Debug, Clone)]
pub struct NewsTableScraper {
    table_marker: String,
    table: Selector,
    anchor: Selector,
}

impl Default for NewsTableScraper {
    fn default() -> Self {
        Self {
            table_marker: NEWS_TABLE_MARKER.to_string(),
            table: (*NEWS_TABLE).clone(),
            anchor: (*ANCHOR).clone(),
        }
    }
}

impl NewsTableScraper {
    /// Build a scraper with custom CSS selectors for the table and the
    /// headline anchor.
    pub fn new(table_marker: &str, anchor: &str) -> Result<Self, ScrapeError> {
        let parse = |s: &str| {
            Selector::parse(s).map_err(|e| ScrapeError::Selector(format!("{}: {}", s, e)))
        };
        Ok(Self {
            table_marker: table_marker.to_string(),
            table: parse(table_marker)?,
            anchor: parse(anchor)?,
        })
    }

    /// Rows of the news table in document order.
    ///
    /// Only rows belonging to the table itself are returned; rows of tables
    /// nested inside a cell are not.
    pub fn locate_rows<'a>(&self, document: &'a Html) -> Result<Vec<ElementRef<'a>>, ScrapeError> {
        let table = document
            .select(&self.table)
            .next()
            .ok_or_else(|| ScrapeError::MissingTable {
                marker: self.table_marker.clone(),
            })?;

        let mut rows = Vec::new();
        for child in table.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "tr" => rows.push(child),
                "thead" | "tbody" | "tfoot" => rows.extend(
                    child
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|e| e.value().name() == "tr"),
                ),
                _ => {}
            }
        }
        Ok(rows)
    }

    /// First headline anchor of a row, with its `href` resolved against `base`.
    pub fn extract_headline(&self, row: ElementRef<'_>, base: Option<&Url>) -> Option<Headline> {
        let anchor = row.select(&self.anchor).next()?;
        let text = collapse_whitespace(&anchor.text().collect::<String>());
        if text.is_empty() {
            return None;
        }
        let href = anchor.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }
        let url = match base.and_then(|b| b.join(href).ok()) {
            Some(resolved) => resolved.to_string(),
            None => href.to_string(),
        };
        Some(Headline { text, url })
    }

    /// Walk one ticker's quote page and produce its records in row order.
    ///
    /// Rows that cannot be decoded or carry no headline are skipped. Once
    /// more than `max_days` days have been entered, the walk stops at the
    /// next decodable row.
    #[instrument(level = "info", skip_all, fields(%entity))]
    pub fn scrape(
        &self,
        markup: &str,
        entity: &str,
        page_url: &str,
        options: WalkOptions,
    ) -> Result<Vec<HeadlineRecord>, ScrapeError> {
        let document = Html::parse_document(markup);
        let rows = self.locate_rows(&document)?;
        let base = Url::parse(page_url).ok();
        let guard = DayBudgetGuard::new(options.max_days);
        let mut tracker = DateTimeTracker::new(options.today);
        let mut records = Vec::new();

        for (index, row) in rows.into_iter().enumerate() {
            let Some(cell) = leading_cell_text(row) else {
                warn!(row = index, warning = %RowDecodeWarning::NoLeadingCell, "Skipping row");
                continue;
            };
            let kind = match classify(&tokenize(&cell)) {
                Ok(kind) => kind,
                Err(w) => {
                    warn!(row = index, warning = %w, "Skipping undecodable row");
                    continue;
                }
            };

            if guard.should_stop(tracker.days_visited()) {
                info!(
                    row = index,
                    days_visited = tracker.days_visited(),
                    max_days = guard.max_days(),
                    continuation = kind.is_continuation(),
                    "Maximum days reached"
                );
                break;
            }

            if let Err(w) = tracker.observe(&kind) {
                warn!(row = index, warning = %w, "Skipping undecodable row");
                continue;
            }

            let Some((date, time)) = tracker.stamp() else {
                if tracker.is_tracking() {
                    debug!(row = index, "Row falls under an unparseable date; skipping");
                } else {
                    debug!(row = index, "Row precedes first dated row; skipping");
                }
                continue;
            };

            match self.extract_headline(row, base.as_ref()) {
                Some(headline) => records.push(HeadlineRecord {
                    date,
                    time,
                    entity: entity.to_string(),
                    headline: headline.text,
                    url: headline.url,
                }),
                None => debug!(row = index, "Private news row without headline"),
            }
        }

        info!(
            records = records.len(),
            days_visited = tracker.days_visited(),
            "Walked news table"
        );
        Ok(records)
    }
}

/// Text of the row's first `<td>` child.
fn leading_cell_text(row: ElementRef<'_>) -> Option<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "td")
        .map(|td| td.text().collect::<String>())
}
