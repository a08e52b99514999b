//! Multi-ticker aggregation.
//!
//! Every requested ticker is fetched (up to `concurrency` at a time), its
//! news table walked with a fresh tracker, and its records dropped into a
//! slot keyed by request position. Slots are joined in request order once
//! every fetch has finished, so the result does not depend on which page
//! arrived first.
//!
//! A ticker whose fetch or table lookup fails simply leaves its slot empty.

use crate::error::ScrapeError;
use crate::fetch::MarkupFetcher;
use crate::models::{HeadlineRecord, RequestHeaders, ResultSet};
use crate::scrapers::finviz::{NewsTableScraper, WalkOptions};
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{error, info, instrument, warn};

/// Everything one aggregation run needs besides the fetcher.
#[derive(Debug, Clone)]
pub struct AggregateRequest {
    pub headers: RequestHeaders,
    /// Tickers in request order. Duplicates are scraped independently.
    pub tickers: Vec<String>,
    pub max_days: usize,
    pub today: NaiveDate,
    /// Maximum number of pages fetched at once. `0` is treated as `1`.
    pub concurrency: usize,
}

/// Per-ticker outcome, kept for the run summary.
#[derive(Debug)]
pub struct TickerOutcome {
    pub ticker: String,
    pub result: Result<usize, ScrapeError>,
}

/// Ordered collector with one write-once slot per requested ticker.
#[derive(Debug)]
pub struct EntitySlots {
    slots: Vec<Option<Vec<HeadlineRecord>>>,
}

impl EntitySlots {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Fill slot `index`. Returns `false` (and leaves the slot alone) if the
    /// index is out of range or the slot was already filled.
    pub fn insert(&mut self, index: usize, records: Vec<HeadlineRecord>) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(records);
                true
            }
            _ => false,
        }
    }

    /// Concatenate slots in request order; unfilled slots contribute nothing.
    pub fn into_result_set(self) -> ResultSet {
        self.slots
            .into_iter()
            .flatten()
            .flatten()
            .collect::<Vec<_>>()
            .into()
    }
}

/// Fetch and walk one ticker.
pub async fn scrape_ticker<F: MarkupFetcher>(
    fetcher: &F,
    scraper: &NewsTableScraper,
    headers: &RequestHeaders,
    ticker: &str,
    options: WalkOptions,
) -> Result<Vec<HeadlineRecord>, ScrapeError> {
    let markup = fetcher.fetch(headers, ticker).await?;
    let page_url = headers.page_url(ticker);
    scraper
        .scrape(&markup, ticker, &page_url, options)
        .inspect_err(|e| {
            if matches!(e, ScrapeError::MissingTable { .. }) {
                warn!(
                    %ticker,
                    preview = %truncate_for_log(&markup, 200),
                    "Quote page has no news table"
                );
            }
        })
}

/// Scrape every requested ticker and merge the results in request order.
///
/// Failures are logged per ticker and never abort the batch. Returns the
/// merged records together with one outcome per ticker.
#[instrument(level = "info", skip_all, fields(tickers = request.tickers.len(), max_days = request.max_days, today = %request.today))]
pub async fn collect_headlines<F: MarkupFetcher>(
    fetcher: &F,
    scraper: &NewsTableScraper,
    request: &AggregateRequest,
) -> (ResultSet, Vec<TickerOutcome>) {
    let options = WalkOptions {
        today: request.today,
        max_days: request.max_days,
    };
    let concurrency = request.concurrency.max(1);

    let results: Vec<(usize, Result<Vec<HeadlineRecord>, ScrapeError>)> =
        stream::iter(request.tickers.iter().enumerate())
            .map(|(index, ticker)| async move {
                let result =
                    scrape_ticker(fetcher, scraper, &request.headers, ticker, options).await;
                (index, result)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

    let mut slots = EntitySlots::new(request.tickers.len());
    let mut outcomes: Vec<Option<TickerOutcome>> =
        (0..request.tickers.len()).map(|_| None).collect();

    for (index, result) in results {
        let ticker = request.tickers[index].clone();
        let outcome = match result {
            Ok(records) => {
                let count = records.len();
                if !slots.insert(index, records) {
                    error!(index, %ticker, "Slot already filled; dropping duplicate result");
                    continue;
                }
                info!(%ticker, records = count, "Scraped ticker");
                Ok(count)
            }
            Err(e) => {
                warn!(%ticker, error = %e, "Ticker skipped");
                Err(e)
            }
        };
        outcomes[index] = Some(TickerOutcome {
            ticker,
            result: outcome,
        });
    }

    let result_set = slots.into_result_set();
    let succeeded = outcomes
        .iter()
        .flatten()
        .filter(|o| o.result.is_ok())
        .count();
    info!(
        records = result_set.len(),
        succeeded,
        failed = request.tickers.len() - succeeded,
        "Aggregation complete"
    );
    if result_set.is_empty() {
        warn!("No headlines collected for any ticker");
    }

    (result_set, outcomes.into_iter().flatten().collect())
}
