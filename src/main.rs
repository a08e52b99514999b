//! # finviz headlines
//!
//! Scrapes the news table of finviz quote pages for a list of tickers and
//! reconstructs a publication date and time for every headline.
//!
//! ## Usage
//!
//! ```sh
//! finviz_headlines AAPL MSFT --max-days 3 -j ./json
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: download each ticker's quote page (concurrently, with retries)
//! 2. **Walking**: classify each news table row and carry the current day
//!    forward, stopping once the day budget is spent
//! 3. **Merging**: join per-ticker records in request order
//! 4. **Output**: write JSON and/or Markdown, or print Markdown to stdout

use chrono::Local;
use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod aggregate;
mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod outputs;
mod rows;
mod scrapers;
mod tracker;
mod utils;

use aggregate::{collect_headlines, AggregateRequest};
use cli::Cli;
use config::{load_config, FileConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use fetch::{HttpFetcher, RetryFetch};
use error::ScrapeError;
use models::RequestHeaders;
use outputs::{json, markdown};
use scrapers::finviz::{NewsTableScraper, HEADLINE_ANCHOR, NEWS_TABLE_MARKER};
use utils::ensure_writable_dir;

const DEFAULT_MAX_DAYS: usize = 3;
const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_RETRIES: usize = 2;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("finviz_headlines starting up");

    let args = Cli::parse();
    debug!(tickers = %args.tickers.iter().join(","), "Parsed CLI arguments");

    let file_config = match &args.config {
        Some(path) => load_config(path).await?,
        None => FileConfig::default(),
    };

    // Fail before any network work if an output directory is unusable.
    for dir in [&args.json_output_dir, &args.markdown_output_dir]
        .into_iter()
        .flatten()
    {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    let request = build_request(&args, &file_config);
    let retries = args
        .retries
        .or(file_config.retries)
        .unwrap_or(DEFAULT_RETRIES);
    info!(
        tickers = request.tickers.len(),
        max_days = request.max_days,
        today = %request.today,
        concurrency = request.concurrency,
        retries,
        "Starting headline scrape"
    );

    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    let fetcher = RetryFetch::new(HttpFetcher::new(client), retries, RETRY_BASE_DELAY)
        .with_max_delay(RETRY_MAX_DELAY);
    let scraper = build_scraper(&file_config)?;

    let (result, outcomes) = collect_headlines(&fetcher, &scraper, &request).await;

    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.result.is_err())
        .map(|o| o.ticker.as_str())
        .collect();
    if !failed.is_empty() {
        warn!(tickers = %failed.iter().join(","), "Some tickers produced no headlines");
    }
    for ticker in request.tickers.iter().unique() {
        debug!(%ticker, records = result.for_entity(ticker).count(), "Ticker summary");
    }

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_result_set(&result, dir, request.today).await {
            error!(error = %e, "Failed to write JSON");
        }
    }
    if let Some(dir) = &args.markdown_output_dir {
        if let Err(e) = markdown::write_markdown(&result, dir, request.today).await {
            error!(error = %e, "Failed to write Markdown");
        }
    }
    if args.json_output_dir.is_none() && args.markdown_output_dir.is_none() {
        print!("{}", markdown::result_set_to_markdown(&result, request.today));
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        records = result.len(),
        tickers = result.iter().map(|r| r.entity.as_str()).unique().count(),
        dates = result.dates().len(),
        "Execution complete"
    );
    Ok(())
}

/// Default selectors unless the config file overrides either of them.
fn build_scraper(file_config: &FileConfig) -> Result<NewsTableScraper, ScrapeError> {
    match (&file_config.table_selector, &file_config.anchor_selector) {
        (None, None) => Ok(NewsTableScraper::default()),
        (table, anchor) => NewsTableScraper::new(
            table.as_deref().unwrap_or(NEWS_TABLE_MARKER),
            anchor.as_deref().unwrap_or(HEADLINE_ANCHOR),
        ),
    }
}

/// Merge CLI flags over the config file over built-in defaults.
fn build_request(args: &Cli, file_config: &FileConfig) -> AggregateRequest {
    let base_url = args
        .base_url
        .clone()
        .or_else(|| file_config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| file_config.user_agent.clone())
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    let headers = file_config
        .headers
        .iter()
        .fold(RequestHeaders::new(base_url, user_agent), |h, (k, v)| {
            h.with_header(k.clone(), v.clone())
        });

    AggregateRequest {
        headers,
        tickers: args.tickers.clone(),
        max_days: args
            .max_days
            .or(file_config.max_days)
            .unwrap_or(DEFAULT_MAX_DAYS),
        today: args.today.unwrap_or_else(|| Local::now().date_naive()),
        concurrency: args
            .concurrency
            .or(file_config.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_build_request_defaults() {
        let args = Cli::parse_from(["finviz_headlines", "AAPL", "--today", "2024-01-05"]);
        let request = build_request(&args, &FileConfig::default());

        assert_eq!(request.tickers, vec!["AAPL"]);
        assert_eq!(request.max_days, DEFAULT_MAX_DAYS);
        assert_eq!(request.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(request.today, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(request.headers.base_url, DEFAULT_BASE_URL);
        assert_eq!(request.headers.headers["Referer"], DEFAULT_BASE_URL);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let args = Cli::parse_from([
            "finviz_headlines",
            "AAPL",
            "--max-days",
            "1",
            "--base-url",
            "https://mirror.example/q?t=",
        ]);
        let mut file_config = FileConfig {
            max_days: Some(9),
            concurrency: Some(2),
            user_agent: Some("curl/8".to_string()),
            ..FileConfig::default()
        };
        file_config
            .headers
            .insert("Accept-Language".to_string(), "en-US".to_string());

        let request = build_request(&args, &file_config);
        assert_eq!(request.max_days, 1);
        assert_eq!(request.concurrency, 2);
        assert_eq!(request.headers.base_url, "https://mirror.example/q?t=");
        assert_eq!(request.headers.headers["User-Agent"], "curl/8");
        assert_eq!(request.headers.headers["Accept-Language"], "en-US");
    }

    #[test]
    fn test_build_scraper_from_config_selectors() {
        assert!(build_scraper(&FileConfig::default()).is_ok());

        let custom = FileConfig {
            anchor_selector: Some("a.tab-link-news".to_string()),
            ..FileConfig::default()
        };
        assert!(build_scraper(&custom).is_ok());

        let broken = FileConfig {
            table_selector: Some("table[".to_string()),
            ..FileConfig::default()
        };
        assert!(matches!(
            build_scraper(&broken),
            Err(ScrapeError::Selector(_))
        ));
    }
}
