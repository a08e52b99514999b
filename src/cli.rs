//! Command-line interface definitions.
//!
//! All options can be given as flags; the page address and user agent also
//! fall back to environment variables.

use chrono::NaiveDate;
use clap::Parser;

/// Scrape dated news headlines for one or more tickers.
///
/// # Examples
///
/// ```sh
/// # Last three days of headlines for two tickers
/// finviz_headlines AAPL MSFT
///
/// # Fixed reference date, JSON and Markdown output
/// finviz_headlines AAPL --max-days 5 --today 2024-01-05 -j ./json -m ./markdown
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Tickers to scrape, in output order
    #[arg(required = true)]
    pub tickers: Vec<String>,

    /// Stop after this many distinct days per ticker
    #[arg(short = 'd', long)]
    pub max_days: Option<usize>,

    /// Date that the "Today" marker resolves to (YYYY-MM-DD); defaults to the local date
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Quote page address; the ticker replaces `{ticker}` or is appended
    #[arg(long, env = "FINVIZ_BASE_URL")]
    pub base_url: Option<String>,

    /// User-Agent header sent with every request
    #[arg(long, env = "FINVIZ_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Number of quote pages fetched at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Retries per quote page after a failed fetch
    #[arg(long)]
    pub retries: Option<usize>,

    /// Output directory for the JSON file
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Output directory for the Markdown file; printed to stdout when neither output is set
    #[arg(short, long)]
    pub markdown_output_dir: Option<String>,
}
