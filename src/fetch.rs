//! Quote page fetching with optional exponential backoff.
//!
//! # Architecture
//!
//! - [`MarkupFetcher`]: maps a ticker to the raw markup of its quote page
//! - [`HttpFetcher`]: `reqwest` implementation sending the configured headers
//! - [`RetryFetch`]: decorator adding retries to any [`MarkupFetcher`]
//!
//! The table walk never retries; whether a page is re-requested is decided
//! entirely here.
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use crate::error::FetchError;
use crate::models::RequestHeaders;
use rand::{rng, Rng};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Source of raw quote page markup.
pub trait MarkupFetcher {
    /// Fetch the page for `ticker`, built from `headers.base_url`.
    async fn fetch(&self, headers: &RequestHeaders, ticker: &str) -> Result<String, FetchError>;
}

/// Plain HTTP GET with the configured headers.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Convert configured headers into a `reqwest` header map.
pub fn header_map(headers: &RequestHeaders) -> Result<HeaderMap, FetchError> {
    let mut map = HeaderMap::new();
    for (name, value) in &headers.headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| FetchError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

impl MarkupFetcher for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%ticker))]
    async fn fetch(&self, headers: &RequestHeaders, ticker: &str) -> Result<String, FetchError> {
        let page_url = headers.page_url(ticker);
        let url = Url::parse(&page_url).map_err(|source| FetchError::InvalidUrl {
            url: page_url.clone(),
            source,
        })?;

        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .headers(header_map(headers)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: page_url,
            });
        }

        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched quote page"
        );
        Ok(body)
    }
}

/// Wrapper that retries a [`MarkupFetcher`] with exponential backoff and jitter.
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: MarkupFetcher,
{
    /// `max_retries = 0` makes a single attempt.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    pub fn with_max_delay(mut self, max_delay: StdDuration) -> Self {
        self.max_delay = max_delay;
        self
    }

    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = (attempt - 1).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> MarkupFetcher for RetryFetch<T>
where
    T: MarkupFetcher,
{
    #[instrument(level = "info", skip_all, fields(%ticker))]
    async fn fetch(&self, headers: &RequestHeaders, ticker: &str) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(headers, ticker).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
