//! Optional YAML configuration.
//!
//! ```yaml
//! base_url: "https://finviz.com/quote.ashx?t="
//! user_agent: "Mozilla/5.0"
//! headers:
//!   Accept-Language: "en-US"
//! max_days: 5
//! concurrency: 4
//! retries: 2
//! table_selector: "table#news-table"
//! anchor_selector: 'a[target="_blank"]'
//! ```
//!
//! Every field is optional; command-line flags take precedence.

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://finviz.com/quote.ashx?t=";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub max_days: Option<usize>,
    pub concurrency: Option<usize>,
    pub retries: Option<usize>,
    /// CSS selector of the news table; defaults to `table#news-table`.
    pub table_selector: Option<String>,
    /// CSS selector of a row's headline anchor.
    pub anchor_selector: Option<String>,
}

pub fn parse_config(yaml: &str) -> Result<FileConfig, ConfigError> {
    if yaml.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn load_config(path: impl AsRef<Path>) -> Result<FileConfig, ConfigError> {
    let path = path.as_ref();
    let yaml = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let config = parse_config(&yaml)?;
    info!(extra_headers = config.headers.len(), "Loaded configuration");
    Ok(config)
}
