//! JSON output.
//!
//! The result set is serialised as an array of records, in result order:
//!
//! ```json
//! [{"date":"2024-01-05","time":"14:30:00","entity":"AAPL","headline":"...","url":"..."}]
//! ```

use crate::models::ResultSet;
use chrono::NaiveDate;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Write `result` to `{json_output_dir}/{today}.json`, creating the directory.
///
/// Returns the path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_result_set(
    result: &ResultSet,
    json_output_dir: &str,
    today: NaiveDate,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(result)?;
    fs::create_dir_all(json_output_dir).await?;

    let path = PathBuf::from(json_output_dir).join(format!("{}.json", today));
    fs::write(&path, json).await?;
    info!(path = %path.display(), records = result.len(), "Wrote JSON");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HeadlineRecord;
    use chrono::NaiveTime;

    #[tokio::test]
    async fn test_write_result_set() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let set = ResultSet::new(vec![HeadlineRecord {
            date: today,
            time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            entity: "AAPL".to_string(),
            headline: "Apple beats estimates".to_string(),
            url: "https://example.com/a".to_string(),
        }]);

        let dir = std::env::temp_dir().join(format!("finviz_headlines_json_{}", std::process::id()));
        let path = write_result_set(&set, &dir.to_string_lossy(), today)
            .await
            .unwrap();
        assert!(path.ends_with("2024-01-05.json"));

        let written = std::fs::read_to_string(&path).unwrap();
        let back: ResultSet = serde_json::from_str(&written).unwrap();
        assert_eq!(back, set);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
