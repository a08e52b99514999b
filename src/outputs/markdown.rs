//! Markdown rendering of a result set.
//!
//! One section per date, in the order dates first appear, each holding a
//! table of that date's headlines:
//!
//! ```text
//! ## 2024-01-05
//!
//! | Time | Ticker | Headline |
//! |------|--------|----------|
//! | 14:30 | AAPL | [Apple beats estimates](https://...) |
//! ```

use crate::models::ResultSet;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::Write;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Escape characters that would break a Markdown table cell or link label.
fn escape_cell(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace('[', "\\[")
        .replace(']', "\\]")
}

pub fn result_set_to_markdown(result: &ResultSet, today: NaiveDate) -> String {
    let mut md = String::new();
    writeln!(md, "# Headlines as of {}\n", today).unwrap();

    if result.is_empty() {
        writeln!(md, "_No headlines collected._").unwrap();
        return md;
    }

    for date in result.dates() {
        writeln!(md, "## {}\n", date).unwrap();
        writeln!(md, "| Time | Ticker | Headline |").unwrap();
        writeln!(md, "|------|--------|----------|").unwrap();
        for record in result.on(date) {
            writeln!(
                md,
                "| {} | {} | [{}]({}) |",
                record.time.format("%H:%M"),
                escape_cell(&record.entity),
                escape_cell(&record.headline),
                record.url.replace(' ', "%20").replace(')', "%29"),
            )
            .unwrap();
        }
        md.push('\n');
    }
    md
}

/// Write the rendered Markdown to `{markdown_output_dir}/{today}.md`.
#[instrument(level = "info", skip_all, fields(%markdown_output_dir))]
pub async fn write_markdown(
    result: &ResultSet,
    markdown_output_dir: &str,
    today: NaiveDate,
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(markdown_output_dir).await?;
    let path = PathBuf::from(markdown_output_dir).join(format!("{}.md", today));
    fs::write(&path, result_set_to_markdown(result, today)).await?;
    info!(path = %path.display(), "Wrote Markdown");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HeadlineRecord;
    use chrono::NaiveTime;

    fn record(day: u32, hour: u32, entity: &str, headline: &str) -> HeadlineRecord {
        HeadlineRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 5, 0).unwrap(),
            entity: entity.to_string(),
            headline: headline.to_string(),
            url: format!("https://example.com/{}", day),
        }
    }

    #[test]
    fn test_sections_follow_first_seen_date_order() {
        let set = ResultSet::new(vec![
            record(5, 14, "AAPL", "Apple up"),
            record(4, 9, "AAPL", "Apple down"),
            record(5, 10, "MSFT", "Microsoft | cloud"),
        ]);
        let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let md = result_set_to_markdown(&set, today);

        let jan5 = md.find("## 2024-01-05").unwrap();
        let jan4 = md.find("## 2024-01-04").unwrap();
        assert!(jan5 < jan4);
        assert!(md.contains("| 14:05 | AAPL | [Apple up](https://example.com/5) |"));
        assert!(md.contains("Microsoft \\| cloud"));
        // MSFT's Jan 5 row is grouped under the Jan 5 heading, before Jan 4.
        assert!(md.find("Microsoft").unwrap() < jan4);
    }

    #[test]
    fn test_empty_result() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let md = result_set_to_markdown(&ResultSet::default(), today);
        assert!(md.contains("_No headlines collected._"));
    }
}
