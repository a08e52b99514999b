//! Output generation for scraped headlines.
//!
//! - [`json`]: writes the [`crate::models::ResultSet`] as a JSON array
//! - [`markdown`]: renders one table per date for reading
//!
//! ```text
//! json_output_dir/
//! └── 2024-01-05.json
//!
//! markdown_output_dir/
//! └── 2024-01-05.md
//! ```
//!
//! Files are named after the reference date of the run.

pub mod json;
pub mod markdown;
