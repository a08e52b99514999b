//! News table scrapers.
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | finviz quote pages | [`finviz`] | HTML table walk | Date only on the first row of each day |
//!
//! A scraper turns one already-fetched page into records; fetching lives in
//! [`crate::fetch`] and multi-ticker merging in [`crate::aggregate`].

pub mod finviz;
