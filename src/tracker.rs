//! Date/time reconstruction across the rows of one ticker's news table.
//!
//! [`DateTimeTracker`] carries the current day and time from row to row and
//! counts how many day boundaries it has crossed. [`DayBudgetGuard`] turns
//! that count into a stop signal.
//!
//! A tracker is created per ticker and dropped once that ticker's table has
//! been walked, so no state leaks between tickers.

use crate::error::RowDecodeWarning;
use crate::rows::{is_today_marker, RowKind};
use chrono::{NaiveDate, NaiveTime};

/// Literal date format used by the table, e.g. `Jan-05-24`.
pub const DATE_FORMAT: &str = "%b-%d-%y";

/// Time formats accepted, 12-hour first (`02:30PM`), then 24-hour (`14:30`).
pub const TIME_FORMATS: [&str; 2] = ["%I:%M%p", "%H:%M"];

/// Snapshot of a walk in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerState {
    pub current_date: Option<NaiveDate>,
    pub current_time: Option<NaiveTime>,
    /// Date-bearing rows seen so far. Never decreases.
    pub days_visited: usize,
}

/// Resolve a date token, mapping the relative marker to `today`.
pub fn parse_date(token: &str, today: NaiveDate) -> Result<NaiveDate, RowDecodeWarning> {
    if is_today_marker(token) {
        return Ok(today);
    }
    NaiveDate::parse_from_str(token, DATE_FORMAT)
        .map_err(|_| RowDecodeWarning::BadDate(token.to_string()))
}

pub fn parse_time(token: &str) -> Result<NaiveTime, RowDecodeWarning> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(token, fmt).ok())
        .ok_or_else(|| RowDecodeWarning::BadTime(token.to_string()))
}

/// Row-by-row state machine: `Uninitialized` until the first date-bearing
/// row, `Tracking` afterwards.
#[derive(Debug)]
pub struct DateTimeTracker {
    today: NaiveDate,
    state: TrackerState,
}

impl DateTimeTracker {
    /// `today` resolves the relative marker; it is injected so a walk over
    /// fixed markup always yields the same dates.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            state: TrackerState::default(),
        }
    }

    pub fn days_visited(&self) -> usize {
        self.state.days_visited
    }

    pub fn is_tracking(&self) -> bool {
        self.state.days_visited > 0
    }

    /// Feed one classified row.
    ///
    /// A date-bearing row always counts as a new day. If its tokens do not
    /// parse, the current date is cleared so following continuation rows are
    /// not stamped with the previous day.
    ///
    /// A continuation row only moves the time. If its time does not parse the
    /// state is left untouched and the row should be skipped.
    pub fn observe(&mut self, kind: &RowKind) -> Result<(), RowDecodeWarning> {
        match kind {
            RowKind::DateBearing {
                date_token,
                time_token,
            } => {
                self.state.days_visited += 1;
                let resolved = parse_date(date_token, self.today)
                    .and_then(|date| parse_time(time_token).map(|time| (date, time)));
                match resolved {
                    Ok((date, time)) => {
                        self.state.current_date = Some(date);
                        self.state.current_time = Some(time);
                        Ok(())
                    }
                    Err(w) => {
                        self.state.current_date = None;
                        self.state.current_time = None;
                        Err(w)
                    }
                }
            }
            RowKind::ContinuationWithTime { time_token }
            | RowKind::ContinuationTimeOnly { time_token } => {
                let time = parse_time(time_token)?;
                self.state.current_time = Some(time);
                Ok(())
            }
        }
    }

    /// The (date, time) a headline on the current row gets, if both are known.
    pub fn stamp(&self) -> Option<(NaiveDate, NaiveTime)> {
        Some((self.state.current_date?, self.state.current_time?))
    }
}

/// Stops a walk once more than `max_days` days have been entered.
///
/// Checked before a row is observed, so the date-bearing row that pushes the
/// count past the budget keeps its headline and every row after it is cut,
/// whatever its kind.
#[derive(Debug, Clone, Copy)]
pub struct DayBudgetGuard {
    max_days: usize,
}

impl DayBudgetGuard {
    pub fn new(max_days: usize) -> Self {
        Self { max_days }
    }

    pub fn max_days(&self) -> usize {
        self.max_days
    }

    /// `days_visited` is the tracker's count before the current row.
    pub fn should_stop(&self, days_visited: usize) -> bool {
        days_visited > self.max_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date_row(date: &str, time: &str) -> RowKind {
        RowKind::DateBearing {
            date_token: date.to_string(),
            time_token: time.to_string(),
        }
    }

    fn cont(time: &str) -> RowKind {
        RowKind::ContinuationTimeOnly {
            time_token: time.to_string(),
        }
    }

    #[test]
    fn test_parse_date_literal_and_today() {
        let today = ymd(2024, 1, 5);
        assert_eq!(parse_date("Jan-03-24", today).unwrap(), ymd(2024, 1, 3));
        assert_eq!(parse_date("Today", today).unwrap(), today);
        assert_eq!(
            parse_date("Foo-99-99", today),
            Err(RowDecodeWarning::BadDate("Foo-99-99".to_string()))
        );
    }

    #[test]
    fn test_parse_time_both_clocks() {
        assert_eq!(parse_time("02:30PM").unwrap(), hm(14, 30));
        assert_eq!(parse_time("12:05AM").unwrap(), hm(0, 5));
        assert_eq!(parse_time("14:30").unwrap(), hm(14, 30));
        assert!(parse_time("25:99").is_err());
    }

    #[test]
    fn test_today_marker_resolves_to_injected_date() {
        let mut tracker = DateTimeTracker::new(ymd(2024, 1, 5));
        tracker.observe(&date_row("Today", "14:30")).unwrap();
        assert_eq!(tracker.stamp(), Some((ymd(2024, 1, 5), hm(14, 30))));
    }

    #[test]
    fn test_uninitialized_has_no_stamp() {
        let mut tracker = DateTimeTracker::new(ymd(2024, 1, 5));
        assert!(!tracker.is_tracking());
        tracker.observe(&cont("09:00AM")).unwrap();
        assert_eq!(tracker.stamp(), None);
        assert_eq!(tracker.days_visited(), 0);
    }

    #[test]
    fn test_continuation_inherits_date() {
        let mut tracker = DateTimeTracker::new(ymd(2024, 1, 5));
        tracker.observe(&date_row("Jan-03-24", "04:00PM")).unwrap();
        tracker.observe(&cont("01:00PM")).unwrap();
        assert_eq!(tracker.stamp(), Some((ymd(2024, 1, 3), hm(13, 0))));
        tracker
            .observe(&RowKind::ContinuationWithTime {
                time_token: "08:15AM".to_string(),
            })
            .unwrap();
        assert_eq!(tracker.stamp(), Some((ymd(2024, 1, 3), hm(8, 15))));
        assert_eq!(tracker.days_visited(), 1);
    }

    #[test]
    fn test_days_visited_counts_only_date_rows() {
        let mut tracker = DateTimeTracker::new(ymd(2024, 1, 5));
        let rows = [
            date_row("Today", "10:00AM"),
            cont("09:00AM"),
            date_row("Jan-04-24", "05:00PM"),
            cont("bogus"),
            cont("03:00PM"),
            date_row("Jan-03-24", "11:00AM"),
        ];
        let mut previous = 0;
        for row in &rows {
            let _ = tracker.observe(row);
            assert!(tracker.days_visited() >= previous);
            if row.is_continuation() {
                assert_eq!(tracker.days_visited(), previous);
            }
            previous = tracker.days_visited();
        }
        assert_eq!(tracker.days_visited(), 3);
    }

    #[test]
    fn test_bad_date_clears_current_date() {
        let mut tracker = DateTimeTracker::new(ymd(2024, 1, 5));
        tracker.observe(&date_row("Jan-04-24", "05:00PM")).unwrap();
        assert!(tracker.observe(&date_row("Foo-99-99", "04:00PM")).is_err());
        assert_eq!(tracker.days_visited(), 2);
        tracker.observe(&cont("03:00PM")).unwrap();
        assert_eq!(tracker.stamp(), None);
    }

    #[test]
    fn test_bad_continuation_time_keeps_state() {
        let mut tracker = DateTimeTracker::new(ymd(2024, 1, 5));
        tracker.observe(&date_row("Jan-04-24", "05:00PM")).unwrap();
        assert!(tracker.observe(&cont("99:99")).is_err());
        assert_eq!(tracker.stamp(), Some((ymd(2024, 1, 4), hm(17, 0))));
    }

    #[test]
    fn test_guard_trips_once_budget_exceeded() {
        let guard = DayBudgetGuard::new(1);
        assert!(!guard.should_stop(0));
        assert!(!guard.should_stop(1));
        assert!(guard.should_stop(2));

        let zero = DayBudgetGuard::new(0);
        assert!(!zero.should_stop(0));
        assert!(zero.should_stop(1));
    }

    #[test]
    fn test_guard_cuts_single_row_days() {
        let guard = DayBudgetGuard::new(1);
        let mut tracker = DateTimeTracker::new(ymd(2024, 1, 5));
        let rows = [
            date_row("Jan-05-24", "10:00AM"),
            date_row("Jan-04-24", "10:00AM"),
            date_row("Jan-03-24", "10:00AM"),
        ];
        let mut stamped = Vec::new();
        for row in &rows {
            if guard.should_stop(tracker.days_visited()) {
                break;
            }
            tracker.observe(row).unwrap();
            stamped.push(tracker.stamp().unwrap().0);
        }
        assert_eq!(stamped, vec![ymd(2024, 1, 5), ymd(2024, 1, 4)]);
    }
}
