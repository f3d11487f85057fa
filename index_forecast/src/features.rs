//! Calendar features and monthly date axes

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of columns a feature row expands to
pub const FEATURE_COUNT: usize = 3;

/// Calendar position of one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Calendar month, 1-12
    pub month: u32,
    /// Calendar year
    pub year: i32,
    /// Position in the full chronological axis, starting at 0
    pub time_index: usize,
}

impl FeatureRow {
    /// Numeric representation used by the tree models
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [self.month as f64, self.year as f64, self.time_index as f64]
    }
}

/// One feature row per date.
///
/// History and any appended future dates share a single `time_index`
/// space, so the index keeps counting across the boundary.
pub fn build_features(dates: &[NaiveDate]) -> Vec<FeatureRow> {
    dates
        .iter()
        .enumerate()
        .map(|(time_index, date)| FeatureRow {
            month: date.month(),
            year: date.year(),
            time_index,
        })
        .collect()
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// `horizon` consecutive month starts, beginning the month after `last`
pub fn future_month_starts(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    let first = month_start(last);
    (1..=horizon)
        .filter_map(|step| first.checked_add_months(Months::new(step as u32)))
        .collect()
}
