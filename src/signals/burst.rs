//! Temporal burst detector.
//!
//! Coordinated campaigns tend to land many reviews in one week, or the whole
//! review history inside a single month. Both penalties can fire together and
//! stack.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate};

use super::SignalResult;
use crate::review::Review;

/// Below this many dated reviews the signal stays neutral.
const MIN_DATED: usize = 3;
const BURST_FACTOR: f64 = 3.0;
const BURST_MIN_COUNT: usize = 3;
const SAME_MONTH_MIN: usize = 5;

/// Sunday that starts the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = i64::from(date.weekday().num_days_from_sunday());
    date - Duration::days(back)
}

/// Week bucket key, `YYYY-MM-DD` of the Sunday that opens the week.
pub fn week_key(date: NaiveDate) -> String {
    week_start(date).format("%Y-%m-%d").to_string()
}

pub fn evaluate(reviews: &[Review]) -> SignalResult {
    let mut out = SignalResult::clean();

    let dates: Vec<NaiveDate> = reviews.iter().filter_map(|r| r.date).collect();
    if dates.len() < MIN_DATED {
        return out;
    }

    let mut weeks: BTreeMap<String, usize> = BTreeMap::new();
    for d in &dates {
        *weeks.entry(week_key(*d)).or_default() += 1;
    }

    let max = weeks.values().copied().max().unwrap_or(0);
    let avg = dates.len() as f64 / weeks.len() as f64;
    out.peak_week_count = Some(max);

    if max as f64 >= avg * BURST_FACTOR && max >= BURST_MIN_COUNT {
        out.penalize_suspicious(25, format!("Review burst: {max} reviews in a single week"));
    }

    let months: BTreeSet<(i32, u32)> = dates.iter().map(|d| (d.year(), d.month())).collect();
    if months.len() == 1 && dates.len() >= SAME_MONTH_MIN {
        out.penalize_suspicious(20, "All reviews clustered in the same month");
    }

    out.finish()
}
