//! Named reporting windows and calendar-month bounds.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// A named look-back window used by reporting queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    /// No lower bound.
    All,
    Last24Hours,
    Last7Days,
    Last30Days,
    Last60Days,
    Last90Days,
    Last180Days,
    Last365Days,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown date range '{0}', expected one of: all, 24h, 7d, 30d, 60d, 90d, 180d, 365d")]
pub struct DateRangeError(pub String);

impl FromStr for DateRange {
    type Err = DateRangeError;

    /// Parses a label. Blank input means [`DateRange::All`].
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let range = match label.trim().to_ascii_lowercase().as_str() {
            "" | "all" => DateRange::All,
            "24h" => DateRange::Last24Hours,
            "7d" => DateRange::Last7Days,
            "30d" => DateRange::Last30Days,
            "60d" => DateRange::Last60Days,
            "90d" => DateRange::Last90Days,
            "180d" => DateRange::Last180Days,
            "365d" => DateRange::Last365Days,
            _ => return Err(DateRangeError(label.to_string())),
        };
        Ok(range)
    }
}

impl DateRange {
    /// Returns the inclusive lower bound relative to `now`, or `None` for [`DateRange::All`].
    pub fn start_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let span = match self {
            DateRange::All => return None,
            DateRange::Last24Hours => Duration::hours(24),
            DateRange::Last7Days => Duration::days(7),
            DateRange::Last30Days => Duration::days(30),
            DateRange::Last60Days => Duration::days(60),
            DateRange::Last90Days => Duration::days(90),
            DateRange::Last180Days => Duration::days(180),
            DateRange::Last365Days => Duration::days(365),
        };
        Some(now - span)
    }
}

/// Returns `[start of month, start of next month)` in UTC for the month containing `now`.
pub fn month_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let (year, month) = (now.year(), now.month());
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    (month_start(year, month), month_start(next_year, next_month))
}

fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
