//! Lookback windows for rolling displays.

use chrono::NaiveDate;

use crate::period::PeriodKind;
use crate::range::DateRange;

/// Number of points in a rolling (non-custom) display.
pub const WINDOW_POINTS: usize = 12;

/// Range covering the last `n` instances of `period`, ending with the one
/// that contains `as_of`.
///
/// Custom steps like Day here. `n` of 0 is treated as 1.
#[must_use]
pub fn lookback(as_of: NaiveDate, period: PeriodKind, n: usize) -> DateRange {
    let back = i64::try_from(n.max(1) - 1).unwrap_or(i64::MAX);
    let from = period.normalize_start(period.add_periods(as_of, -back));
    let to = period.end_of_period(as_of);
    DateRange::new(from, to).unwrap_or_else(|_| DateRange::single(as_of))
}

/// Range covering the last [`WINDOW_POINTS`] instances of `period` ending at `as_of`.
#[must_use]
pub fn lookback_window(as_of: NaiveDate, period: PeriodKind) -> DateRange {
    lookback(as_of, period, WINDOW_POINTS)
}

/// Window to fetch for a display request.
///
/// Custom displays use the caller's range verbatim, whatever granularity the
/// series is fetched at. Every other display gets the rolling window of the
/// `expected` fetch granularity ending at the range's last day.
#[must_use]
pub fn display_window(range: DateRange, display: PeriodKind, expected: PeriodKind) -> DateRange {
    if display.is_custom() {
        range
    } else {
        lookback_window(range.end(), expected)
    }
}

/// January 1 through December 31 of `year`.
#[must_use]
pub fn year_window(year: i32) -> DateRange {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
    lookback(jan1, PeriodKind::Year, 1)
}
