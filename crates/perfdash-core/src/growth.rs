//! Week-over-week growth series.

use crate::types::{MetricDescriptor, WeekType};

/// Lag used by [`WeekType::Sliding`], and by calendar weeks without a usable offset.
pub const SLIDING_WEEK_LAG: usize = 7;

/// Number of samples between a value and the one it is compared with.
#[must_use]
pub fn growth_lag(descriptor: &MetricDescriptor) -> usize {
    match descriptor.week_type {
        WeekType::Sliding => SLIDING_WEEK_LAG,
        WeekType::Calendar => usize::try_from(descriptor.week_start_offset)
            .ok()
            .filter(|&lag| lag > 0)
            .unwrap_or(SLIDING_WEEK_LAG),
    }
}

/// `growth[i] = fact[i - lag] - fact[i]` for `i >= lag`, `None` before that.
///
/// The result always has the same length as `fact`.
#[must_use]
pub fn growth_series(fact: &[i64], lag: usize) -> Vec<Option<f64>> {
    (0..fact.len())
        .map(|i| {
            i.checked_sub(lag)
                .filter(|_| lag > 0)
                .map(|prev| fact[prev] as f64 - fact[i] as f64)
        })
        .collect()
}
