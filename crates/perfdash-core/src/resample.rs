//! Conversion of a series recorded at one granularity into another.
//!
//! Coarse values are repeated across the finer periods they cover; they are
//! never interpolated or divided. Every function here is pure and total: an
//! empty or short source degrades to zero padding instead of failing.

use chrono::NaiveDate;

use crate::period::PeriodKind;
use crate::range::DateRange;
use crate::window::WINDOW_POINTS;

/// Repeats each source value once for every target period that starts inside
/// the source period it was recorded for.
///
/// The first source value belongs to the source period containing `range_start`,
/// each following value to the next source period. No padding or truncation
/// is applied.
#[must_use]
pub fn expand_periods(
    source: &[i64],
    range_start: NaiveDate,
    source_period: PeriodKind,
    target_period: PeriodKind,
) -> Vec<i64> {
    let origin = source_period.normalize_start(range_start);
    let mut expanded = Vec::with_capacity(source.len());

    for (i, &value) in source.iter().enumerate() {
        let index = i64::try_from(i).unwrap_or(i64::MAX);
        let period_start = source_period.add_periods(origin, index);
        let period_end = source_period.add_periods(origin, index.saturating_add(1));

        let mut cursor = target_period.normalize_start(period_start);
        if cursor < period_start {
            cursor = target_period.add_periods(cursor, 1);
        }
        while cursor < period_end {
            expanded.push(value);
            cursor = target_period.add_periods(cursor, 1);
        }
    }

    expanded
}

/// Expands `source` from `source_period` to `target_period` and shapes the
/// result for display.
///
/// Custom targets yield exactly one value per day of `[range_start, range_end]`.
/// Every other target yields exactly [`WINDOW_POINTS`] values, the most recent
/// ones, right aligned with leading zeros when fewer were produced.
#[must_use]
pub fn expand(
    source: &[i64],
    range_start: NaiveDate,
    range_end: NaiveDate,
    source_period: PeriodKind,
    target_period: PeriodKind,
) -> Vec<i64> {
    let mut values = expand_periods(source, range_start, source_period, target_period);
    let needed = target_period.count_periods(range_start, range_end);

    if target_period.is_custom() {
        // The walk starts at the source period floor, not at range_start.
        let origin = source_period.normalize_start(range_start);
        let offset = usize::try_from((range_start - origin).num_days()).unwrap_or(0);
        values.drain(..offset.min(values.len()));
        pad_with_last(&mut values, needed);
        values.truncate(needed);
        values
    } else {
        pad_with_last(&mut values, needed);
        fit_window(values)
    }
}

/// Shapes an already aligned series: non-custom targets are resized to
/// [`WINDOW_POINTS`] (truncated or zero padded at the tail), custom targets
/// pass through unchanged.
#[must_use]
pub fn normalize_length(mut series: Vec<i64>, target_period: PeriodKind) -> Vec<i64> {
    if !target_period.is_custom() {
        series.resize(WINDOW_POINTS, 0);
    }
    series
}

/// Converts a series fetched for `window` at `source_period` (or at the display
/// granularity when that is coarser) into the display series.
///
/// Expansion runs only when the source is strictly coarser than the display
/// period; otherwise the fetched series is length normalized.
#[must_use]
pub fn resample(
    raw: Vec<i64>,
    window: DateRange,
    source_period: PeriodKind,
    display_period: PeriodKind,
) -> Vec<i64> {
    if source_period.is_coarser_than(display_period) {
        expand(&raw, window.start(), window.end(), source_period, display_period)
    } else {
        normalize_length(raw, display_period)
    }
}

fn pad_with_last(values: &mut Vec<i64>, needed: usize) {
    if values.len() < needed {
        let last = values.last().copied().unwrap_or(0);
        values.resize(needed, last);
    }
}

fn fit_window(values: Vec<i64>) -> Vec<i64> {
    if values.len() >= WINDOW_POINTS {
        values[values.len() - WINDOW_POINTS..].to_vec()
    } else {
        let mut fitted = vec![0; WINDOW_POINTS - values.len()];
        fitted.extend(values);
        fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::lookback_window;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_to_custom_days() {
        let out = expand(
            &[10, 20, 30],
            ymd(2025, 1, 1),
            ymd(2025, 3, 31),
            PeriodKind::Month,
            PeriodKind::Custom,
        );
        assert_eq!(out.len(), 90);
        assert!(out[..31].iter().all(|&v| v == 10));
        assert!(out[31..59].iter().all(|&v| v == 20));
        assert!(out[59..].iter().all(|&v| v == 30));
    }

    #[test]
    fn test_month_to_days_in_leap_year() {
        let raw = expand_periods(&[10, 20, 30], ymd(2024, 1, 1), PeriodKind::Month, PeriodKind::Day);
        assert_eq!(raw.len(), 91);
        assert_eq!(raw.iter().filter(|&&v| v == 20).count(), 29);
    }

    #[test]
    fn test_month_to_day_keeps_last_twelve() {
        let out = expand(
            &[10, 20, 30],
            ymd(2025, 1, 1),
            ymd(2025, 3, 31),
            PeriodKind::Month,
            PeriodKind::Day,
        );
        assert_eq!(out, vec![30; 12]);
    }

    #[test]
    fn test_custom_drops_leading_offset() {
        // Range starts mid-month; the walk starts at the month floor.
        let out = expand(
            &[1, 2],
            ymd(2025, 1, 30),
            ymd(2025, 2, 2),
            PeriodKind::Month,
            PeriodKind::Custom,
        );
        assert_eq!(out, vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_week_source_drops_days_before_mid_week_start() {
        // 2024-08-14 is a Wednesday; the walk starts on Monday the 12th.
        let out = expand(
            &[1, 2],
            ymd(2024, 8, 14),
            ymd(2024, 8, 20),
            PeriodKind::Week,
            PeriodKind::Custom,
        );
        assert_eq!(out, vec![1, 1, 1, 1, 1, 2, 2]);
    }

    #[test]
    fn test_year_source_straddling_new_year() {
        let out = expand(
            &[5, 6],
            ymd(2023, 12, 30),
            ymd(2024, 1, 2),
            PeriodKind::Year,
            PeriodKind::Custom,
        );
        assert_eq!(out, vec![5, 5, 6, 6]);
    }

    #[test]
    fn test_custom_pads_with_last_value() {
        let out = expand(
            &[7],
            ymd(2025, 1, 30),
            ymd(2025, 2, 3),
            PeriodKind::Month,
            PeriodKind::Custom,
        );
        assert_eq!(out, vec![7, 7, 7, 7, 7]);
    }

    #[test]
    fn test_quarter_to_month_right_aligns() {
        let out = expand(
            &[5, 6],
            ymd(2024, 1, 1),
            ymd(2024, 6, 30),
            PeriodKind::Quarter,
            PeriodKind::Month,
        );
        assert_eq!(out, vec![0, 0, 0, 0, 0, 0, 5, 5, 5, 6, 6, 6]);
    }

    #[test]
    fn test_short_source_is_padded_before_alignment() {
        // Twelve months wanted, only the first quarter was recorded.
        let out = expand(
            &[4],
            ymd(2024, 1, 1),
            ymd(2024, 12, 31),
            PeriodKind::Quarter,
            PeriodKind::Month,
        );
        assert_eq!(out, vec![4; 12]);
    }

    #[test]
    fn test_month_to_week_assigns_straddling_weeks_to_start_month() {
        // 2024-07-01 is a Monday, 2024-08-01 a Thursday.
        let raw = expand_periods(&[1, 2], ymd(2024, 7, 1), PeriodKind::Month, PeriodKind::Week);
        // July has Mondays 1, 8, 15, 22, 29; August has 5, 12, 19, 26.
        assert_eq!(raw, vec![1, 1, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn test_empty_source_yields_zeros() {
        let fixed = expand(&[], ymd(2024, 1, 1), ymd(2024, 12, 31), PeriodKind::Year, PeriodKind::Month);
        assert_eq!(fixed, vec![0; WINDOW_POINTS]);

        let custom = expand(&[], ymd(2024, 1, 1), ymd(2024, 1, 10), PeriodKind::Month, PeriodKind::Custom);
        assert_eq!(custom, vec![0; 10]);
    }

    #[test]
    fn test_normalize_length() {
        assert_eq!(normalize_length(vec![1, 2, 3], PeriodKind::Month).len(), WINDOW_POINTS);
        assert_eq!(normalize_length(vec![1, 2, 3], PeriodKind::Month)[..3], [1, 2, 3]);
        assert_eq!(normalize_length((0..20).collect(), PeriodKind::Week), (0..12).collect::<Vec<_>>());
        assert_eq!(normalize_length(vec![1, 2, 3], PeriodKind::Custom), vec![1, 2, 3]);
    }

    #[test]
    fn test_resample_skips_expansion_for_finer_source() {
        let window = lookback_window(ymd(2024, 12, 31), PeriodKind::Month);
        let out = resample(vec![9; 14], window, PeriodKind::Week, PeriodKind::Month);
        assert_eq!(out, vec![9; 12]);
    }

    #[test]
    fn test_month_to_custom_repeats_coarse_values() {
        let months: Vec<i64> = (1..=12).map(|m| m * 10).collect();
        let window = lookback_window(ymd(2024, 12, 31), PeriodKind::Month);
        let daily = expand(&months, window.start(), window.end(), PeriodKind::Month, PeriodKind::Custom);
        assert_eq!(daily.len(), 366);

        let resampled: Vec<i64> = (0..12)
            .map(|i| {
                let month_start = PeriodKind::Month.add_periods(window.start(), i);
                let index = (month_start - window.start()).num_days();
                daily[usize::try_from(index).unwrap()]
            })
            .collect();
        assert_eq!(resampled, months);
    }

    proptest! {
        #[test]
        fn prop_same_period_expand_is_identity(
            values in prop::collection::vec(-1000i64..1000, 12),
            period in prop::sample::select(vec![
                PeriodKind::Day,
                PeriodKind::Week,
                PeriodKind::Month,
                PeriodKind::Quarter,
                PeriodKind::Year,
            ]),
            year in 2000i32..2050,
            month in 1u32..=12,
        ) {
            let window = lookback_window(ymd(year, month, 1), period);
            let out = expand(&values, window.start(), window.end(), period, period);
            prop_assert_eq!(out, values);
        }

        #[test]
        fn prop_expand_has_display_length(
            values in prop::collection::vec(0i64..100, 0..20),
            days in 1i64..200,
        ) {
            let start = ymd(2024, 3, 14);
            let end = start + chrono::Duration::days(days - 1);
            let custom = expand(&values, start, end, PeriodKind::Quarter, PeriodKind::Custom);
            prop_assert_eq!(custom.len(), usize::try_from(days).unwrap());
            let fixed = expand(&values, start, end, PeriodKind::Quarter, PeriodKind::Week);
            prop_assert_eq!(fixed.len(), WINDOW_POINTS);
        }
    }
}
