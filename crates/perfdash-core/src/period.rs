//! Period kinds and the calendar arithmetic shared by reads and writes.
//!
//! [`PeriodKind`] names the granularity a series is recorded or displayed at.
//! The functions here are the single source of truth for flooring a date to
//! its period, stepping whole periods and counting the periods a range spans.
//! Time-series writers normalize sample dates with the same functions the
//! resampler uses to walk them back.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// Recording or display granularity of a time series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// One sample per calendar day.
    Day,
    /// One sample per ISO week (Monday based).
    Week,
    /// One sample per calendar month.
    #[default]
    Month,
    /// One sample per 3-month-aligned quarter.
    Quarter,
    /// One sample per calendar year.
    Year,
    /// Caller supplied range, stepped day by day.
    Custom,
}

impl PeriodKind {
    /// All period kinds, finest first.
    pub const ALL: [Self; 6] = [
        Self::Day,
        Self::Custom,
        Self::Week,
        Self::Month,
        Self::Quarter,
        Self::Year,
    ];

    /// Granularity rank. Custom has no fixed granularity and ranks with Day.
    #[must_use]
    pub const fn order(self) -> i32 {
        match self {
            Self::Day | Self::Custom => 0,
            Self::Week => 1,
            Self::Month => 2,
            Self::Quarter => 3,
            Self::Year => 4,
        }
    }

    /// Signed granularity difference; only the sign is meaningful.
    ///
    /// Positive when `self` is coarser than `other`.
    #[must_use]
    pub const fn compare(self, other: Self) -> i32 {
        self.order() - other.order()
    }

    /// Returns true if `self` is strictly coarser than `other`.
    #[must_use]
    pub const fn is_coarser_than(self, other: Self) -> bool {
        self.compare(other) > 0
    }

    /// Returns `self` when it is strictly coarser than `other`, else `other`.
    #[must_use]
    pub const fn coarser(self, other: Self) -> Self {
        if self.is_coarser_than(other) { self } else { other }
    }

    /// Returns true for the caller-defined range granularity.
    #[must_use]
    pub const fn is_custom(self) -> bool {
        matches!(self, Self::Custom)
    }

    /// Lowercase name used in keys and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
            Self::Custom => "custom",
        }
    }

    /// Floors `date` to the first day of its containing period.
    #[must_use]
    pub fn normalize_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day | Self::Custom => date,
            Self::Week => date
                .checked_sub_signed(Duration::days(i64::from(date.weekday().num_days_from_monday())))
                .unwrap_or(NaiveDate::MIN),
            Self::Month => first_of_month(date.year(), date.month()),
            Self::Quarter => first_of_month(date.year(), (date.month() - 1) / 3 * 3 + 1),
            Self::Year => first_of_month(date.year(), 1),
        }
    }

    /// Advances `date` by `n` whole periods (negative `n` steps backwards).
    ///
    /// Month based steps clamp the day to the end of the target month.
    /// Results saturate at the calendar bounds instead of overflowing.
    #[must_use]
    pub fn add_periods(self, date: NaiveDate, n: i64) -> NaiveDate {
        let stepped = match self {
            Self::Day | Self::Custom => Duration::try_days(n).and_then(|d| date.checked_add_signed(d)),
            Self::Week => n
                .checked_mul(7)
                .and_then(Duration::try_days)
                .and_then(|d| date.checked_add_signed(d)),
            Self::Month => add_months(date, Some(n)),
            Self::Quarter => add_months(date, n.checked_mul(3)),
            Self::Year => add_months(date, n.checked_mul(12)),
        };
        stepped.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
    }

    /// Last day of the period containing `date`.
    #[must_use]
    pub fn end_of_period(self, date: NaiveDate) -> NaiveDate {
        let next = self.add_periods(self.normalize_start(date), 1);
        next.pred_opt().unwrap_or(next)
    }

    /// Number of period instances spanned by `[from, to]`, both ends inclusive.
    ///
    /// Returns 0 when `to` precedes `from`.
    #[must_use]
    pub fn count_periods(self, from: NaiveDate, to: NaiveDate) -> usize {
        if to < from {
            return 0;
        }
        let from = self.normalize_start(from);
        let to = self.normalize_start(to);
        let months =
            i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month());
        let count = match self {
            Self::Day | Self::Custom => (to - from).num_days() + 1,
            Self::Week => (to - from).num_days() / 7 + 1,
            Self::Month => months + 1,
            Self::Quarter => months / 3 + 1,
            Self::Year => i64::from(to.year() - from.year()) + 1,
        };
        usize::try_from(count).unwrap_or(0)
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Self::Day),
            "w" | "week" | "weekly" => Ok(Self::Week),
            "m" | "month" | "monthly" => Ok(Self::Month),
            "q" | "quarter" | "quarterly" => Ok(Self::Quarter),
            "y" | "year" | "yearly" | "annual" => Ok(Self::Year),
            "custom" => Ok(Self::Custom),
            other => Err(DashboardError::InvalidParameter(format!(
                "unrecognized period: {other}"
            ))),
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn add_months(date: NaiveDate, months: Option<i64>) -> Option<NaiveDate> {
    let months = months?;
    let magnitude = u32::try_from(months.unsigned_abs()).ok()?;
    if months >= 0 {
        date.checked_add_months(Months::new(magnitude))
    } else {
        date.checked_sub_months(Months::new(magnitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_order_table() {
        assert_eq!(PeriodKind::Day.order(), 0);
        assert_eq!(PeriodKind::Custom.order(), 0);
        assert_eq!(PeriodKind::Week.order(), 1);
        assert_eq!(PeriodKind::Month.order(), 2);
        assert_eq!(PeriodKind::Quarter.order(), 3);
        assert_eq!(PeriodKind::Year.order(), 4);
    }

    #[test]
    fn test_compare_is_antisymmetric_and_transitive() {
        for a in PeriodKind::ALL {
            for b in PeriodKind::ALL {
                assert_eq!(a.compare(b).signum(), -b.compare(a).signum());
                for c in PeriodKind::ALL {
                    if a.compare(b) > 0 && b.compare(c) > 0 {
                        assert!(a.compare(c) > 0, "{a} > {b} > {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_coarser() {
        assert_eq!(PeriodKind::Month.coarser(PeriodKind::Week), PeriodKind::Month);
        assert_eq!(PeriodKind::Week.coarser(PeriodKind::Month), PeriodKind::Month);
        assert_eq!(PeriodKind::Day.coarser(PeriodKind::Custom), PeriodKind::Custom);
        assert!(!PeriodKind::Day.is_coarser_than(PeriodKind::Custom));
    }

    #[test]
    fn test_normalize_start() {
        let d = ymd(2024, 8, 15); // Thursday
        assert_eq!(PeriodKind::Day.normalize_start(d), d);
        assert_eq!(PeriodKind::Custom.normalize_start(d), d);
        assert_eq!(PeriodKind::Week.normalize_start(d), ymd(2024, 8, 12));
        assert_eq!(PeriodKind::Week.normalize_start(d).weekday(), Weekday::Mon);
        assert_eq!(PeriodKind::Month.normalize_start(d), ymd(2024, 8, 1));
        assert_eq!(PeriodKind::Quarter.normalize_start(d), ymd(2024, 7, 1));
        assert_eq!(PeriodKind::Year.normalize_start(d), ymd(2024, 1, 1));
    }

    #[test]
    fn test_add_periods() {
        let d = ymd(2024, 1, 31);
        assert_eq!(PeriodKind::Day.add_periods(d, 1), ymd(2024, 2, 1));
        assert_eq!(PeriodKind::Week.add_periods(d, -2), ymd(2024, 1, 17));
        assert_eq!(PeriodKind::Month.add_periods(d, 1), ymd(2024, 2, 29));
        assert_eq!(PeriodKind::Quarter.add_periods(d, -1), ymd(2023, 10, 31));
        assert_eq!(PeriodKind::Year.add_periods(d, 11), ymd(2035, 1, 31));
    }

    #[test]
    fn test_add_periods_saturates() {
        assert_eq!(PeriodKind::Year.add_periods(ymd(2024, 1, 1), i64::MAX), NaiveDate::MAX);
        assert_eq!(PeriodKind::Day.add_periods(ymd(2024, 1, 1), i64::MIN), NaiveDate::MIN);
    }

    #[test]
    fn test_end_of_period() {
        let d = ymd(2024, 2, 10);
        assert_eq!(PeriodKind::Month.end_of_period(d), ymd(2024, 2, 29));
        assert_eq!(PeriodKind::Quarter.end_of_period(d), ymd(2024, 3, 31));
        assert_eq!(PeriodKind::Week.end_of_period(d), ymd(2024, 2, 11));
        assert_eq!(PeriodKind::Year.end_of_period(d), ymd(2024, 12, 31));
    }

    #[test]
    fn test_count_periods() {
        let from = ymd(2024, 1, 15);
        let to = ymd(2024, 12, 2);
        assert_eq!(PeriodKind::Month.count_periods(from, to), 12);
        assert_eq!(PeriodKind::Quarter.count_periods(from, to), 4);
        assert_eq!(PeriodKind::Year.count_periods(from, to), 1);
        assert_eq!(PeriodKind::Day.count_periods(ymd(2025, 1, 1), ymd(2025, 3, 31)), 90);
        assert_eq!(PeriodKind::Week.count_periods(ymd(2024, 8, 12), ymd(2024, 8, 25)), 2);
        assert_eq!(PeriodKind::Month.count_periods(to, from), 0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Month".parse::<PeriodKind>().unwrap(), PeriodKind::Month);
        assert_eq!("q".parse::<PeriodKind>().unwrap(), PeriodKind::Quarter);
        assert_eq!(" custom ".parse::<PeriodKind>().unwrap(), PeriodKind::Custom);
        assert!("fortnight".parse::<PeriodKind>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&PeriodKind::Quarter).unwrap();
        assert_eq!(json, "\"quarter\"");
        let back: PeriodKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PeriodKind::Quarter);
    }

    fn any_period() -> impl Strategy<Value = PeriodKind> {
        prop::sample::select(PeriodKind::ALL.to_vec())
    }

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (1990i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| ymd(y, m, d))
    }

    proptest! {
        #[test]
        fn prop_normalize_start_is_idempotent(p in any_period(), d in any_date()) {
            let once = p.normalize_start(d);
            prop_assert_eq!(p.normalize_start(once), once);
            prop_assert!(once <= d);
        }

        #[test]
        fn prop_count_periods_at_least_one(p in any_period(), a in any_date(), b in any_date()) {
            let (from, to) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(p.count_periods(from, to) >= 1);
        }

        #[test]
        fn prop_step_then_count(p in any_period(), d in any_date(), n in 0i64..40) {
            let start = p.normalize_start(d);
            let end = p.end_of_period(p.add_periods(start, n));
            prop_assert_eq!(p.count_periods(start, end), usize::try_from(n + 1).unwrap());
        }
    }
}
