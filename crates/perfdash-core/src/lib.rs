#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/perfdash/perfdash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for performance dashboards.
//!
//! This crate provides the foundational pieces of the resampling engine:
//!
//! - [`PeriodKind`](period::PeriodKind) - Granularities and the period algebra
//! - [`DateRange`](range::DateRange) - Validated inclusive date ranges
//! - [`lookback_window`](window::lookback_window) - Rolling 12-point windows
//! - [`resample`](resample::resample) - Expansion of coarse series into finer displays
//! - [`growth_series`](growth::growth_series) - Week-over-week growth
//! - [`TimeSeriesStore`](store::TimeSeriesStore) - Plan/fact sample store
//! - [`EntityDirectory`](store::EntityDirectory) - Entity metadata lookups
//! - [`ResultCache`](cache::ResultCache) - Caching abstraction for computed results

/// Cache trait for computed results.
pub mod cache;
/// Error types for dashboard operations.
pub mod error;
/// Week-over-week growth series.
pub mod growth;
/// Period kinds and calendar arithmetic.
pub mod period;
/// Inclusive date ranges.
pub mod range;
/// Series expansion and length normalization.
pub mod resample;
/// Collaborator traits for time-series data and entity metadata.
pub mod store;
/// Core domain types (identifiers, descriptors, organization).
pub mod types;
/// Rolling lookback windows.
pub mod window;

// Re-export commonly used items at crate root
pub use cache::{ResultCache, ResultCacheExt, dashboard_cache_key};
pub use error::{DashboardError, Result};
pub use growth::{growth_lag, growth_series};
pub use period::PeriodKind;
pub use range::DateRange;
pub use resample::{expand, expand_periods, normalize_length, resample};
pub use store::{EntityDirectory, TimeSeriesStore};
pub use types::{
    CompanyId, Department, DepartmentId, DepartmentMember, Employee, HierarchyEdge, Indicator,
    MemberRole, MetricDescriptor, MetricId, Owner, SeriesData, UserId, ValueKind, ValueType,
    WeekType,
};
pub use window::{WINDOW_POINTS, display_window, lookback, lookback_window, year_window};
