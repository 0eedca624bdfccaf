#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/perfdash/perfdash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Resampling and rollup engine for performance dashboards.
//!
//! This crate re-exports the core types and collaborator implementations and
//! provides the request-level pieces:
//!
//! - [`MetricCalculator`] - Fetches and resamples one metric
//! - [`BulkAggregator`] - Bounded-concurrency fan-out over many metrics
//! - [`rollup`] - Employee, department and company averages
//! - [`DashboardService`] - Metric previews and the cached company dashboard
//!
//! # Features
//!
//! - `memory-store` - In-memory time-series store and entity directory
//! - `cache-sqlite` - SQLite-based result cache

// Core types and traits
pub use perfdash_core::*;

// Cache implementations
#[cfg(feature = "cache-sqlite")]
pub use perfdash_cache::SqliteResultCache;
pub use perfdash_cache::{InMemoryResultCache, NoopResultCache};

// Reference collaborators
#[cfg(feature = "memory-store")]
pub use perfdash_store::{InMemoryDirectory, InMemoryTimeSeriesStore};

mod aggregator;
mod calculation;
mod config;
mod dashboard;
pub mod rollup;

pub use aggregator::{BulkAggregator, MetricPreview, OwnerPreview};
pub use calculation::{
    CalculationMemo, MetricCalculation, MetricCalculator, YEAR_TOTALS_PERIOD, average,
    completion_percent,
};
pub use config::DashboardConfig;
pub use dashboard::{DashboardResult, DashboardService};
pub use rollup::{DepartmentScore, EmployeeScore};

pub use tokio_util::sync::CancellationToken;
