#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/perfdash/perfdash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! In-memory collaborators for perfdash.
//!
//! This crate provides implementations of the collaborator traits from
//! `perfdash-core`:
//!
//! - [`InMemoryTimeSeriesStore`] - implements [`TimeSeriesStore`](perfdash_core::TimeSeriesStore)
//! - [`InMemoryDirectory`] - implements [`EntityDirectory`](perfdash_core::EntityDirectory)
//!
//! # Example
//!
//! ```no_run
//! use perfdash_core::{DateRange, MetricId, Owner, PeriodKind, TimeSeriesStore};
//! use perfdash_store::InMemoryTimeSeriesStore;
//! use chrono::NaiveDate;
//!
//! # async fn example() -> perfdash_core::Result<()> {
//! let store = InMemoryTimeSeriesStore::new();
//! let metric = MetricId::new("revenue");
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//!
//! store
//!     .put_series(&metric, &Owner::Company, PeriodKind::Quarter, start, &[100, 120], &[90, 130])
//!     .await?;
//!
//! let range = DateRange::new(start, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())?;
//! let data = store.fetch(range, &metric, PeriodKind::Quarter, PeriodKind::Quarter).await?;
//! assert_eq!(data.fact, vec![90, 130]);
//! # Ok(())
//! # }
//! ```

/// In-memory entity directory.
pub mod directory;
/// In-memory time-series store.
pub mod series;

pub use directory::InMemoryDirectory;
pub use series::InMemoryTimeSeriesStore;
