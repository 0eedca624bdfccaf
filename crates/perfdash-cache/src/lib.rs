#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/perfdash/perfdash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Result cache implementations for perfdash.
//!
//! This crate provides implementations of the [`ResultCache`] trait from `perfdash-core`:
//!
//! - [`SqliteResultCache`] - Persistent SQLite-based cache (default, requires `sqlite` feature)
//! - [`InMemoryResultCache`] - Simple in-memory cache
//! - [`NoopResultCache`] - No-op cache that doesn't store anything

/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

/// SQLite-based cache implementation.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the traits for convenience
pub use perfdash_core::{ResultCache, ResultCacheExt};

// Re-export implementations
pub use memory::InMemoryResultCache;
pub use noop::NoopResultCache;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteResultCache;
