//! Collaborator traits for time-series data and entity metadata.
//!
//! This module defines the two lookups the engine depends on:
//!
//! - [`TimeSeriesStore`] - Plan/fact samples, read and write
//! - [`EntityDirectory`] - Employees, departments, metrics, indicators and hierarchy

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use crate::{
    error::Result,
    period::PeriodKind,
    range::DateRange,
    types::{
        CompanyId, Department, DepartmentMember, Employee, HierarchyEdge, Indicator,
        MetricDescriptor, MetricId, Owner, SeriesData, UserId, ValueKind,
    },
};

/// Store of plan/fact samples.
///
/// Implementations must keep `fetch` idempotent and free of side effects; the
/// engine fetches concurrently and memoizes results per request.
#[async_trait]
pub trait TimeSeriesStore: Send + Sync + Debug {
    /// Returns the name of this store (for logging).
    fn name(&self) -> &str;

    /// Fetches one plan and one fact sample per `requested` period instance in
    /// `range`, best effort aligned to `source` recording boundaries.
    async fn fetch(
        &self,
        range: DateRange,
        metric: &MetricId,
        requested: PeriodKind,
        source: PeriodKind,
    ) -> Result<SeriesData>;

    /// Upserts a single sample.
    ///
    /// `date` is normalized to the start of its `period` before it is stored.
    async fn put(
        &self,
        metric: &MetricId,
        kind: ValueKind,
        owner: &Owner,
        period: PeriodKind,
        date: NaiveDate,
        value: i64,
    ) -> Result<()>;
}

/// Read access to entity metadata kept in the relational store.
#[async_trait]
pub trait EntityDirectory: Send + Sync + Debug {
    /// Looks up an employee; `Ok(None)` when the id is unknown.
    async fn employee(&self, id: &UserId) -> Result<Option<Employee>>;

    /// All employees of a company.
    async fn employees(&self, company: &CompanyId) -> Result<Vec<Employee>>;

    /// Looks up a metric descriptor; `Ok(None)` when the id is unknown.
    async fn metric(&self, id: &MetricId) -> Result<Option<MetricDescriptor>>;

    /// Metric ids assigned to an owner of the given company.
    async fn metric_assignments(&self, company: &CompanyId, owner: &Owner) -> Result<Vec<MetricId>>;

    /// All departments of a company.
    async fn departments(&self, company: &CompanyId) -> Result<Vec<Department>>;

    /// Closure-table edges of the company's department hierarchy.
    async fn hierarchy(&self, company: &CompanyId) -> Result<Vec<HierarchyEdge>>;

    /// Links between users and departments of the company.
    async fn department_members(&self, company: &CompanyId) -> Result<Vec<DepartmentMember>>;

    /// Indicators defined for the company.
    async fn indicators(&self, company: &CompanyId) -> Result<Vec<Indicator>>;
}
