//! Request entry points: metric previews and the cached company dashboard.

use crate::aggregator::{BulkAggregator, MetricPreview, OwnerPreview, cancellable};
use crate::config::DashboardConfig;
use crate::rollup::{
    DepartmentScore, EmployeeScore, company_average, department_averages, key_indicator_average,
    leaderboards, root_average, root_departments,
};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use perfdash_core::{
    CompanyId, DateRange, EntityDirectory, MetricDescriptor, MetricId, Owner, PeriodKind, Result,
    ResultCache, ResultCacheExt, TimeSeriesStore, UserId, dashboard_cache_key,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Company dashboard as cached and returned by [`DashboardService::dashboard`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardResult {
    /// Company the dashboard belongs to.
    pub company_id: CompanyId,
    /// Requested range.
    pub range: DateRange,
    /// Requested display period.
    pub period: PeriodKind,
    /// Mean completion of employees that own metrics.
    pub company_average: f64,
    /// Mean completion of the company's key indicators.
    pub key_indicator_average: f64,
    /// Highest completions first.
    pub best_employees: Vec<EmployeeScore>,
    /// Lowest completions first.
    pub worst_employees: Vec<EmployeeScore>,
    /// Every department that has members.
    pub departments: Vec<DepartmentScore>,
    /// Top-level departments with their rolled up averages.
    pub root_departments: Vec<DepartmentScore>,
    /// When the dashboard was computed.
    pub generated_at: DateTime<Utc>,
}

/// Entry point for all dashboard requests.
///
/// Every request owns its calculations: nothing computed for one call is
/// reused by another, except whole dashboards kept in the optional result
/// cache.
///
/// # Example
///
/// ```rust,ignore
/// use perfdash::{DashboardService, DateRange, InMemoryResultCache, PeriodKind};
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// let service = DashboardService::new(directory, store)
///     .with_cache(Arc::new(InMemoryResultCache::new()));
///
/// let range = DateRange::new(from, to)?;
/// let dashboard = service
///     .dashboard(&company, range, PeriodKind::Month, &CancellationToken::new())
///     .await?;
/// println!("{}", dashboard.company_average);
/// ```
#[derive(Debug)]
pub struct DashboardService {
    directory: Arc<dyn EntityDirectory>,
    cache: Option<Arc<dyn ResultCache>>,
    config: DashboardConfig,
    aggregator: BulkAggregator,
    store: Arc<dyn TimeSeriesStore>,
}

impl DashboardService {
    /// Create a service with the default configuration and no result cache.
    #[must_use]
    pub fn new(directory: Arc<dyn EntityDirectory>, store: Arc<dyn TimeSeriesStore>) -> Self {
        let config = DashboardConfig::default();
        Self {
            directory,
            cache: None,
            aggregator: BulkAggregator::new(Arc::clone(&store), config.max_concurrency),
            config,
            store,
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: DashboardConfig) -> Self {
        self.aggregator = BulkAggregator::new(Arc::clone(&self.store), config.max_concurrency);
        self.config = config;
        self
    }

    /// Caches computed dashboards in `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Preview of a single metric.
    ///
    /// Returns `Ok(None)` when the metric id is unknown.
    ///
    /// # Errors
    /// Propagates directory and store failures and cancellation.
    #[instrument(skip(self, cancel), fields(owner = %owner, metric = %metric))]
    pub async fn metric_preview(
        &self,
        owner: &Owner,
        metric: &MetricId,
        range: DateRange,
        period: PeriodKind,
        cancel: &CancellationToken,
    ) -> Result<Option<MetricPreview>> {
        let Some(descriptor) = cancellable(cancel, self.directory.metric(metric)).await? else {
            warn!("Unknown metric, skipping");
            return Ok(None);
        };

        let pairs = [(owner.clone(), descriptor)];
        let previews = self.aggregator.aggregate(&pairs, range, period, cancel).await?;
        Ok(previews
            .into_iter()
            .next()
            .and_then(|preview| preview.items.into_iter().next()))
    }

    /// Previews of every metric assigned to each of `users`.
    ///
    /// Unknown users and unknown metric ids are skipped. Users without any
    /// known metric are omitted from the result.
    ///
    /// # Errors
    /// Propagates directory and store failures and cancellation.
    #[instrument(skip(self, users, cancel), fields(users = users.len(), range = %range))]
    pub async fn user_previews(
        &self,
        users: &[UserId],
        range: DateRange,
        period: PeriodKind,
        cancel: &CancellationToken,
    ) -> Result<Vec<OwnerPreview>> {
        let lookups = try_join_all(users.iter().map(|id| self.directory.employee(id)));
        let employees = cancellable(cancel, lookups).await?;

        let mut owners = Vec::with_capacity(users.len());
        for (id, employee) in users.iter().zip(employees) {
            match employee {
                Some(employee) => owners.push((employee.company_id, Owner::User(employee.id))),
                None => warn!(user = %id, "Unknown user, skipping"),
            }
        }

        let pairs = self.assigned_pairs(&owners, cancel).await?;
        self.aggregator.aggregate(&pairs, range, period, cancel).await
    }

    /// Previews of the metrics owned by `company` itself.
    ///
    /// Returns `Ok(None)` when the company has no known metric.
    ///
    /// # Errors
    /// Propagates directory and store failures and cancellation.
    #[instrument(skip(self, cancel), fields(company = %company, range = %range))]
    pub async fn company_metrics(
        &self,
        company: &CompanyId,
        range: DateRange,
        period: PeriodKind,
        cancel: &CancellationToken,
    ) -> Result<Option<OwnerPreview>> {
        let owners = [(company.clone(), Owner::Company)];
        let pairs = self.assigned_pairs(&owners, cancel).await?;
        let previews = self.aggregator.aggregate(&pairs, range, period, cancel).await?;
        Ok(previews.into_iter().next())
    }

    /// Full company rollup, served from the result cache when possible.
    ///
    /// Cache failures are logged and treated as misses.
    ///
    /// # Errors
    /// Propagates directory and store failures and cancellation.
    #[instrument(skip(self, cancel), fields(company = %company, range = %range, period = %period))]
    pub async fn dashboard(
        &self,
        company: &CompanyId,
        range: DateRange,
        period: PeriodKind,
        cancel: &CancellationToken,
    ) -> Result<DashboardResult> {
        let key = dashboard_cache_key(company, &range, period);

        if let Some(cache) = &self.cache {
            let cached: Result<Option<DashboardResult>> = cache.get_json(&key).await;
            match cached {
                Ok(Some(result)) => {
                    debug!(%key, "Dashboard served from cache");
                    return Ok(result);
                }
                Ok(None) => debug!(%key, "Dashboard cache miss"),
                Err(error) => warn!(%key, %error, "Dashboard cache read failed"),
            }
        }

        let result = self.compute_dashboard(company, range, period, cancel).await?;

        if let Some(cache) = &self.cache {
            if let Err(error) = cache.set_json(&key, &result, self.config.cache_ttl()).await {
                warn!(%key, %error, "Dashboard cache write failed");
            }
        }

        Ok(result)
    }

    /// Drops the cached dashboard of `company` for `range` and `period`.
    ///
    /// Returns whether an entry was removed; always `false` without a cache.
    ///
    /// # Errors
    /// Propagates cache failures.
    #[instrument(skip(self), fields(company = %company))]
    pub async fn invalidate_dashboard(
        &self,
        company: &CompanyId,
        range: DateRange,
        period: PeriodKind,
    ) -> Result<bool> {
        match &self.cache {
            Some(cache) => cache.remove(&dashboard_cache_key(company, &range, period)).await,
            None => Ok(false),
        }
    }

    async fn compute_dashboard(
        &self,
        company: &CompanyId,
        range: DateRange,
        period: PeriodKind,
        cancel: &CancellationToken,
    ) -> Result<DashboardResult> {
        let lookups = async {
            futures::try_join!(
                self.directory.employees(company),
                self.directory.departments(company),
                self.directory.hierarchy(company),
                self.directory.department_members(company),
                self.directory.indicators(company),
            )
        };
        let (employees, departments, edges, members, indicators) =
            cancellable(cancel, lookups).await?;

        let owners: Vec<(CompanyId, Owner)> = employees
            .iter()
            .map(|e| (company.clone(), Owner::User(e.id.clone())))
            .collect();
        let mut pairs = self.assigned_pairs(&owners, cancel).await?;
        let key_indicators: Vec<&MetricDescriptor> = indicators
            .iter()
            .filter(|indicator| indicator.key)
            .map(|indicator| &indicator.descriptor)
            .collect();
        pairs.extend(
            key_indicators
                .iter()
                .map(|descriptor| (Owner::Company, (*descriptor).clone())),
        );

        let previews = self.aggregator.aggregate(&pairs, range, period, cancel).await?;
        let mut by_owner: HashMap<Owner, OwnerPreview> = previews
            .into_iter()
            .map(|preview| (preview.owner.clone(), preview))
            .collect();

        let key_indicator_average = key_indicator_average(
            by_owner
                .remove(&Owner::Company)
                .iter()
                .flat_map(|preview| &preview.items)
                .filter(|item| key_indicators.iter().any(|d| d.id == item.metric_id))
                .map(|item| item.calculation.as_ref()),
        );

        let scores: Vec<EmployeeScore> = employees
            .iter()
            .map(|employee| {
                let preview = by_owner.get(&Owner::User(employee.id.clone()));
                EmployeeScore {
                    user_id: employee.id.clone(),
                    name: employee.name.clone(),
                    completion_percent: preview.map_or(0.0, OwnerPreview::completion_percent),
                    metric_count: preview.map_or(0, |p| p.items.len()),
                }
            })
            .collect();
        let completions: HashMap<UserId, f64> = scores
            .iter()
            .map(|score| (score.user_id.clone(), score.completion_percent))
            .collect();

        let member_stats = department_averages(&members, &completions);
        let averages: HashMap<_, _> = member_stats
            .iter()
            .map(|(id, (average, _))| (id.clone(), *average))
            .collect();

        let department_scores: Vec<DepartmentScore> = departments
            .iter()
            .filter_map(|dept| {
                member_stats.get(&dept.id).map(|&(average, member_count)| DepartmentScore {
                    department_id: dept.id.clone(),
                    name: dept.name.clone(),
                    average,
                    member_count,
                })
            })
            .collect();
        let root_scores: Vec<DepartmentScore> = root_departments(&departments, &edges)
            .into_iter()
            .map(|root| DepartmentScore {
                department_id: root.id.clone(),
                name: root.name.clone(),
                average: root_average(&root.id, &edges, &averages),
                member_count: member_stats.get(&root.id).map_or(0, |&(_, count)| count),
            })
            .collect();

        let (best_employees, worst_employees) = leaderboards(&scores, self.config.leaderboard_size);
        let result = DashboardResult {
            company_id: company.clone(),
            range,
            period,
            company_average: company_average(&scores),
            key_indicator_average,
            best_employees,
            worst_employees,
            departments: department_scores,
            root_departments: root_scores,
            generated_at: Utc::now(),
        };

        debug!(
            employees = scores.len(),
            departments = result.departments.len(),
            company_average = result.company_average,
            "Computed dashboard"
        );
        Ok(result)
    }

    /// Resolves the metric assignments of `owners` into descriptors.
    ///
    /// Each distinct metric id is looked up once; unknown ids are skipped.
    async fn assigned_pairs(
        &self,
        owners: &[(CompanyId, Owner)],
        cancel: &CancellationToken,
    ) -> Result<Vec<(Owner, MetricDescriptor)>> {
        let lookups = try_join_all(
            owners
                .iter()
                .map(|(company, owner)| self.directory.metric_assignments(company, owner)),
        );
        let assignments = cancellable(cancel, lookups).await?;

        let mut distinct: Vec<&MetricId> = Vec::new();
        for id in assignments.iter().flatten() {
            if !distinct.contains(&id) {
                distinct.push(id);
            }
        }
        let lookups = try_join_all(distinct.iter().map(|id| self.directory.metric(id)));
        let descriptors: HashMap<&MetricId, MetricDescriptor> = distinct
            .iter()
            .copied()
            .zip(cancellable(cancel, lookups).await?)
            .filter_map(|(id, descriptor)| {
                if descriptor.is_none() {
                    warn!(metric = %id, "Unknown metric, skipping");
                }
                descriptor.map(|d| (id, d))
            })
            .collect();

        let pairs: Vec<(Owner, MetricDescriptor)> = owners
            .iter()
            .zip(&assignments)
            .flat_map(|((_, owner), ids)| {
                ids.iter()
                    .filter_map(|id| descriptors.get(id))
                    .map(move |descriptor| (owner.clone(), descriptor.clone()))
            })
            .collect();
        debug!(owners = owners.len(), pairs = pairs.len(), "Resolved metric assignments");
        Ok(pairs)
    }
}
