//! Bounded fan-out of metric calculations.

use crate::calculation::{CalculationMemo, MetricCalculation, MetricCalculator};
use perfdash_core::{
    DashboardError, DateRange, MetricDescriptor, MetricId, Owner, PeriodKind, Result,
    TimeSeriesStore, display_window,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// One metric of an owner, ready for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricPreview {
    /// Metric id.
    pub metric_id: MetricId,
    /// Metric display name.
    pub name: String,
    /// Shared calculation of the metric.
    pub calculation: Arc<MetricCalculation>,
    /// Completion percent of the calculation.
    pub completion_percent: f64,
}

impl MetricPreview {
    fn new(descriptor: &MetricDescriptor, calculation: Arc<MetricCalculation>) -> Self {
        Self {
            metric_id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            completion_percent: calculation.completion_percent(),
            calculation,
        }
    }
}

/// All previews of one owner, in request order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OwnerPreview {
    /// Owner of the metrics.
    pub owner: Owner,
    /// Metric previews.
    pub items: Vec<MetricPreview>,
}

impl OwnerPreview {
    /// Mean completion percent of the items, 0 with no items.
    #[must_use]
    pub fn completion_percent(&self) -> f64 {
        crate::rollup::employee_completion(&self.items)
    }
}

/// Runs one calculation per distinct metric with bounded concurrency and
/// assembles the results per owner.
#[derive(Clone, Debug)]
pub struct BulkAggregator {
    calculator: MetricCalculator,
    max_concurrency: usize,
}

impl BulkAggregator {
    /// Create an aggregator over `store` running at most `max_concurrency`
    /// calculations at once. A width of 0 is raised to 1.
    #[must_use]
    pub fn new(store: Arc<dyn TimeSeriesStore>, max_concurrency: usize) -> Self {
        Self {
            calculator: MetricCalculator::new(store),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Fan-out width.
    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Calculates every distinct metric of `pairs` once and groups the
    /// previews by owner, in first-appearance order.
    ///
    /// Duplicate `(owner, metric)` pairs yield a single item.
    ///
    /// # Errors
    /// Fails with the first calculation error, with [`DashboardError::Cancelled`]
    /// once `cancel` fires, or with [`DashboardError::Task`] when a task panics.
    /// Remaining calculations are aborted in every case.
    #[instrument(
        skip(self, pairs, cancel),
        fields(pairs = pairs.len(), range = %range, period = %period)
    )]
    pub async fn aggregate(
        &self,
        pairs: &[(Owner, MetricDescriptor)],
        range: DateRange,
        period: PeriodKind,
        cancel: &CancellationToken,
    ) -> Result<Vec<OwnerPreview>> {
        if cancel.is_cancelled() {
            return Err(DashboardError::Cancelled);
        }

        let memo = self.calculate_all(pairs, range, period, cancel).await?;

        let mut order: Vec<Owner> = Vec::new();
        let mut grouped: HashMap<Owner, Vec<MetricPreview>> = HashMap::new();
        for (owner, descriptor) in pairs {
            let Some(calculation) = memo.get(&descriptor.id) else {
                continue;
            };
            let items = grouped.entry(owner.clone()).or_insert_with(|| {
                order.push(owner.clone());
                Vec::new()
            });
            if items.iter().all(|item| item.metric_id != descriptor.id) {
                items.push(MetricPreview::new(descriptor, calculation));
            }
        }

        Ok(order
            .into_iter()
            .map(|owner| {
                let items = grouped.remove(&owner).unwrap_or_default();
                OwnerPreview { owner, items }
            })
            .collect())
    }

    async fn calculate_all(
        &self,
        pairs: &[(Owner, MetricDescriptor)],
        range: DateRange,
        period: PeriodKind,
        cancel: &CancellationToken,
    ) -> Result<Arc<CalculationMemo>> {
        let mut seen = HashSet::new();
        let mut windows: HashMap<PeriodKind, DateRange> = HashMap::new();
        let mut jobs = Vec::new();
        for (_, descriptor) in pairs {
            if !seen.insert(&descriptor.id) {
                continue;
            }
            let expected = descriptor.expected_period(period);
            let window = *windows
                .entry(expected)
                .or_insert_with(|| display_window(range, period, expected));
            jobs.push((descriptor.clone(), window));
        }
        debug!(
            metrics = jobs.len(),
            groups = windows.len(),
            width = self.max_concurrency,
            "Starting fan-out"
        );

        let memo = Arc::new(CalculationMemo::new());
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (descriptor, window) in jobs {
            let calculator = self.calculator.clone();
            let memo = Arc::clone(&memo);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| DashboardError::Task(e.to_string()))?;
                let calculation = cancellable(
                    &cancel,
                    calculator.calculate(&descriptor, window, range, period),
                )
                .await?;
                memo.insert(calculation);
                Ok::<_, DashboardError>(())
            });
        }

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tasks.abort_all();
                    debug!("Fan-out cancelled");
                    return Err(DashboardError::Cancelled);
                }
                next = tasks.join_next() => next,
            };

            match next {
                None => break,
                Some(Ok(Ok(()))) => {}
                Some(Ok(Err(error))) => {
                    tasks.abort_all();
                    warn!(%error, "Metric calculation failed, aborting batch");
                    return Err(error);
                }
                Some(Err(join_error)) => {
                    tasks.abort_all();
                    warn!(%join_error, "Metric task did not complete, aborting batch");
                    return Err(DashboardError::Task(join_error.to_string()));
                }
            }
        }

        Ok(memo)
    }
}

/// Runs `future` unless `cancel` fires first.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(DashboardError::Cancelled),
        result = future => result,
    }
}
