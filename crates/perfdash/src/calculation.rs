//! Per-metric calculations and their request-scoped memo.

use chrono::Datelike;
use dashmap::DashMap;
use perfdash_core::{
    DateRange, MetricDescriptor, MetricId, PeriodKind, Result, TimeSeriesStore, growth_lag,
    growth_series, resample, year_window,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Period the year totals are displayed at.
pub const YEAR_TOTALS_PERIOD: PeriodKind = PeriodKind::Month;

/// Display-ready series of one metric for one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricCalculation {
    /// Metric the series belong to.
    pub metric_id: MetricId,
    /// Period the plan and fact series are expressed in.
    pub display_period: PeriodKind,
    /// Range the series were fetched for.
    pub window: DateRange,
    /// Planned values, oldest first.
    pub plan: Vec<i64>,
    /// Actual values, oldest first.
    pub fact: Vec<i64>,
    /// Monthly plan values of the calendar year of the request.
    pub year_plan: Vec<i64>,
    /// Monthly fact values of the calendar year of the request.
    pub year_fact: Vec<i64>,
    /// Week-over-week growth of `fact`, present for growth-eligible metrics.
    pub growth: Option<Vec<Option<f64>>>,
}

impl MetricCalculation {
    /// Mean of the plan series.
    #[must_use]
    pub fn plan_average(&self) -> f64 {
        average(&self.plan)
    }

    /// Mean of the fact series.
    #[must_use]
    pub fn fact_average(&self) -> f64 {
        average(&self.fact)
    }

    /// Fact average as a percentage of the plan average.
    #[must_use]
    pub fn completion_percent(&self) -> f64 {
        completion_percent(self.plan_average(), self.fact_average())
    }

    /// Sum of the year plan series, saturating at the `i64` bounds.
    #[must_use]
    pub fn year_plan_total(&self) -> i64 {
        saturating_sum(&self.year_plan)
    }

    /// Sum of the year fact series, saturating at the `i64` bounds.
    #[must_use]
    pub fn year_fact_total(&self) -> i64 {
        saturating_sum(&self.year_fact)
    }
}

fn saturating_sum(values: &[i64]) -> i64 {
    values.iter().fold(0_i64, |total, &v| total.saturating_add(v))
}

/// Arithmetic mean, 0 for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// `fact / plan * 100`, or 0 when nothing was planned.
#[must_use]
pub fn completion_percent(plan_average: f64, fact_average: f64) -> f64 {
    if plan_average == 0.0 {
        0.0
    } else {
        fact_average / plan_average * 100.0
    }
}

/// Fetches and resamples the series of a single metric.
#[derive(Clone, Debug)]
pub struct MetricCalculator {
    store: Arc<dyn TimeSeriesStore>,
}

impl MetricCalculator {
    /// Create a calculator reading from `store`.
    #[must_use]
    pub fn new(store: Arc<dyn TimeSeriesStore>) -> Self {
        Self { store }
    }

    /// Computes the display series of `descriptor`.
    ///
    /// `window` is the fetch range for the metric's expected granularity and
    /// `range` the caller's range, whose last day selects the calendar year
    /// of the year totals.
    ///
    /// # Errors
    /// Propagates store failures.
    #[instrument(
        skip(self, descriptor),
        fields(metric = %descriptor.id, store = self.store.name(), window = %window)
    )]
    pub async fn calculate(
        &self,
        descriptor: &MetricDescriptor,
        window: DateRange,
        range: DateRange,
        period: PeriodKind,
    ) -> Result<MetricCalculation> {
        let source = descriptor.source_period;
        let expected = descriptor.expected_period(period);

        let raw = self.store.fetch(window, &descriptor.id, expected, source).await?;
        let plan = resample(raw.plan, window, source, period);
        let fact = resample(raw.fact, window, source, period);

        let year = year_window(range.end().year());
        let totals = self
            .store
            .fetch(year, &descriptor.id, descriptor.expected_period(YEAR_TOTALS_PERIOD), source)
            .await?;
        let year_plan = resample(totals.plan, year, source, YEAR_TOTALS_PERIOD);
        let year_fact = resample(totals.fact, year, source, YEAR_TOTALS_PERIOD);

        let growth = descriptor
            .wants_growth()
            .then(|| growth_series(&fact, growth_lag(descriptor)));

        debug!(%expected, points = fact.len(), growth = growth.is_some(), "Calculated metric");
        Ok(MetricCalculation {
            metric_id: descriptor.id.clone(),
            display_period: period,
            window,
            plan,
            fact,
            year_plan,
            year_fact,
            growth,
        })
    }
}

/// Calculations of one aggregation call, keyed by metric id.
///
/// Written concurrently by the fan-out tasks and read after they are joined.
#[derive(Debug, Default)]
pub struct CalculationMemo {
    entries: DashMap<MetricId, Arc<MetricCalculation>>,
}

impl CalculationMemo {
    /// Create an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a calculation, replacing any previous one for the same metric.
    pub fn insert(&self, calculation: MetricCalculation) -> Arc<MetricCalculation> {
        let calculation = Arc::new(calculation);
        self.entries
            .insert(calculation.metric_id.clone(), Arc::clone(&calculation));
        calculation
    }

    /// Shared handle to the calculation of `metric`.
    #[must_use]
    pub fn get(&self, metric: &MetricId) -> Option<Arc<MetricCalculation>> {
        self.entries.get(metric).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of memoized metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
