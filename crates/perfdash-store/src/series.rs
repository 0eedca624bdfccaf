//! In-memory time-series store.

use async_trait::async_trait;
use chrono::NaiveDate;
use perfdash_core::{
    DateRange, MetricId, Owner, PeriodKind, Result, SeriesData, TimeSeriesStore, ValueKind,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, instrument, trace};

/// Key of a stored sample. `date` is already normalized to its period start.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SampleKey {
    metric: MetricId,
    kind: ValueKind,
    owner: Owner,
    date: NaiveDate,
}

/// Plan/fact samples held in memory.
///
/// Writes normalize the sample date to the start of the period it was
/// recorded for and replace any previous value at that slot. Reads sum every
/// owner's samples into one bucket per requested period instance.
#[derive(Debug, Default)]
pub struct InMemoryTimeSeriesStore {
    samples: RwLock<HashMap<SampleKey, i64>>,
    latency: Duration,
    fetches: AtomicU64,
}

impl InMemoryTimeSeriesStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that sleeps for `latency` before serving each fetch.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Number of fetches served so far.
    #[must_use]
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Writes consecutive plan and fact samples, one per `period` starting at
    /// the period containing `start`.
    ///
    /// # Errors
    /// Propagates failures from [`TimeSeriesStore::put`].
    pub async fn put_series(
        &self,
        metric: &MetricId,
        owner: &Owner,
        period: PeriodKind,
        start: NaiveDate,
        plan: &[i64],
        fact: &[i64],
    ) -> Result<()> {
        let origin = period.normalize_start(start);
        for (kind, values) in [(ValueKind::Plan, plan), (ValueKind::Fact, fact)] {
            for (step, &value) in (0_i64..).zip(values) {
                let date = period.add_periods(origin, step);
                self.put(metric, kind, owner, period, date, value).await?;
            }
        }
        Ok(())
    }

    fn bucket_starts(range: DateRange, requested: PeriodKind) -> Vec<NaiveDate> {
        let mut starts = Vec::with_capacity(requested.count_periods(range.start(), range.end()));
        let mut cursor = requested.normalize_start(range.start());
        while cursor <= range.end() {
            starts.push(cursor);
            let next = requested.add_periods(cursor, 1);
            if next <= cursor {
                break;
            }
            cursor = next;
        }
        starts
    }
}

#[async_trait]
impl TimeSeriesStore for InMemoryTimeSeriesStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    #[instrument(skip(self), fields(metric = %metric, range = %range))]
    async fn fetch(
        &self,
        range: DateRange,
        metric: &MetricId,
        requested: PeriodKind,
        source: PeriodKind,
    ) -> Result<SeriesData> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }

        let starts = Self::bucket_starts(range, requested);
        let mut data = SeriesData::new(vec![0; starts.len()], vec![0; starts.len()]);
        let Some(&first) = starts.first() else {
            return Ok(data);
        };
        let last = requested.end_of_period(range.end());

        let samples = self.samples.read().await;
        for (key, &value) in samples.iter() {
            if &key.metric != metric || key.date < first || key.date > last {
                continue;
            }
            let index = requested.count_periods(first, key.date) - 1;
            let series = match key.kind {
                ValueKind::Plan => &mut data.plan,
                ValueKind::Fact => &mut data.fact,
            };
            if let Some(slot) = series.get_mut(index) {
                *slot = slot.saturating_add(value);
            }
        }

        debug!(
            buckets = starts.len(),
            %source,
            %requested,
            "Served series from memory"
        );
        Ok(data)
    }

    #[instrument(skip(self), fields(metric = %metric, owner = %owner))]
    async fn put(
        &self,
        metric: &MetricId,
        kind: ValueKind,
        owner: &Owner,
        period: PeriodKind,
        date: NaiveDate,
        value: i64,
    ) -> Result<()> {
        let key = SampleKey {
            metric: metric.clone(),
            kind,
            owner: owner.clone(),
            date: period.normalize_start(date),
        };
        trace!(date = %key.date, "Upserting sample");
        self.samples.write().await.insert(key, value);
        Ok(())
    }
}
