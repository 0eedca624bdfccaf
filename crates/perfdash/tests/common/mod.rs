#![allow(dead_code, unreachable_pub)]

use async_trait::async_trait;
use chrono::NaiveDate;
use perfdash::{
    CompanyId, DashboardError, DateRange, DepartmentId, MemberRole, MetricDescriptor, MetricId,
    Owner, PeriodKind, Result, SeriesData, TimeSeriesStore, ValueKind,
};
use perfdash_store::{InMemoryDirectory, InMemoryTimeSeriesStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn december() -> DateRange {
    DateRange::new(ymd(2024, 12, 1), ymd(2024, 12, 31)).unwrap()
}

pub fn acme() -> CompanyId {
    CompanyId::new("acme")
}

pub fn monthly(id: &str) -> MetricDescriptor {
    MetricDescriptor::new(id, id.to_uppercase(), PeriodKind::Month)
}

/// Writes twelve constant months of 2024.
pub async fn seed(store: &InMemoryTimeSeriesStore, metric: &str, owner: &Owner, plan: i64, fact: i64) {
    store
        .put_series(&MetricId::new(metric), owner, PeriodKind::Month, ymd(2024, 1, 1), &[plan; 12], &[fact; 12])
        .await
        .unwrap();
}

/// Company with two root departments:
///
/// - `hq` with children `north` (u1, 80%) and `south` (u2, 60%), no members of its own
/// - `solo` with member u3 (50%) and no children
///
/// u4 has no metrics. Key indicator `k1` completes at 50%, `k3` has no plan
/// and `k2` is not a key indicator.
pub async fn scenario() -> (InMemoryDirectory, Arc<InMemoryTimeSeriesStore>) {
    let acme = acme();
    let hq = DepartmentId::new("hq");
    let store = Arc::new(InMemoryTimeSeriesStore::new());

    let mut directory = InMemoryDirectory::new()
        .with_department(&acme, hq.clone(), "HQ", None)
        .with_department(&acme, "north", "North", Some(&hq))
        .with_department(&acme, "south", "South", Some(&hq))
        .with_department(&acme, "solo", "Solo", None)
        .with_member("north", "u1", MemberRole::Employee)
        .with_member("north", "u1", MemberRole::Supervisor)
        .with_member("south", "u2", MemberRole::Employee)
        .with_member("solo", "u3", MemberRole::Supervisor)
        .with_employee(&acme, "u1", "Ada")
        .with_employee(&acme, "u2", "Grace")
        .with_employee(&acme, "u3", "Linus")
        .with_employee(&acme, "u4", "Idle");

    for (user, metric, plan, fact) in [("u1", "m1", 10, 8), ("u2", "m2", 10, 6), ("u3", "m3", 10, 5)] {
        let owner = Owner::User(user.into());
        directory = directory
            .with_metric(monthly(metric))
            .with_assignment(&acme, owner.clone(), metric);
        seed(&store, metric, &owner, plan, fact).await;
    }

    for (id, key, plan, fact) in [("k1", true, 20, 10), ("k2", false, 10, 10), ("k3", true, 0, 7)] {
        directory = directory.with_indicator(&acme, monthly(id), key);
        seed(&store, id, &Owner::Company, plan, fact).await;
    }

    (directory, store)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
}

/// Store that fails every fetch of one metric and serves zeros otherwise.
#[derive(Debug)]
pub struct FailingStore {
    pub failing: MetricId,
}

#[async_trait]
impl TimeSeriesStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn fetch(
        &self,
        range: DateRange,
        metric: &MetricId,
        requested: PeriodKind,
        _source: PeriodKind,
    ) -> Result<SeriesData> {
        if metric == &self.failing {
            return Err(DashboardError::Store(format!("{metric} unavailable")));
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        let n = requested.count_periods(range.start(), range.end());
        Ok(SeriesData::new(vec![1; n], vec![1; n]))
    }

    async fn put(
        &self,
        _metric: &MetricId,
        _kind: ValueKind,
        _owner: &Owner,
        _period: PeriodKind,
        _date: NaiveDate,
        _value: i64,
    ) -> Result<()> {
        Ok(())
    }
}

/// Store recording the highest number of concurrent fetches.
#[derive(Debug, Default)]
pub struct TrackingStore {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl TrackingStore {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimeSeriesStore for TrackingStore {
    fn name(&self) -> &str {
        "tracking"
    }

    async fn fetch(
        &self,
        range: DateRange,
        _metric: &MetricId,
        requested: PeriodKind,
        _source: PeriodKind,
    ) -> Result<SeriesData> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(15)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let n = requested.count_periods(range.start(), range.end());
        Ok(SeriesData::new(vec![2; n], vec![1; n]))
    }

    async fn put(
        &self,
        _metric: &MetricId,
        _kind: ValueKind,
        _owner: &Owner,
        _period: PeriodKind,
        _date: NaiveDate,
        _value: i64,
    ) -> Result<()> {
        Ok(())
    }
}
