//! Concurrency behaviour of the bulk aggregator.

mod common;

use common::{FailingStore, TrackingStore, acme, december, monthly};
use perfdash::{
    BulkAggregator, CancellationToken, DashboardError, DashboardService, MetricDescriptor,
    MetricId, Owner, PeriodKind,
};
use perfdash_store::{InMemoryDirectory, InMemoryTimeSeriesStore};
use std::sync::Arc;
use std::time::Duration;

fn pairs(count: usize) -> Vec<(Owner, MetricDescriptor)> {
    (0..count)
        .map(|i| (Owner::User(format!("u{}", i % 3).into()), monthly(&format!("m{i}"))))
        .collect()
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let store = Arc::new(TrackingStore::default());
    let aggregator = BulkAggregator::new(store.clone(), 3);

    let previews = aggregator
        .aggregate(&pairs(20), december(), PeriodKind::Month, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(previews.len(), 3);
    assert_eq!(previews.iter().map(|p| p.items.len()).sum::<usize>(), 20);
    assert!(store.peak() <= 3, "peak was {}", store.peak());
    assert!(store.peak() >= 1);
}

#[tokio::test]
async fn test_one_failure_fails_the_batch() {
    let store = Arc::new(FailingStore {
        failing: MetricId::new("m7"),
    });
    let aggregator = BulkAggregator::new(store, 2);

    let result = aggregator
        .aggregate(&pairs(12), december(), PeriodKind::Month, &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(DashboardError::Store(msg)) if msg.contains("m7")));
}

#[tokio::test]
async fn test_failure_propagates_through_dashboard() {
    let acme = acme();
    let directory = InMemoryDirectory::new()
        .with_employee(&acme, "u1", "Ada")
        .with_metric(monthly("ok"))
        .with_metric(monthly("bad"))
        .with_assignment(&acme, Owner::User("u1".into()), "ok")
        .with_assignment(&acme, Owner::User("u1".into()), "bad");
    let store = Arc::new(FailingStore {
        failing: MetricId::new("bad"),
    });
    let service = DashboardService::new(Arc::new(directory), store);

    let result = service
        .dashboard(&acme, december(), PeriodKind::Month, &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(DashboardError::Store(_))));
}

#[tokio::test]
async fn test_cancellation_stops_in_flight_fetches() {
    let store = Arc::new(InMemoryTimeSeriesStore::with_latency(Duration::from_secs(30)));
    let aggregator = BulkAggregator::new(store, 6);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let batch = pairs(4);
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        aggregator.aggregate(&batch, december(), PeriodKind::Month, &cancel),
    )
    .await
    .expect("cancellation should end the batch promptly");
    assert!(matches!(result, Err(DashboardError::Cancelled)));
}

#[tokio::test]
async fn test_cancelled_dashboard() {
    let service = DashboardService::new(
        Arc::new(InMemoryDirectory::new()),
        Arc::new(InMemoryTimeSeriesStore::new()),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = service
        .dashboard(&acme(), december(), PeriodKind::Month, &cancel)
        .await;
    assert!(matches!(result, Err(DashboardError::Cancelled)));
}
