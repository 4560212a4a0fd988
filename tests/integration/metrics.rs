//! Handler metrics, captured with `metrics_util::debugging::DebuggingRecorder`.

use crate::helpers::Slow;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use metrics_util::MetricKind;
use persistd::handler::{ItemHandler, OrderHandler};
use persistd::proto::item::v1::item_persistence_service_server::ItemPersistenceService;
use persistd::proto::item::v1::{CreateItemRequest, Empty, GetItemRequest, GrpcItem};
use persistd::proto::order::v2::order_persistence_service_server::OrderPersistenceService;
use persistd::proto::order::v2::DeleteOrderRequest;
use persistd::telemetry;
use std::future::Future;
use std::time::Duration;
use tonic::IntoRequest as _;

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

/// Sum the request counters carrying the given operation and status labels.
fn requests(snapshot: &SnapshotVec, operation: &str, status: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == telemetry::REQUESTS_TOTAL
                && key
                    .key()
                    .labels()
                    .any(|label| label.key() == "operation" && label.value() == operation)
                && key
                    .key()
                    .labels()
                    .any(|label| label.key() == "status" && label.value() == status)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// The number of duration samples recorded for the given operation.
fn durations(snapshot: &SnapshotVec, operation: &str) -> usize {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Histogram
                && key.key().name() == telemetry::REQUEST_DURATION_SECONDS
                && key
                    .key()
                    .labels()
                    .any(|label| label.key() == "operation" && label.value() == operation)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Histogram(samples) => samples.len(),
            _ => 0,
        })
        .sum()
}

/// Run `future` with a local recorder installed and return a snapshot of what it recorded.
///
/// `block_in_place` keeps the synchronous `with_local_recorder` closure on the current thread
/// while `block_on` drives the future.
fn recorded<F>(future: F) -> (F::Output, SnapshotVec)
where
    F: Future,
{
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let output = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
    });
    (output, snapshotter.snapshot().into_vec())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_success_records_once() {
    let handler = ItemHandler::in_memory();

    let (result, snapshot) = recorded(handler.create(
        CreateItemRequest {
            item: Some(GrpcItem {
                id: 0,
                description: "pen".to_owned(),
            }),
        }
        .into_request(),
    ));
    assert!(result.is_ok());

    assert_eq!(requests(&snapshot, "create", "ok"), 1);
    assert_eq!(requests(&snapshot, "create", "error"), 0);
    assert_eq!(durations(&snapshot, "create"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_failure_records_once() {
    let handler = ItemHandler::in_memory();

    let (result, snapshot) = recorded(handler.get(GetItemRequest { id: 3 }.into_request()));
    assert!(result.is_err());

    assert_eq!(requests(&snapshot, "get", "error"), 1);
    assert_eq!(requests(&snapshot, "get", "ok"), 0);
    assert_eq!(durations(&snapshot, "get"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_each_call_records() {
    let handler = ItemHandler::in_memory();

    let (_, snapshot) = recorded(async {
        for _ in 0..3 {
            let _response = handler.count(Empty {}.into_request()).await;
        }
        let _response = handler.list(Empty {}.into_request()).await;
    });

    assert_eq!(requests(&snapshot, "count", "ok"), 3);
    assert_eq!(requests(&snapshot, "list", "ok"), 1);
    assert_eq!(durations(&snapshot, "count"), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_order_failure_records_once() {
    let handler = OrderHandler::in_memory();

    let (result, snapshot) = recorded(handler.delete(DeleteOrderRequest { id: 1 }.into_request()));
    assert!(result.is_err());

    assert_eq!(requests(&snapshot, "delete", "error"), 1);
    let service_labelled = snapshot.iter().any(|(key, _, _, _)| {
        key.key().labels().any(|label| {
            label.key() == "service" && label.value() == "persistd.order.v2.OrderPersistenceService"
        })
    });
    assert!(service_labelled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_dropped_call_records_once() {
    let handler = ItemHandler::new(Slow {
        delay: Duration::from_secs(30),
    });

    let (result, snapshot) = recorded(tokio::time::timeout(
        Duration::from_millis(50),
        handler.get(GetItemRequest { id: 1 }.into_request()),
    ));
    assert!(result.is_err(), "the call should have been cut short");

    assert_eq!(requests(&snapshot, "get", "cancelled"), 1);
    assert_eq!(requests(&snapshot, "get", "ok"), 0);
    assert_eq!(requests(&snapshot, "get", "error"), 0);
    assert_eq!(durations(&snapshot, "get"), 1);
}

#[tokio::test]
async fn test_noop_without_recorder() {
    let handler = ItemHandler::in_memory();
    assert!(handler.count(Empty {}.into_request()).await.is_ok());
}
