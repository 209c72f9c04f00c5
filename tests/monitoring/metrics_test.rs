/*!
 * Metrics Aggregator Tests
 */

use atomic_toolkit::{MetricsAggregator, MetricsSnapshot};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;

#[test]
fn test_request_error_bytes_scenario() {
    let metrics = MetricsAggregator::new();

    metrics.record_request();
    metrics.record_request();
    metrics.record_error();
    metrics.record_bytes(1024);
    assert_eq!(<(i64, i64, i64)>::from(metrics.snapshot()), (2, 1, 1024));

    metrics.reset();
    assert_eq!(<(i64, i64, i64)>::from(metrics.snapshot()), (0, 0, 0));
}

#[test]
fn test_snapshot_serializes() {
    let metrics = MetricsAggregator::new();
    metrics.record_request();
    metrics.record_bytes(64);

    let json = serde_json::to_value(metrics.snapshot()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "requests": 1, "errors": 0, "bytes": 64 })
    );

    let back: MetricsSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back, metrics.snapshot());
}

#[test]
fn test_snapshots_are_monotonic_per_field() {
    let metrics = Arc::new(MetricsAggregator::new());

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let metrics = metrics.clone();
            thread::spawn(move || {
                for _ in 0..10_000 {
                    metrics.record_request();
                    metrics.record_bytes(10);
                }
            })
        })
        .collect();

    let mut last = MetricsSnapshot::default();
    for _ in 0..1_000 {
        let now = metrics.snapshot();
        assert!(now.requests >= last.requests);
        assert!(now.bytes >= last.bytes);
        last = now;
    }

    for writer in writers {
        writer.join().unwrap();
    }

    let done = metrics.snapshot();
    assert_eq!(done.requests, 40_000);
    assert_eq!(done.bytes, 400_000);
}

#[test]
fn test_reset_races_are_bounded() {
    let metrics = MetricsAggregator::new();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..10_000 {
                    metrics.record_request();
                }
            });
        }
        s.spawn(|| {
            for _ in 0..100 {
                metrics.reset();
            }
        });
    });

    // Increments racing a reset may be lost, never invented
    let requests = metrics.snapshot().requests;
    assert!((0..=40_000).contains(&requests));
}
