/*!
 * Worker Integration Tests
 * Lifecycle races, backpressure and processing guarantees
 */

use atomic_toolkit::{Worker, WorkerConfig, WorkerError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn eventually(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    check()
}

#[test]
fn test_processes_every_item_when_capacity_suffices() {
    let items = 500;
    let sum = Arc::new(AtomicUsize::new(0));
    let sum_clone = sum.clone();

    let worker = Worker::new(WorkerConfig::with_capacity(items), move |item: usize| {
        sum_clone.fetch_add(item, Ordering::Relaxed);
    });
    worker.start().unwrap();

    for i in 0..items {
        worker.submit(i);
    }

    let mut last = 0;
    assert!(eventually(Duration::from_secs(5), || {
        let now = worker.processed_count();
        // Monotonically non-decreasing and never beyond what was submitted
        assert!(now >= last);
        assert!(now <= items as i64);
        last = now;
        now == items as i64
    }));

    worker.join();
    assert_eq!(worker.dropped_count(), 0);
    assert_eq!(sum.load(Ordering::Relaxed), (0..items).sum::<usize>());
}

#[test]
fn test_full_queue_drops_without_blocking() {
    let gate = Arc::new(Barrier::new(2));
    let (started_tx, started_rx) = flume::bounded::<()>(1);

    let handler_gate = gate.clone();
    let worker = Worker::new(WorkerConfig::with_capacity(2), move |first: bool| {
        if first {
            let _ = started_tx.send(());
            handler_gate.wait();
        }
    });
    worker.start().unwrap();

    // Park the consumer inside the handler
    worker.submit(true);
    started_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("consumer should pick up the first item");

    // Queue holds two, third is dropped
    assert_eq!(worker.try_submit(false), Ok(()));
    assert_eq!(worker.try_submit(false), Ok(()));
    assert_eq!(worker.try_submit(false), Err(WorkerError::QueueFull(2)));
    worker.submit(false);
    assert_eq!(worker.dropped_count(), 2);
    assert_eq!(worker.queue_len(), 2);

    gate.wait();
    assert!(eventually(Duration::from_secs(2), || worker.processed_count() == 3));
    worker.join();
}

#[test]
fn test_concurrent_start_spawns_one_consumer() {
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let (active_h, peak_h) = (active.clone(), peak.clone());
    let worker = Arc::new(Worker::new(WorkerConfig::default(), move |_: u32| {
        let now = active_h.fetch_add(1, Ordering::SeqCst) + 1;
        peak_h.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_micros(200));
        active_h.fetch_sub(1, Ordering::SeqCst);
    }));

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let worker = worker.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                worker.start().unwrap()
            })
        })
        .collect();

    let started = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|&won| won)
        .count();
    assert_eq!(started, 1);

    for i in 0..50 {
        worker.submit(i);
    }
    assert!(eventually(Duration::from_secs(5), || worker.processed_count() == 50));

    // A single consumer never runs the handler concurrently with itself
    assert_eq!(peak.load(Ordering::SeqCst), 1);
    worker.join();
}

#[test]
fn test_concurrent_stop_signals_once() {
    let worker = Arc::new(Worker::new(WorkerConfig::default(), |_: u32| {}));
    worker.start().unwrap();

    let barrier = Arc::new(Barrier::new(8));
    let stopped: usize = (0..8)
        .map(|_| {
            let worker = worker.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                worker.stop()
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap() as usize)
        .sum();

    assert_eq!(stopped, 1);
    assert!(!worker.is_running());
    worker.join();
}

#[test]
fn test_start_stop_churn_leaves_consistent_state() {
    let worker = Arc::new(Worker::new(WorkerConfig::with_capacity(16), |_: u32| {}));

    thread::scope(|s| {
        for i in 0..4 {
            let worker = &worker;
            s.spawn(move || {
                for _ in 0..200 {
                    if i % 2 == 0 {
                        let _ = worker.start();
                    } else {
                        worker.stop();
                    }
                    worker.submit(1);
                }
            });
        }
    });

    // Whatever state the churn ended in, one stop + join must settle it
    worker.join();
    assert!(!worker.is_running());
    assert!(worker.processed_count() + worker.dropped_count() <= 800);
}

#[test]
fn test_stop_prevents_further_processing() {
    let worker = Worker::new(WorkerConfig::with_capacity(1000), |_: u32| {
        thread::sleep(Duration::from_millis(1));
    });
    worker.start().unwrap();

    for i in 0..1000 {
        worker.submit(i);
    }
    worker.join();

    let after_stop = worker.processed_count();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(worker.processed_count(), after_stop);
    assert!(after_stop < 1000);
}

#[test]
fn test_stop_during_handler_exits_before_next_item() {
    let gate = Arc::new(Barrier::new(2));
    let (started_tx, started_rx) = flume::bounded::<()>(1);

    let handler_gate = gate.clone();
    let worker = Worker::new(WorkerConfig::with_capacity(8), move |first: bool| {
        if first {
            let _ = started_tx.send(());
            handler_gate.wait();
        }
    });
    worker.start().unwrap();

    worker.submit(true);
    started_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("consumer should pick up the first item");
    for _ in 0..3 {
        worker.submit(false);
    }

    // The stop signal is already disconnected when the handler returns
    assert!(worker.stop());
    gate.wait();
    worker.join();

    assert_eq!(worker.processed_count(), 1);
    assert_eq!(worker.queue_len(), 3);
}

#[test]
fn test_zero_capacity_hands_off_only_to_waiting_consumer() {
    let worker = Worker::new(WorkerConfig::with_capacity(0), |_: u32| {});
    assert_eq!(worker.capacity(), 0);
    assert_eq!(worker.try_submit(1), Err(WorkerError::NotRunning));

    worker.start().unwrap();

    // Accepted once the consumer is parked waiting for work
    assert!(eventually(Duration::from_secs(2), || worker.try_submit(1).is_ok()));
    assert!(eventually(Duration::from_secs(2), || worker.processed_count() == 1));
    assert_eq!(worker.queue_len(), 0);
    worker.join();
}

#[test]
fn test_zero_capacity_rejects_while_consumer_is_busy() {
    let gate = Arc::new(Barrier::new(2));
    let (started_tx, started_rx) = flume::bounded::<()>(1);

    let handler_gate = gate.clone();
    let worker = Worker::new(WorkerConfig::with_capacity(0), move |_: u32| {
        let _ = started_tx.send(());
        handler_gate.wait();
    });
    worker.start().unwrap();

    assert!(eventually(Duration::from_secs(2), || worker.try_submit(1).is_ok()));
    started_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("consumer should run the handed-off item");

    // No buffer and nobody receiving: every submission is dropped
    let dropped_before = worker.dropped_count();
    assert_eq!(worker.try_submit(2), Err(WorkerError::QueueFull(0)));
    assert_eq!(worker.try_submit(3), Err(WorkerError::QueueFull(0)));
    assert_eq!(worker.dropped_count(), dropped_before + 2);

    gate.wait();
    worker.join();
    assert_eq!(worker.processed_count(), 1);
}
