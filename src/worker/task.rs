/*!
 * Bounded-Queue Worker
 *
 * Background consumer thread fed through a bounded FIFO queue.
 *
 * # Lifecycle
 *
 * `Idle` (initial) ⇄ `Running`, guarded by compare-and-swap on the running flag:
 *
 * 1. **start**: `Idle → Running`, spawns exactly one consumer thread
 * 2. **stop**: `Running → Idle`, drops the stop-signal sender. The disconnect is a
 *    one-shot broadcast the consumer observes at its next wait; an item already
 *    being processed is never interrupted.
 *
 * The consumer checks the stop signal before every wait, so an item finishing
 * after `stop` is followed by exit. If an item and the stop signal become ready
 * during the same wait, the selector may hand over the item first: at most one
 * extra item is processed after `stop`.
 *
 * Transitions are serialized through a small lifecycle lock so that a racing
 * `start`/`stop` pair can never leave a consumer without a stop signal. The
 * running flag itself stays lock-free for `submit` and `is_running`.
 *
 * # Backpressure
 *
 * `submit` never blocks: a full queue drops the item (counted in
 * `dropped_count`), and submitting to an idle worker discards it.
 */

use super::config::WorkerConfig;
use crate::core::errors::{WorkerError, WorkerResult};
use crate::core::sync::{Counter, Flag};
use flume::{Receiver, Selector, Sender, TrySendError};
use parking_lot::Mutex;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

type Handler<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// State owned by the current (or last) run
#[derive(Default)]
struct Lifecycle {
    /// Dropping this disconnects the consumer's stop channel
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

/// Background worker consuming a bounded work queue
///
/// # Example
///
/// ```
/// use atomic_toolkit::{Worker, WorkerConfig};
/// use std::time::{Duration, Instant};
///
/// let worker = Worker::new(WorkerConfig::with_capacity(16), |item: u32| {
///     let _ = item * 2;
/// });
/// worker.start().unwrap();
/// for i in 0..10 {
///     worker.submit(i);
/// }
///
/// let deadline = Instant::now() + Duration::from_secs(2);
/// while worker.processed_count() < 10 && Instant::now() < deadline {
///     std::thread::sleep(Duration::from_millis(5));
/// }
/// assert_eq!(worker.processed_count(), 10);
/// worker.join();
/// ```
pub struct Worker<T: Send + 'static> {
    config: WorkerConfig,
    running: Flag,
    processed: Arc<Counter>,
    dropped: Counter,
    queue_tx: Sender<T>,
    queue_rx: Receiver<T>,
    handler: Handler<T>,
    lifecycle: Mutex<Lifecycle>,
}

impl<T: Send + 'static> Worker<T> {
    /// Create an idle worker that hands every dequeued item to `handler`
    pub fn new<F>(config: WorkerConfig, handler: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let (queue_tx, queue_rx) = flume::bounded(config.capacity);
        Self {
            config,
            running: Flag::new(false),
            processed: Arc::new(Counter::new(0)),
            dropped: Counter::new(0),
            queue_tx,
            queue_rx,
            handler: Arc::new(handler),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Start the consumer thread
    ///
    /// Returns `Ok(true)` if this call started the worker and `Ok(false)` if it
    /// was already running.
    pub fn start(&self) -> WorkerResult<bool> {
        let mut lifecycle = self.lifecycle.lock();
        if !self.running.compare_and_set(false, true) {
            return Ok(false);
        }

        let (stop_tx, stop_rx) = flume::bounded::<()>(1);
        let consumer = Consumer {
            queue: self.queue_rx.clone(),
            stop: stop_rx,
            processed: Arc::clone(&self.processed),
            handler: Arc::clone(&self.handler),
        };

        let spawned = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || consumer.run());

        match spawned {
            Ok(handle) => {
                // A consumer from an earlier run that is still finishing its
                // last item is detached here; it exits on its own.
                lifecycle.stop_tx = Some(stop_tx);
                lifecycle.handle = Some(handle);
                info!(
                    thread = %self.config.thread_name,
                    capacity = self.config.capacity,
                    "Worker started"
                );
                Ok(true)
            }
            Err(e) => {
                self.running.clear();
                error!(error = %e, "Failed to spawn worker thread");
                Err(WorkerError::SpawnFailed(e.to_string()))
            }
        }
    }

    /// Signal the consumer thread to exit
    ///
    /// Returns `true` if this call stopped the worker and `false` if it was
    /// already idle. Does not wait for the thread; see [`join`](Self::join).
    pub fn stop(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        if !self.running.compare_and_set(true, false) {
            return false;
        }

        lifecycle.stop_tx.take();
        info!(
            thread = %self.config.thread_name,
            processed = self.processed.get(),
            queued = self.queue_tx.len(),
            "Worker stopped"
        );
        true
    }

    /// Stop the worker and wait for the consumer thread to exit
    pub fn join(&self) {
        self.stop();
        let handle = self.lifecycle.lock().handle.take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(thread = %self.config.thread_name, "Worker thread terminated abnormally");
            }
        }
    }

    /// Enqueue `item` without blocking
    ///
    /// Dropped silently when the queue is full or the worker is idle.
    #[inline]
    pub fn submit(&self, item: T) {
        let _ = self.try_submit(item);
    }

    /// Enqueue `item` without blocking, reporting why it was not accepted
    pub fn try_submit(&self, item: T) -> WorkerResult<()> {
        if !self.running.is_set() {
            return Err(WorkerError::NotRunning);
        }

        match self.queue_tx.try_send(item) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped.increment();
                trace!(capacity = self.config.capacity, "Work queue full, item dropped");
                Err(WorkerError::QueueFull(self.config.capacity))
            }
            // We hold a receiver, so the queue cannot disconnect while `self` lives
            Err(TrySendError::Disconnected(_)) => Err(WorkerError::NotRunning),
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.is_set()
    }

    /// Items the handler has finished
    #[inline]
    pub fn processed_count(&self) -> i64 {
        self.processed.get()
    }

    /// Items rejected because the queue was full
    #[inline]
    pub fn dropped_count(&self) -> i64 {
        self.dropped.get()
    }

    /// Items waiting in the queue
    #[inline]
    pub fn queue_len(&self) -> usize {
        self.queue_tx.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }
}

impl<T: Send + 'static> Drop for Worker<T> {
    fn drop(&mut self) {
        if self.stop() {
            debug!(
                thread = %self.config.thread_name,
                "Worker dropped while running, consumer signalled to exit"
            );
        }
    }
}

impl<T: Send + 'static> fmt::Debug for Worker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("processed", &self.processed_count())
            .field("dropped", &self.dropped_count())
            .field("queued", &self.queue_len())
            .finish()
    }
}

/// Everything the consumer thread owns
struct Consumer<T> {
    queue: Receiver<T>,
    stop: Receiver<()>,
    processed: Arc<Counter>,
    handler: Handler<T>,
}

impl<T: Send + 'static> Consumer<T> {
    fn run(self) {
        debug!("Worker consumer loop started");

        loop {
            // Checked first so a stop that raced with a full queue wins
            if self.stop.is_disconnected() {
                break;
            }

            // Nothing is ever sent on `stop`; it only ever yields the disconnect
            let next = Selector::new()
                .recv(&self.stop, |_| None)
                .recv(&self.queue, |item| item.ok())
                .wait();

            match next {
                Some(item) => self.process(item),
                None => break,
            }
        }

        debug!(processed = self.processed.get(), "Worker consumer loop exited");
    }

    fn process(&self, item: T) {
        let handler = &*self.handler;
        match panic::catch_unwind(AssertUnwindSafe(|| handler(item))) {
            Ok(()) => {
                self.processed.increment();
            }
            Err(_) => error!("Worker handler panicked, item discarded"),
        }
    }
}
