//! Background writer with a bounded queue.
//!
//! [`AsyncSink`] moves the writes of an inner sink onto a dedicated thread.
//! Callers only pay for an enqueue. The queue never grows past its
//! capacity; what happens on overflow is decided by [`OverflowPolicy`].
//!
//! # Ordering
//!
//! The queue is FIFO and drained by a single worker, so records from one
//! producer reach the inner sink in the order they were written.
//!
//! # Failures
//!
//! The worker cannot report to whoever logged the record, so inner-sink
//! failures (errors and panics alike) are counted and surfaced by the next
//! `flush` as one [`SinkError::Background`]. A `write` only fails for its
//! own record. A panicking inner sink does not stop the worker.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::Sink;
use crate::error::SinkError;
use crate::record::LogRecord;

/// Default queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default upper bound on how long [`AsyncSink::flush`] waits for the queue
/// to drain.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// What to do when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest queued record to make room. Never blocks.
    #[default]
    DropOldest,
    /// Wait for room, at most `timeout`, then fail the write.
    Block { timeout: Duration },
}

struct QueueState {
    queue: VecDeque<LogRecord>,
    closed: bool,
    in_flight: bool,
    dropped: u64,
    failed: usize,
    last_failure: Option<String>,
}

struct Shared {
    state: Mutex<QueueState>,
    not_empty: Condvar,
    not_full: Condvar,
    idle: Condvar,
    capacity: usize,
}

/// Sink that forwards records to an inner sink from a background thread.
pub struct AsyncSink {
    shared: Arc<Shared>,
    inner: Arc<dyn Sink>,
    policy: OverflowPolicy,
    flush_timeout: Duration,
    name: String,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncSink {
    /// Wrap `inner` with a queue of [`DEFAULT_QUEUE_CAPACITY`] and
    /// [`OverflowPolicy::DropOldest`].
    pub fn new(inner: Arc<dyn Sink>) -> Result<Self, SinkError> {
        Self::with_policy(inner, DEFAULT_QUEUE_CAPACITY, OverflowPolicy::default())
    }

    /// Wrap `inner` with an explicit capacity and overflow policy.
    ///
    /// # Errors
    ///
    /// Fails if `capacity` is zero or the worker thread cannot be spawned.
    pub fn with_policy(
        inner: Arc<dyn Sink>,
        capacity: usize,
        policy: OverflowPolicy,
    ) -> Result<Self, SinkError> {
        if capacity == 0 {
            return Err(SinkError::Init("queue capacity must be at least 1".to_string()));
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                queue: VecDeque::with_capacity(capacity.min(DEFAULT_QUEUE_CAPACITY)),
                closed: false,
                in_flight: false,
                dropped: 0,
                failed: 0,
                last_failure: None,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            idle: Condvar::new(),
            capacity,
        });

        let worker = {
            let shared = Arc::clone(&shared);
            let inner = Arc::clone(&inner);
            thread::Builder::new()
                .name("eventlog-async".to_string())
                .spawn(move || run_worker(shared, inner))?
        };

        Ok(Self {
            name: format!("async({})", inner.name()),
            shared,
            inner,
            policy,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// How long `flush` waits for queued records before failing with
    /// [`SinkError::FlushTimeout`].
    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    /// Records evicted by [`OverflowPolicy::DropOldest`] so far.
    pub fn dropped(&self) -> u64 {
        self.shared.state.lock().dropped
    }

    /// Records waiting in the queue.
    pub fn queued(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Stop accepting records, drain the queue and join the worker.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            state.closed = true;
        }
        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();

        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }

    fn take_background_failure(state: &mut QueueState) -> Option<SinkError> {
        if state.failed == 0 {
            return None;
        }
        let failed = std::mem::take(&mut state.failed);
        let last = state.last_failure.take().unwrap_or_default();
        Some(SinkError::Background { failed, last })
    }
}

/// `write` only enqueues: it fails for a closed sink or, under
/// [`OverflowPolicy::Block`], a full queue. Failures of earlier records are
/// reported by `flush`.
impl Sink for AsyncSink {
    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut state = self.shared.state.lock();
        if state.closed {
            return Err(SinkError::Closed);
        }

        if state.queue.len() >= self.shared.capacity {
            match self.policy {
                OverflowPolicy::DropOldest => {
                    state.queue.pop_front();
                    state.dropped += 1;
                }
                OverflowPolicy::Block { timeout } => {
                    let deadline = Instant::now() + timeout;
                    while state.queue.len() >= self.shared.capacity && !state.closed {
                        if self
                            .shared
                            .not_full
                            .wait_until(&mut state, deadline)
                            .timed_out()
                            && state.queue.len() >= self.shared.capacity
                        {
                            return Err(SinkError::Timeout(timeout));
                        }
                    }
                    if state.closed {
                        return Err(SinkError::Closed);
                    }
                }
            }
        }

        state.queue.push_back(record.clone());
        drop(state);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        let deadline = Instant::now() + self.flush_timeout;
        let mut state = self.shared.state.lock();
        while !state.queue.is_empty() || state.in_flight {
            if self.shared.idle.wait_until(&mut state, deadline).timed_out()
                && (!state.queue.is_empty() || state.in_flight)
            {
                return Err(SinkError::FlushTimeout(self.flush_timeout));
            }
        }
        let background = Self::take_background_failure(&mut state);
        drop(state);

        if let Some(err) = background {
            return Err(err);
        }
        self.inner.flush()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for AsyncSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for AsyncSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSink")
            .field("inner", &self.inner.name())
            .field("capacity", &self.shared.capacity)
            .field("policy", &self.policy)
            .field("flush_timeout", &self.flush_timeout)
            .finish()
    }
}

fn run_worker(shared: Arc<Shared>, inner: Arc<dyn Sink>) {
    loop {
        let record = {
            let mut state = shared.state.lock();
            while state.queue.is_empty() && !state.closed {
                shared.not_empty.wait(&mut state);
            }
            match state.queue.pop_front() {
                Some(record) => {
                    state.in_flight = true;
                    record
                }
                // closed and drained
                None => break,
            }
        };
        shared.not_full.notify_one();

        let result = panic::catch_unwind(AssertUnwindSafe(|| inner.write(&record)));

        let mut state = shared.state.lock();
        state.in_flight = false;
        let failure = match result {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some(format!("sink '{}' panicked", inner.name())),
        };
        if let Some(failure) = failure {
            state.failed += 1;
            state.last_failure = Some(failure);
        }
        if state.queue.is_empty() {
            shared.idle.notify_all();
        }
    }

    let _ = inner.flush();
    shared.idle.notify_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Severity;
    use crate::sink::MemorySink;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;

    fn record(message: &str) -> LogRecord {
        LogRecord::new(Severity::Info, Arc::from("async"), message)
    }

    /// Inner sink that blocks every write until released.
    struct GatedSink {
        gate: Mutex<mpsc::Receiver<()>>,
        captured: MemorySink,
    }

    impl Sink for GatedSink {
        fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
            let _ = self.gate.lock().recv();
            self.captured.write(record)
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    struct FailingSink;

    /// Panics on its first write, then delivers.
    struct PanicOnceSink {
        panicked: AtomicBool,
        captured: MemorySink,
    }

    impl Sink for PanicOnceSink {
        fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
            if !self.panicked.swap(true, Ordering::SeqCst) {
                panic!("inner sink exploded");
            }
            self.captured.write(record)
        }

        fn name(&self) -> &str {
            "panic-once"
        }
    }

    impl Sink for FailingSink {
        fn write(&self, _record: &LogRecord) -> Result<(), SinkError> {
            Err(SinkError::Rejected("nope".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_delivers_in_order() {
        let captured = Arc::new(MemorySink::new());
        let sink = AsyncSink::new(captured.clone()).unwrap();

        for i in 0..100 {
            sink.write(&record(&format!("m{}", i))).unwrap();
        }
        sink.flush().unwrap();

        let expected: Vec<String> = (0..100).map(|i| format!("m{}", i)).collect();
        assert_eq!(captured.messages(), expected);
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn test_drop_oldest_when_full() {
        let (release, gate) = mpsc::channel();
        let inner = Arc::new(GatedSink {
            gate: Mutex::new(gate),
            captured: MemorySink::new(),
        });
        let sink = AsyncSink::with_policy(inner.clone(), 2, OverflowPolicy::DropOldest).unwrap();

        // m0 is taken by the worker and blocks on the gate
        sink.write(&record("m0")).unwrap();
        while sink.queued() > 0 {
            thread::yield_now();
        }
        for name in ["m1", "m2", "m3", "m4"] {
            sink.write(&record(name)).unwrap();
        }
        assert_eq!(sink.queued(), 2);
        assert_eq!(sink.dropped(), 2);

        for _ in 0..3 {
            release.send(()).unwrap();
        }
        sink.flush().unwrap();
        assert_eq!(inner.captured.messages(), vec!["m0", "m3", "m4"]);
    }

    #[test]
    fn test_block_policy_times_out() {
        let (release, gate) = mpsc::channel();
        let inner = Arc::new(GatedSink {
            gate: Mutex::new(gate),
            captured: MemorySink::new(),
        });
        let timeout = Duration::from_millis(20);
        let sink =
            AsyncSink::with_policy(inner.clone(), 1, OverflowPolicy::Block { timeout }).unwrap();

        sink.write(&record("m0")).unwrap();
        while sink.queued() > 0 {
            thread::yield_now();
        }
        sink.write(&record("m1")).unwrap();

        let started = Instant::now();
        let err = sink.write(&record("m2")).unwrap_err();
        assert!(matches!(err, SinkError::Timeout(t) if t == timeout));
        assert!(started.elapsed() >= timeout);

        release.send(()).unwrap();
        release.send(()).unwrap();
        sink.flush().unwrap();
        assert_eq!(inner.captured.messages(), vec!["m0", "m1"]);
    }

    #[test]
    fn test_background_failures_surface_once() {
        let sink = AsyncSink::new(Arc::new(FailingSink)).unwrap();
        sink.write(&record("a")).unwrap();
        sink.flush().unwrap_err();

        // an earlier failure does not fail a record that was queued fine
        sink.write(&record("b")).unwrap();
        sink.write(&record("c")).unwrap();

        let err = sink.flush().unwrap_err();
        assert!(matches!(err, SinkError::Background { failed: 2, ref last } if last.contains("nope")));
        // reported failures are not repeated
        sink.flush().unwrap();
    }

    #[test]
    fn test_panicking_inner_sink_keeps_worker_alive() {
        let inner = Arc::new(PanicOnceSink {
            panicked: AtomicBool::new(false),
            captured: MemorySink::new(),
        });
        let sink = AsyncSink::new(inner.clone()).unwrap();

        for i in 0..10 {
            sink.write(&record(&format!("m{}", i))).unwrap();
        }

        let started = Instant::now();
        let err = sink.flush().unwrap_err();
        assert!(started.elapsed() < DEFAULT_FLUSH_TIMEOUT, "flush waited for a dead worker");
        assert!(matches!(
            err,
            SinkError::Background { failed: 1, ref last } if last.contains("panic-once")
        ));

        let expected: Vec<String> = (1..10).map(|i| format!("m{}", i)).collect();
        assert_eq!(inner.captured.messages(), expected);

        sink.write(&record("after")).unwrap();
        sink.flush().unwrap();
        assert_eq!(inner.captured.len(), 10);
    }

    #[test]
    fn test_flush_timeout_has_its_own_error() {
        let (release, gate) = mpsc::channel();
        let inner = Arc::new(GatedSink {
            gate: Mutex::new(gate),
            captured: MemorySink::new(),
        });
        let timeout = Duration::from_millis(20);
        let sink = AsyncSink::new(inner.clone())
            .unwrap()
            .with_flush_timeout(timeout);
        sink.write(&record("stuck")).unwrap();

        let err = sink.flush().unwrap_err();
        assert!(matches!(err, SinkError::FlushTimeout(t) if t == timeout));
        assert!(err.to_string().contains("drain"));

        release.send(()).unwrap();
        sink.flush().unwrap();
        assert_eq!(inner.captured.messages(), vec!["stuck"]);
    }

    #[test]
    fn test_write_after_shutdown_is_closed() {
        let captured = Arc::new(MemorySink::new());
        let sink = AsyncSink::new(captured.clone()).unwrap();
        sink.write(&record("before")).unwrap();
        sink.shutdown();

        assert!(matches!(sink.write(&record("after")), Err(SinkError::Closed)));
        assert_eq!(captured.messages(), vec!["before"]);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result =
            AsyncSink::with_policy(Arc::new(MemorySink::new()), 0, OverflowPolicy::DropOldest);
        assert!(matches!(result, Err(SinkError::Init(_))));
    }

    #[test]
    fn test_name_wraps_inner() {
        let sink = AsyncSink::new(Arc::new(MemorySink::new())).unwrap();
        assert_eq!(sink.name(), "async(memory)");
    }
}
