use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Sliding-window percentile tracker for per-item transform latency
#[derive(Debug)]
pub struct LatencyWindow {
    samples: Mutex<VecDeque<u64>>,
    window: usize,
}

impl LatencyWindow {
    /// Create a tracker keeping the most recent `window` samples
    pub fn new(window: usize) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(window)),
            window,
        }
    }

    /// Record one latency sample in nanoseconds
    pub fn record(&self, nanos: u64) {
        let mut samples = self.samples.lock();
        if samples.len() >= self.window {
            samples.pop_front();
        }
        samples.push_back(nanos);
    }

    /// Median latency in microseconds
    pub fn p50_us(&self) -> f64 {
        self.percentile(0.50)
    }

    /// 99th-percentile latency in microseconds
    pub fn p99_us(&self) -> f64 {
        self.percentile(0.99)
    }

    fn percentile(&self, p: f64) -> f64 {
        let samples = self.samples.lock();
        if samples.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<_> = samples.iter().copied().collect();
        sorted.sort_unstable();
        let idx = ((sorted.len() as f64 * p).ceil() as usize).saturating_sub(1);
        sorted[idx] as f64 / 1000.0
    }

    /// Number of samples currently held
    pub fn count(&self) -> usize {
        self.samples.lock().len()
    }
}

/// Counters a stage worker updates as items flow through it
#[derive(Debug)]
pub struct StageMetrics {
    received: AtomicU64,
    emitted: AtomicU64,
    dropped: AtomicU64,
    forward_errors: AtomicU64,
    latency: LatencyWindow,
    started: Instant,
}

impl StageMetrics {
    pub fn new() -> Self {
        Self {
            received: AtomicU64::new(0),
            emitted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            forward_errors: AtomicU64::new(0),
            latency: LatencyWindow::new(1000),
            started: Instant::now(),
        }
    }

    /// A data item was dequeued for processing
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// A transformed item was forwarded or printed
    pub fn record_emitted(&self) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// The transformation dropped an item
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Forwarding to the downstream stage failed
    pub fn record_forward_error(&self) {
        self.forward_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one transform invocation's latency in nanoseconds
    pub fn record_latency(&self, nanos: u64) {
        self.latency.record(nanos);
    }

    pub fn total_received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn total_emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    pub fn total_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn total_forward_errors(&self) -> u64 {
        self.forward_errors.load(Ordering::Relaxed)
    }

    /// Items emitted per second since the stage started
    pub fn throughput(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed == 0.0 {
            0.0
        } else {
            self.total_emitted() as f64 / elapsed
        }
    }

    /// Capture a point-in-time snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.total_received(),
            emitted: self.total_emitted(),
            dropped: self.total_dropped(),
            forward_errors: self.total_forward_errors(),
            throughput: self.throughput(),
            latency_p50_us: self.latency.p50_us(),
            latency_p99_us: self.latency.p99_us(),
            elapsed: self.started.elapsed(),
        }
    }
}

impl Default for StageMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time view of one stage's counters
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub emitted: u64,
    pub dropped: u64,
    pub forward_errors: u64,
    pub throughput: f64,
    pub latency_p50_us: f64,
    pub latency_p99_us: f64,
    pub elapsed: Duration,
}

impl MetricsSnapshot {
    /// Format as a single human-readable line
    pub fn format(&self) -> String {
        format!(
            "received: {}, emitted: {}, dropped: {}, forward errors: {}, \
             throughput: {:.2} items/s, latency p50: {:.2}us, p99: {:.2}us",
            self.received,
            self.emitted,
            self.dropped,
            self.forward_errors,
            self.throughput,
            self.latency_p50_us,
            self.latency_p99_us,
        )
    }
}
