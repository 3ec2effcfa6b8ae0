use crate::error::{PipelineError, QueueError};
use crate::event::Event;
use crate::metrics::StageMetrics;
use crate::queue::{WorkItem, WorkQueue};
use crate::transform::Transform;
use log::{error, warn};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Where terminal stages and the driver write their output
pub type Sink = Arc<Mutex<dyn Write + Send>>;

/// The enqueue operation of a downstream stage, handed to its upstream
/// neighbor. Forwarding transfers ownership of the item.
pub type ForwardHandle = Box<dyn Fn(WorkItem) -> Result<(), QueueError> + Send + Sync>;

/// A sink writing to standard output
pub fn stdout_sink() -> Sink {
    Arc::new(Mutex::new(std::io::stdout()))
}

/// One pipeline stage: a bounded queue, a consumer thread running a
/// transformation, and an optional forward handle to the next stage.
///
/// A stage without a forward handle is terminal and prints every transformed
/// item to the sink as `[NAME] <item>`. The end-of-stream marker is forwarded
/// once when a handle is attached, never printed, and never passed to the
/// transformation.
pub struct Stage {
    name: String,
    queue: Arc<WorkQueue>,
    forward: Arc<OnceLock<ForwardHandle>>,
    finished: Arc<Event>,
    metrics: Arc<StageMetrics>,
    worker: Option<JoinHandle<()>>,
}

impl Stage {
    /// Create the stage's queue and spawn its consumer thread
    pub fn spawn(
        transform: Box<dyn Transform>,
        capacity: usize,
        sink: Sink,
    ) -> Result<Self, PipelineError> {
        let name = transform.name().to_owned();
        let queue = Arc::new(WorkQueue::new(capacity));
        let forward = Arc::new(OnceLock::new());
        let finished = Arc::new(Event::new());
        let metrics = Arc::new(StageMetrics::new());

        let worker = thread::Builder::new()
            .name(format!("stage-{name}"))
            .spawn({
                let name = name.clone();
                let queue = Arc::clone(&queue);
                let forward = Arc::clone(&forward);
                let finished = Arc::clone(&finished);
                let metrics = Arc::clone(&metrics);
                move || consume(name, transform, queue, forward, finished, metrics, sink)
            })
            .map_err(|source| PipelineError::ThreadSpawn {
                stage: name.clone(),
                source,
            })?;

        Ok(Self {
            name,
            queue,
            forward,
            finished,
            metrics,
            worker: Some(worker),
        })
    }

    /// The stage's registered name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Duplicate a caller's line into the stage's queue.
    ///
    /// A literal sentinel line becomes the end-of-stream marker. Blocks while
    /// the queue is full.
    pub fn enqueue(&self, line: &str) -> Result<(), QueueError> {
        self.queue.put(WorkItem::from_line(line))
    }

    /// An enqueue handle for this stage, for wiring as the upstream
    /// neighbor's forward target
    pub fn forward_handle(&self) -> ForwardHandle {
        let queue = Arc::clone(&self.queue);
        Box::new(move |item| queue.put(item))
    }

    /// Set the forward handle. Must happen once, before items reach the
    /// forwarding branch; later calls are ignored.
    pub fn attach(&self, next: ForwardHandle) {
        if self.forward.set(next).is_err() {
            warn!(target: "stage", "'{}' already attached; ignoring", self.name);
        }
    }

    /// Block until the worker has processed the end-of-stream marker or its
    /// queue was exhausted
    pub fn wait_finished(&self) {
        self.finished.wait();
    }

    /// Counters for this stage
    pub fn metrics(&self) -> &StageMetrics {
        &self.metrics
    }

    /// Tear the stage down: signal its queue finished (idempotent) and join
    /// the consumer thread. Safe to call after `wait_finished` or on its own.
    pub fn join(&mut self) -> Result<(), PipelineError> {
        self.queue.signal_finished();
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| PipelineError::WorkerPanicked(self.name.clone()))?;
        }
        Ok(())
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        self.queue.signal_finished();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Consumer loop: dequeue, transform, forward or print, until the
/// end-of-stream marker arrives or the queue is exhausted.
fn consume(
    name: String,
    mut transform: Box<dyn Transform>,
    queue: Arc<WorkQueue>,
    forward: Arc<OnceLock<ForwardHandle>>,
    finished: Arc<Event>,
    metrics: Arc<StageMetrics>,
    sink: Sink,
) {
    while let Some(item) = queue.get() {
        let line = match item {
            WorkItem::End => {
                if let Some(next) = forward.get() {
                    if let Err(err) = next(WorkItem::End) {
                        error!(target: name.as_str(), "failed to forward end marker: {err}");
                    }
                }
                break;
            }
            WorkItem::Data(line) => line,
        };

        metrics.record_received();
        let start = Instant::now();
        let output = transform.apply(line);
        metrics.record_latency(start.elapsed().as_nanos() as u64);

        let Some(output) = output else {
            metrics.record_dropped();
            continue;
        };

        match forward.get() {
            Some(next) => {
                if let Err(err) = next(WorkItem::Data(output)) {
                    metrics.record_forward_error();
                    error!(target: name.as_str(), "downstream enqueue failed: {err}");
                } else {
                    metrics.record_emitted();
                }
            }
            None => {
                if let Err(err) = writeln!(sink.lock(), "[{name}] {output}") {
                    error!(target: name.as_str(), "sink write failed: {err}");
                }
                metrics.record_emitted();
            }
        }
    }

    queue.signal_finished();
    finished.signal();
}
