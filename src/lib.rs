//! A multi-stage text transformation pipeline built on bounded blocking queues.
//!
//! Lines enter the first stage, propagate through the chain concurrently, and
//! the terminal stage prints the transformed result. Each stage owns a bounded
//! queue and a consumer thread; a full queue blocks the upstream producer, so
//! backpressure is the enqueue itself. Shutdown is cooperative: a sentinel
//! line (`<END>`) travels the chain as a typed end-of-stream marker, and each
//! worker forwards it once and terminates.
//!
//! # Features
//!
//! - Bounded blocking FIFO queues with a monotonic finished flag
//! - Manual-reset events for observing queue and stage completion
//! - One worker thread per stage, joined exactly once in chain order
//! - Duplicate stage names yield fully independent stage instances
//! - Per-stage metrics: counts, throughput, transform latency percentiles
//!
//! # Example
//!
//! ```ignore
//! use text_pipeline::{driver, PipelineBuilder};
//! use std::io;
//!
//! let pipeline = PipelineBuilder::new(20)
//!     .stages(["upper", "rot", "log"])
//!     .build()?;
//!
//! driver::run(pipeline, io::stdin().lock())?;
//! ```

pub mod driver;
pub mod error;
pub mod event;
pub mod metrics;
pub mod pipeline;
pub mod queue;
pub mod stage;
pub mod transform;

// Re-exports for convenience
pub use error::{PipelineError, QueueError, Result};
pub use event::Event;
pub use metrics::{MetricsSnapshot, StageMetrics};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use queue::{WorkItem, WorkQueue, SENTINEL};
pub use stage::{stdout_sink, ForwardHandle, Sink, Stage};
pub use transform::Transform;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
