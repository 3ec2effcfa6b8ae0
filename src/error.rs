use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors returned by queue operations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was created with zero capacity and can never accept items
    #[error("queue has zero capacity")]
    ZeroCapacity,

    /// The queue has been signaled finished and rejects new items
    #[error("queue finished")]
    Finished,
}

/// Errors that can occur while building or running a pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Queue capacity must be at least one
    #[error("queue capacity must be at least 1")]
    InvalidCapacity,

    /// No stages in pipeline
    #[error("cannot build a pipeline with no stages")]
    NoStages,

    /// A stage name did not resolve to any known transformation
    #[error("unknown stage '{0}'")]
    UnknownStage(String),

    /// The OS refused to spawn a worker thread
    #[error("failed to spawn worker thread for stage '{stage}': {source}")]
    ThreadSpawn {
        stage: String,
        source: std::io::Error,
    },

    /// A worker thread panicked and could not be joined cleanly
    #[error("worker thread for stage '{0}' panicked")]
    WorkerPanicked(String),

    /// Queue-level failure surfaced through a pipeline operation
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Writing to the output sink failed
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}
