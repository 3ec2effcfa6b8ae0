use crate::error::{PipelineError, QueueError};
use crate::queue::SENTINEL;
use crate::stage::{stdout_sink, Sink, Stage};
use crate::transform;
use log::debug;

/// Builder for assembling a stage chain
pub struct PipelineBuilder {
    capacity: usize,
    stage_names: Vec<String>,
    sink: Sink,
}

impl PipelineBuilder {
    /// Create a builder; every stage's queue gets the same `capacity`
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            stage_names: Vec::new(),
            sink: stdout_sink(),
        }
    }

    /// Append one stage to the chain
    pub fn add_stage(mut self, name: impl Into<String>) -> Self {
        self.stage_names.push(name.into());
        self
    }

    /// Append several stages to the chain, in order
    pub fn stages<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stage_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Redirect terminal-stage output and the shutdown notice (stdout by default)
    pub fn with_sink(mut self, sink: Sink) -> Self {
        self.sink = sink;
        self
    }

    /// Resolve, spawn, and wire the stages.
    ///
    /// Duplicate names produce independent stage instances. On any resolution
    /// or spawn failure, stages created so far are torn down in reverse
    /// order before the error is returned.
    pub fn build(self) -> Result<Pipeline, PipelineError> {
        if self.capacity == 0 {
            return Err(PipelineError::InvalidCapacity);
        }
        if self.stage_names.is_empty() {
            return Err(PipelineError::NoStages);
        }

        let mut stages: Vec<Stage> = Vec::with_capacity(self.stage_names.len());
        for name in &self.stage_names {
            let spawned = transform::resolve(name)
                .ok_or_else(|| PipelineError::UnknownStage(name.clone()))
                .and_then(|t| Stage::spawn(t, self.capacity, Sink::clone(&self.sink)));
            match spawned {
                Ok(stage) => stages.push(stage),
                Err(err) => {
                    while let Some(mut stage) = stages.pop() {
                        let _ = stage.join();
                    }
                    return Err(err);
                }
            }
        }

        // Wire stage i's forward handle to stage i+1's enqueue; the last
        // stage stays terminal.
        for i in 0..stages.len() - 1 {
            let next = stages[i + 1].forward_handle();
            stages[i].attach(next);
        }

        Ok(Pipeline {
            stages,
            sink: self.sink,
        })
    }
}

/// An ordered chain of running stages.
///
/// Items fed to the pipeline enter stage 0 and propagate along the chain;
/// the terminal stage prints to the sink. [`Pipeline::shutdown`] performs the
/// cooperative teardown: wait for every stage in chain order, join every
/// worker in chain order, then emit the final notice.
pub struct Pipeline {
    stages: Vec<Stage>,
    sink: Sink,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

impl Pipeline {
    /// Enqueue one line into the first stage. Blocks while stage 0 is full.
    pub fn feed(&self, line: &str) -> Result<(), QueueError> {
        self.stages[0].enqueue(line)
    }

    /// Enqueue the end-of-stream marker into the first stage
    pub fn finish(&self) -> Result<(), QueueError> {
        self.stages[0].enqueue(SENTINEL)
    }

    /// Number of stages in the chain
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in chain order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// Block until every stage has finished, in chain order.
    ///
    /// The end marker propagates along the chain, so by the time this reaches
    /// stage k, stage k has finished or is about to.
    pub fn wait_finished(&self) {
        for stage in &self.stages {
            stage.wait_finished();
        }
    }

    /// Wait for all stages, join all workers, and write the shutdown notice.
    pub fn shutdown(mut self) -> Result<(), PipelineError> {
        self.wait_finished();
        for stage in &mut self.stages {
            stage.join()?;
            debug!(
                target: "pipeline",
                "stage '{}': {}",
                stage.name(),
                stage.metrics().snapshot().format()
            );
        }
        writeln!(self.sink.lock(), "Pipeline shutdown complete.")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn capture_sink() -> (Arc<Mutex<Vec<u8>>>, Sink) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink: Sink = buffer.clone();
        (buffer, sink)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = PipelineBuilder::new(0).add_stage("log").build();
        assert!(matches!(result, Err(PipelineError::InvalidCapacity)));
    }

    #[test]
    fn test_no_stages_rejected() {
        let result = PipelineBuilder::new(10).build();
        assert!(matches!(result, Err(PipelineError::NoStages)));
    }

    #[test]
    fn test_unknown_stage_rejected_and_torn_down() {
        // Stages spawned before the bad name must be joined, not leaked.
        let result = PipelineBuilder::new(10)
            .stages(["upper", "bogus", "log"])
            .build();
        match result {
            Err(PipelineError::UnknownStage(name)) => assert_eq!(name, "bogus"),
            other => panic!("expected UnknownStage, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_names_make_independent_stages() {
        let (_, sink) = capture_sink();
        let pipeline = PipelineBuilder::new(10)
            .stages(["upper", "upper", "log"])
            .with_sink(sink)
            .build()
            .unwrap();
        assert_eq!(pipeline.len(), 3);
        assert_eq!(pipeline.stage_names(), vec!["upper", "upper", "log"]);
        pipeline.finish().unwrap();
        pipeline.shutdown().unwrap();
    }

    #[test]
    fn test_feed_and_shutdown() {
        let (buffer, sink) = capture_sink();
        let pipeline = PipelineBuilder::new(10)
            .add_stage("upper")
            .with_sink(sink)
            .build()
            .unwrap();

        pipeline.feed("hello").unwrap();
        pipeline.finish().unwrap();
        pipeline.shutdown().unwrap();

        let output = String::from_utf8(buffer.lock().clone()).unwrap();
        assert_eq!(output, "[upper] HELLO\nPipeline shutdown complete.\n");
    }

    #[test]
    fn test_feed_after_finish_is_rejected() {
        let (_, sink) = capture_sink();
        let pipeline = PipelineBuilder::new(10)
            .add_stage("log")
            .with_sink(sink)
            .build()
            .unwrap();

        pipeline.finish().unwrap();
        pipeline.wait_finished();
        assert_eq!(pipeline.feed("late"), Err(QueueError::Finished));
        pipeline.shutdown().unwrap();
    }
}
