use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::queue::SENTINEL;
use log::error;
use std::io::BufRead;

/// Feed newline-delimited records from `reader` through the pipeline, then
/// shut it down.
///
/// One trailing newline is stripped from each record. Reading stops after a
/// literal sentinel line has been fed; if the input ends without one, the
/// sentinel is fed explicitly so the stages drain and terminate. Runtime
/// enqueue failures are logged and skipped; the pipeline keeps running.
pub fn run<R: BufRead>(pipeline: Pipeline, mut reader: R) -> Result<(), PipelineError> {
    let mut buf = String::new();
    let mut saw_sentinel = false;

    loop {
        buf.clear();
        match reader.read_line(&mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                error!(target: "driver", "input read failed: {err}");
                break;
            }
        }
        if buf.ends_with('\n') {
            buf.pop();
        }

        if let Err(err) = pipeline.feed(&buf) {
            error!(target: "driver", "enqueue failed: {err}");
        }
        if buf == SENTINEL {
            saw_sentinel = true;
            break;
        }
    }

    if !saw_sentinel {
        if let Err(err) = pipeline.finish() {
            error!(target: "driver", "enqueue failed: {err}");
        }
    }

    pipeline.shutdown()
}
