use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::error;
use std::io::{self, Write};
use std::process::ExitCode;
use text_pipeline::{driver, PipelineBuilder};

const USAGE: &str = "\
Usage: analyzer <queue_size> <stage1> <stage2> ... <stageN>

Arguments:
  queue_size  Maximum number of items in each stage's queue
  stage1..N   Names of stages to chain; duplicates are allowed

Available stages:
  upper     - Converts strings to uppercase
  rot       - Moves every character right; the last character wraps to the front
  flip      - Reverses the order of characters
  expand    - Inserts a single space between adjacent characters
  throttle  - Passes strings through unchanged, pausing per character
  log       - Passes strings through unchanged

Example:
  echo 'hello' | analyzer 20 upper rot log
";

#[derive(Parser, Debug)]
#[command(
    name = "analyzer",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// Queue capacity shared by every stage
    queue_size: i64,

    /// Stage names, in chain order
    #[arg(required = true)]
    stages: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(buf, "[{}][{}] {}", record.level(), record.target(), record.args())
        })
        .init();

    // Argument errors print the usage screen on stdout and say nothing on
    // stderr; load and runtime errors go through the logger.
    let args = match Args::try_parse() {
        Ok(args) if args.queue_size > 0 => args,
        _ => {
            print!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run(&args) {
        error!(target: "analyzer", "{err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    let pipeline = PipelineBuilder::new(args.queue_size as usize)
        .stages(args.stages.iter().cloned())
        .build()
        .context("failed to assemble pipeline")?;

    let stdin = io::stdin();
    driver::run(pipeline, stdin.lock()).context("pipeline run failed")
}
