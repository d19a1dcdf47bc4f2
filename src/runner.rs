//! Executes generated host-dialect text and captures what it prints.
//!
//! The runner carries its own small front end for the host subset (lexer and
//! recursive-descent parser) and a tree-walking interpreter. The only effect a
//! script can have is writing lines into the [`OutputSink`] it is given.

mod ast;
mod error;
mod lexer;
mod parser;
mod runtime;
mod value;

use log::debug;
use serde::Deserialize;

pub use error::RuntimeError;

use runtime::InterpreterRuntime;

/// Destination for lines written by `console.log`.
pub trait OutputSink {
    fn write_line(&mut self, line: &str);
}

impl OutputSink for Vec<String> {
    fn write_line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Accumulates printed lines as one newline-terminated buffer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    buffer: String,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Returns the captured text with trailing whitespace removed.
    pub fn finish(self) -> String {
        self.buffer.trim_end().to_string()
    }
}

impl OutputSink for CapturedOutput {
    fn write_line(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Upper bound on executed statements and loop iterations.
    pub max_steps: Option<u64>,
}

/// How a run ended. A fault has already been written to the sink as an
/// `Error: ` line when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Faulted(RuntimeError),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Runs `generated` with the default configuration and returns the captured
/// output.
pub fn run(generated: &str) -> String {
    run_captured(generated, &RunnerConfig::default())
}

pub fn run_captured(generated: &str, config: &RunnerConfig) -> String {
    let mut output = CapturedOutput::new();
    run_with(generated, config, &mut output);
    output.finish()
}

/// Runs `generated`, writing printed lines and any fault into `sink`.
pub fn run_with(generated: &str, config: &RunnerConfig, sink: &mut dyn OutputSink) -> RunOutcome {
    match execute(generated, config, sink) {
        Ok(()) => RunOutcome::Completed,
        Err(error) => {
            if error.is_syntax_error() {
                debug!("generated text rejected before running: {error:?}");
            } else {
                debug!("host program faulted: {error:?}");
            }
            sink.write_line(&format!("Error: {error}"));
            RunOutcome::Faulted(error)
        }
    }
}

fn execute(
    generated: &str,
    config: &RunnerConfig,
    sink: &mut dyn OutputSink,
) -> Result<(), RuntimeError> {
    let tokens = lexer::tokenize(generated)?;
    let program = parser::parse(tokens)?;
    runtime::check_declarations(&program)?;
    debug!("running {} host statements", program.len());
    InterpreterRuntime::new(sink, config.max_steps).run_program(&program)
}
