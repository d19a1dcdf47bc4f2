use std::fs;
use std::io::{self, Read, StdoutLock, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, warn};

use indiscript::{Config, Language, OutputSink, RunOutcome, RunnerConfig};

/// Compile and run an Indiscript program.
#[derive(Parser, Debug)]
#[command(name = "indiscript")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source file (stdin when omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Keyword lexicon the program is written in
    #[arg(
        short,
        long,
        value_enum,
        env = "INDISCRIPT_LANGUAGE",
        default_value_t = Language::Kannada
    )]
    language: Language,

    /// Print the generated JavaScript instead of running it
    #[arg(long)]
    emit: bool,

    /// Stop execution after this many statements and loop iterations
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,
}

struct StdoutSink<'a> {
    out: StdoutLock<'a>,
}

impl OutputSink for StdoutSink<'_> {
    fn write_line(&mut self, line: &str) {
        if let Err(error) = writeln!(self.out, "{line}") {
            warn!("Failed to write program output: {error}");
        }
    }
}

fn read_source(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Reading stdin")?;
            Ok(buffer)
        }
    }
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    debug!("{args:?}");

    let source = read_source(args.input.as_ref())?;

    if args.emit {
        let generated =
            indiscript::compile(&source, args.language).context("Compilation failed")?;
        print!("{generated}");
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config {
        language: args.language,
        runner: RunnerConfig {
            max_steps: args.max_steps,
        },
    };
    let mut sink = StdoutSink {
        out: io::stdout().lock(),
    };
    let outcome = indiscript::compile_and_run_with(&source, &config, &mut sink)
        .context("Compilation failed")?;
    sink.out.flush().context("Flushing stdout")?;

    Ok(match outcome {
        RunOutcome::Completed => ExitCode::SUCCESS,
        RunOutcome::Faulted(_) => ExitCode::FAILURE,
    })
}
