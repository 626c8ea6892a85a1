//! pwc - parallel, crash-tolerant line/word/byte counter.

mod args;
mod attempt_cmd;
mod error;
mod output;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use pwc_core::app::Runner;
use pwc_core::impls::{ByteCounter, ProcessWorker, TaskWorker};
use pwc_core::ports::Worker;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::args::{ChildCommand, Cli, Isolation, USAGE};
use crate::error::CliError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // child mode keeps stderr for its own diagnostic
    if let Some(ChildCommand::Attempt(args)) = &cli.command {
        return attempt_cmd::run(args);
    }

    init_logging();

    let Some(file) = cli.file.clone() else {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    };

    match run(&cli, file) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let CliError::Run(run_err) = &e {
                debug!(kind = ?run_err.kind(), "run failed");
            }
            eprintln!("{e}");
            if e.wants_usage() {
                eprintln!("{USAGE}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn worker_for(isolation: Isolation) -> Result<Arc<dyn Worker>, CliError> {
    Ok(match isolation {
        Isolation::Task => Arc::new(TaskWorker::new(ByteCounter::new())),
        Isolation::Process => {
            let exe = std::env::current_exe().map_err(CliError::CurrentExe)?;
            Arc::new(ProcessWorker::new(exe))
        }
    })
}

fn run(cli: &Cli, file: std::path::PathBuf) -> Result<(), CliError> {
    let config = cli.run_config(file.clone())?;
    debug!(?config, isolation = ?cli.isolation, "resolved configuration");

    let mut stdout = io::stdout().lock();
    output::write_settings(&mut stdout, &config).map_err(CliError::Output)?;
    stdout.flush().map_err(CliError::Output)?;

    let started = Instant::now();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let runner = Runner::new(config, worker_for(cli.isolation)?);
    let report = runtime.block_on(runner.run())?;
    let elapsed = started.elapsed();

    output::write_report(&mut stdout, &file, &report, elapsed).map_err(CliError::Output)?;
    if cli.verbose {
        output::write_partitions(&mut stdout, &report).map_err(CliError::Output)?;
    }
    Ok(())
}
