//! ProcessWorker - attempt ごとに子プロセスを起動する Worker
//!
//! The child is launched as
//! `<program> <leading args..> --partition I --offset O --length L --crash-rate P -- <path>`
//! and reports through its exit status:
//!
//! | exit | meaning |
//! |------|---------|
//! | 0 | success, one JSON `CountMessage` line on stdout |
//! | [`EXIT_CRASHED`] | simulated crash |
//! | [`EXIT_RANGE_ERROR`] | the range could not be read (fatal) |
//! | anything else, or a signal | abnormal termination, treated as a crash |
//!
//! 2 is left to clap's own usage errors, so a child that could not parse its
//! arguments is never mistaken for a read failure.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::trace;

use crate::domain::{AttemptOutcome, CountMessage, PwcError};
use crate::ports::{Assignment, Worker};

/// Hidden subcommand the `pwc` binary answers to in child mode.
pub const ATTEMPT_SUBCOMMAND: &str = "__attempt";

pub const EXIT_RANGE_ERROR: i32 = 4;
pub const EXIT_CRASHED: i32 = 3;

pub struct ProcessWorker {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl ProcessWorker {
    /// Re-invoke `program` (normally the current executable) in attempt mode.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_args(program, [ATTEMPT_SUBCOMMAND])
    }

    pub fn with_args<I, S>(program: impl Into<PathBuf>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
        }
    }

    fn command(&self, assignment: &Assignment) -> Command {
        let p = &assignment.partition;
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .arg("--partition")
            .arg(p.index.to_string())
            .arg("--offset")
            .arg(p.offset.to_string())
            .arg("--length")
            .arg(p.length.to_string())
            .arg("--crash-rate")
            .arg(assignment.failure.crash_probability_percent().to_string())
            // paths starting with '-' must not be read as flags
            .arg("--")
            .arg(assignment.path.as_os_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Worker for ProcessWorker {
    async fn run_once(&self, assignment: &Assignment) -> Result<AttemptOutcome, PwcError> {
        let index = assignment.partition.index;
        let output = self
            .command(assignment)
            .output()
            .await
            .map_err(|e| PwcError::Spawn {
                index,
                reason: e.to_string(),
            })?;

        trace!(
            partition = index,
            attempt_id = %assignment.attempt_id,
            status = %output.status,
            "child exited"
        );

        match output.status.code() {
            Some(0) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let line = stdout.lines().next().unwrap_or_default();
                match CountMessage::decode_json(line) {
                    Ok(msg) => Ok(AttemptOutcome::Success(msg.triple())),
                    Err(e @ PwcError::UnsupportedMessageVersion(_)) => Err(e),
                    // truncated or garbled output never becomes a triple
                    Err(e) => Ok(AttemptOutcome::crashed(format!("unreadable result: {e}"))),
                }
            }
            Some(EXIT_CRASHED) => Ok(AttemptOutcome::crashed("simulated crash")),
            Some(EXIT_RANGE_ERROR) => Err(PwcError::RangeRead {
                index,
                source: io::Error::other(String::from_utf8_lossy(&output.stderr).trim().to_string()),
            }),
            Some(code) => Ok(AttemptOutcome::crashed(format!("child exited with code {code}"))),
            None => Ok(AttemptOutcome::crashed("child terminated by signal")),
        }
    }
}
