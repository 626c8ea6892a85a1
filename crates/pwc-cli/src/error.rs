//! CLI error types.

use std::io;

use pwc_core::domain::{BuildError, PwcError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Run(#[from] PwcError),

    #[error("invalid configuration: {0}")]
    Config(#[from] BuildError),

    #[error("cannot start async runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("cannot locate own executable for process isolation: {0}")]
    CurrentExe(#[source] io::Error),

    #[error("cannot write report: {0}")]
    Output(#[source] io::Error),
}

impl CliError {
    /// Startup errors about the input file also print the usage line.
    pub fn wants_usage(&self) -> bool {
        matches!(self, CliError::Run(PwcError::FileOpen { .. }))
    }
}
