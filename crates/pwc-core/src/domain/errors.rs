//! Errors - エラー型と分類
//!
//! Simulated crashes are not errors: they are `AttemptOutcome::Crashed` and
//! stay inside the owning supervisor. Everything here aborts the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Operational classification of a fatal error.
///
/// - Startup: the input could not be opened or sized
/// - Resource: a channel, task or child process could not be created
/// - Protocol: a result crossed a boundary in a shape we cannot trust
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Startup,
    Resource,
    Protocol,
}

#[derive(Debug, Error)]
pub enum PwcError {
    #[error("File open error: {}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("partition {index}: cannot read range: {source}")]
    RangeRead {
        index: usize,
        #[source]
        source: io::Error,
    },

    #[error("partition {index}: cannot start worker attempt: {reason}")]
    Spawn { index: usize, reason: String },

    #[error("supervisor for partition {index} did not finish: {reason}")]
    Join { index: usize, reason: String },

    #[error("result channel for partition {index} closed before delivery")]
    ChannelClosed { index: usize },

    #[error("partition {index}: gave up after {attempts} attempts")]
    RetriesExhausted { index: usize, attempts: u32 },

    #[error("unsupported count message version {0}")]
    UnsupportedMessageVersion(u16),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl PwcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PwcError::FileOpen { .. } | PwcError::RangeRead { .. } => ErrorKind::Startup,
            PwcError::Spawn { .. }
            | PwcError::Join { .. }
            | PwcError::ChannelClosed { .. }
            | PwcError::RetriesExhausted { .. } => ErrorKind::Resource,
            PwcError::UnsupportedMessageVersion(_) | PwcError::Protocol(_) => ErrorKind::Protocol,
        }
    }
}
