//! Worker port - "run once, report success-with-result or failure"
//!
//! The supervisor only sees this trait, so the retry logic does not care
//! whether an attempt runs on a blocking task or in a child process.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{AttemptId, AttemptOutcome, FailureConfig, Partition, PwcError};

/// Everything one attempt needs. Built fresh for every attempt.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub attempt_id: AttemptId,
    pub path: Arc<PathBuf>,
    pub partition: Partition,
    pub failure: FailureConfig,
}

#[async_trait]
pub trait Worker: Send + Sync {
    /// Execute one attempt to completion.
    ///
    /// `Ok(AttemptOutcome::Crashed { .. })` is a transient failure the
    /// supervisor retries. `Err` is fatal for the whole run (the attempt could
    /// not be started, or the range could not be read at all).
    async fn run_once(&self, assignment: &Assignment) -> Result<AttemptOutcome, PwcError>;
}
