//! Outcome model: how a single worker attempt ended.
//!
//! A crashed attempt carries no counts at all, so a partial or truncated
//! triple can never reach a result channel.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::counts::CountTriple;
use super::ids::AttemptId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Success,
    Crashed,
}

/// Completion status of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(CountTriple),
    Crashed { reason: String },
}

impl AttemptOutcome {
    pub fn crashed(reason: impl Into<String>) -> Self {
        Self::Crashed {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            AttemptOutcome::Success(_) => OutcomeKind::Success,
            AttemptOutcome::Crashed { .. } => OutcomeKind::Crashed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }
}

/// History entry kept by a supervisor for each attempt it launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt_id: AttemptId,
    /// 1-indexed within the partition.
    pub number: u32,
    pub kind: OutcomeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub elapsed: Duration,
}

impl AttemptRecord {
    pub fn new(attempt_id: AttemptId, number: u32, outcome: &AttemptOutcome, elapsed: Duration) -> Self {
        let reason = match outcome {
            AttemptOutcome::Success(_) => None,
            AttemptOutcome::Crashed { reason } => Some(reason.clone()),
        };
        Self {
            attempt_id,
            number,
            kind: outcome.kind(),
            reason,
            elapsed,
        }
    }
}
