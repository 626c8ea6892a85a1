//! PartitionSupervisor - パーティション単位のリトライループ
//!
//! # フロー
//! 1. Launch: 新しい Assignment で worker を起動
//! 2. AwaitCompletion: 成功 / クラッシュを待つ
//! 3. Retry: クラッシュなら attempt を捨てて 1 に戻る
//! 4. Deliver: 成功なら Result Channel に一度だけ書いて終了
//!
//! The loop always runs at least one attempt and keeps going until an attempt
//! reports success. With the default `RetryPolicy` there is no cap and no
//! delay, so a partition that never succeeds stalls the run.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use super::channel::ResultSender;
use crate::domain::{
    AttemptId, AttemptOutcome, AttemptRecord, FailureConfig, Partition, PwcError, RetryPolicy,
};
use crate::ports::{Assignment, Worker};

/// Attempt records kept per partition; older ones are only counted.
pub const RECENT_ATTEMPTS: usize = 16;

/// What a supervisor did, returned once it has delivered.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorReport {
    pub partition: Partition,
    /// Every attempt made, including those no longer in `recent`.
    pub attempts: u32,
    /// The last [`RECENT_ATTEMPTS`] attempts, oldest first.
    pub recent: Vec<AttemptRecord>,
}

impl SupervisorReport {
    pub fn attempt_count(&self) -> usize {
        self.attempts as usize
    }

    pub fn crash_count(&self) -> usize {
        self.attempt_count().saturating_sub(1)
    }
}

pub struct PartitionSupervisor {
    partition: Partition,
    path: Arc<PathBuf>,
    failure: FailureConfig,
    retry: RetryPolicy,
    worker: Arc<dyn Worker>,
}

impl PartitionSupervisor {
    pub fn new(
        partition: Partition,
        path: Arc<PathBuf>,
        failure: FailureConfig,
        retry: RetryPolicy,
        worker: Arc<dyn Worker>,
    ) -> Self {
        Self {
            partition,
            path,
            failure,
            retry,
            worker,
        }
    }

    /// Drive attempts until one succeeds, then deliver its triple on `sender`.
    ///
    /// Returns `Err` only for fatal conditions; the sender is dropped in that
    /// case so the aggregator wakes up with `ChannelClosed`.
    pub async fn run(self, sender: ResultSender) -> Result<SupervisorReport, PwcError> {
        let index = self.partition.index;
        let mut recent: VecDeque<AttemptRecord> = VecDeque::with_capacity(RECENT_ATTEMPTS);
        let mut number: u32 = 0;

        loop {
            number = number.saturating_add(1);
            let assignment = Assignment {
                attempt_id: AttemptId::generate(),
                path: Arc::clone(&self.path),
                partition: self.partition,
                failure: self.failure,
            };

            let started = Instant::now();
            let outcome = self.worker.run_once(&assignment).await?;
            if recent.len() == RECENT_ATTEMPTS {
                recent.pop_front();
            }
            recent.push_back(AttemptRecord::new(
                assignment.attempt_id,
                number,
                &outcome,
                started.elapsed(),
            ));

            match outcome {
                AttemptOutcome::Success(triple) => {
                    sender.deliver(triple)?;
                    debug!(
                        partition = index,
                        attempts = number,
                        attempt_id = %assignment.attempt_id,
                        "delivered"
                    );
                    return Ok(SupervisorReport {
                        partition: self.partition,
                        attempts: number,
                        recent: recent.into(),
                    });
                }
                AttemptOutcome::Crashed { reason } => {
                    debug!(
                        partition = index,
                        attempt = number,
                        attempt_id = %assignment.attempt_id,
                        %reason,
                        "attempt crashed, relaunching"
                    );

                    if !self.retry.allows_another(number) {
                        warn!(partition = index, attempts = number, "retry budget exhausted");
                        return Err(PwcError::RetriesExhausted {
                            index,
                            attempts: number,
                        });
                    }
                    if let Some(delay) = self.retry.delay_after(number) {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}
