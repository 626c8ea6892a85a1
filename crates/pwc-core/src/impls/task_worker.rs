//! TaskWorker - attempt を blocking タスクで実行する Worker
//!
//! A panic inside the attempt is an abnormal termination, observed through
//! the task's `JoinError`, and reported the same way as a simulated crash.

use std::sync::Arc;

use async_trait::async_trait;

use crate::app::attempt::run_attempt;
use crate::domain::{AttemptOutcome, PwcError};
use crate::ports::{Assignment, Counter, Worker};

pub struct TaskWorker<C> {
    counter: Arc<C>,
}

impl<C: Counter> TaskWorker<C> {
    pub fn new(counter: C) -> Self {
        Self {
            counter: Arc::new(counter),
        }
    }
}

#[async_trait]
impl<C: Counter> Worker for TaskWorker<C> {
    async fn run_once(&self, assignment: &Assignment) -> Result<AttemptOutcome, PwcError> {
        let counter = Arc::clone(&self.counter);
        let path = Arc::clone(&assignment.path);
        let partition = assignment.partition;
        let failure = assignment.failure;

        let joined = tokio::task::spawn_blocking(move || {
            let mut rng = rand::thread_rng();
            run_attempt(counter.as_ref(), &path, &partition, failure, &mut rng)
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(e) if e.is_panic() => Ok(AttemptOutcome::crashed(format!(
                "attempt panicked: {}",
                panic_message(e.into_panic())
            ))),
            Err(e) => Err(PwcError::Spawn {
                index: partition.index,
                reason: e.to_string(),
            }),
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
