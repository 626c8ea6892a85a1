//! Runner - partition → supervisors → channels → aggregator の配線
//!
//! One tokio task per partition. The only synchronization points are each
//! supervisor awaiting its own attempt and the aggregator awaiting the
//! channels. A fatal error aborts the remaining supervisors; otherwise the
//! run waits, without timeout, for the slowest partition.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span};

use super::aggregator::aggregate;
use super::channel::result_channel;
use super::supervisor::{PartitionSupervisor, SupervisorReport};
use crate::domain::{PwcError, RunConfig, RunId, Totals, partition};
use crate::ports::Worker;

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub file_size: u64,
    pub totals: Totals,
    /// Ordered by partition index.
    pub partitions: Vec<SupervisorReport>,
}

impl RunReport {
    pub fn total_attempts(&self) -> usize {
        self.partitions.iter().map(|p| p.attempt_count()).sum()
    }
}

/// Size of the input in bytes. Fails with `FileOpen` when it cannot be opened
/// or is not a regular file.
pub fn probe_file_size(path: &Path) -> Result<u64, PwcError> {
    let open_err = |source| PwcError::FileOpen {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(open_err)?;
    let meta = file.metadata().map_err(open_err)?;
    if !meta.is_file() {
        return Err(open_err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    Ok(meta.len())
}

pub struct Runner {
    config: Arc<RunConfig>,
    worker: Arc<dyn Worker>,
}

impl Runner {
    pub fn new(config: RunConfig, worker: Arc<dyn Worker>) -> Self {
        Self {
            config: Arc::new(config),
            worker,
        }
    }

    pub async fn run(&self) -> Result<RunReport, PwcError> {
        let run_id = RunId::generate();
        let path: Arc<PathBuf> = Arc::new(self.config.path.clone());
        let file_size = probe_file_size(&path)?;
        let partitions = partition(file_size, self.config.partitions);

        info!(
            %run_id,
            path = %path.display(),
            file_size,
            partitions = partitions.len(),
            crash_percent = self.config.failure.crash_probability_percent(),
            "starting run"
        );

        let mut receivers = Vec::with_capacity(partitions.len());
        let mut handles: Vec<JoinHandle<Result<SupervisorReport, PwcError>>> =
            Vec::with_capacity(partitions.len());

        for p in partitions {
            let (tx, rx) = result_channel(p.index);
            let supervisor = PartitionSupervisor::new(
                p,
                Arc::clone(&path),
                self.config.failure,
                self.config.retry.clone(),
                Arc::clone(&self.worker),
            );
            let span = info_span!(
                "partition",
                %run_id,
                index = p.index,
                offset = p.offset,
                length = p.length
            );
            handles.push(tokio::spawn(supervisor.run(tx).instrument(span)));
            receivers.push(rx);
        }

        let totals = match aggregate(receivers).await {
            Ok(totals) => totals,
            Err(err) => return Err(Self::abort(handles, err).await),
        };

        // every channel delivered, so every supervisor is about to return
        let mut reports = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            let report = handle.await.map_err(|e| PwcError::Join {
                index,
                reason: e.to_string(),
            })??;
            reports.push(report);
        }

        info!(
            %run_id,
            lines = totals.lines(),
            words = totals.words(),
            chars = totals.chars(),
            attempts = reports.iter().map(|r| r.attempt_count()).sum::<usize>(),
            "run finished"
        );

        Ok(RunReport {
            run_id,
            file_size,
            totals,
            partitions: reports,
        })
    }

    /// Stop every supervisor and surface the root cause of `err`.
    ///
    /// A closed channel only says that its supervisor gave up; the supervisor's
    /// own error says why.
    async fn abort(
        handles: Vec<JoinHandle<Result<SupervisorReport, PwcError>>>,
        err: PwcError,
    ) -> PwcError {
        let failed = match &err {
            PwcError::ChannelClosed { index } => Some(*index),
            _ => None,
        };

        let mut root_cause = None;
        for (index, handle) in handles.into_iter().enumerate() {
            if Some(index) == failed {
                root_cause = match handle.await {
                    Ok(Err(e)) => Some(e),
                    Err(e) if e.is_panic() => Some(PwcError::Join {
                        index,
                        reason: e.to_string(),
                    }),
                    _ => None,
                };
            } else {
                handle.abort();
            }
        }
        root_cause.unwrap_or(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttemptOutcome, CountTriple, RetryPolicy};
    use crate::impls::{ByteCounter, TaskWorker};
    use crate::ports::{Assignment, Counter};
    use async_trait::async_trait;
    use std::io::Write;

    fn fixture(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    fn single_pass(path: &Path) -> CountTriple {
        let mut file = File::open(path).unwrap();
        let len = file.metadata().unwrap().len();
        ByteCounter::new().count(&mut file, 0, len).unwrap()
    }

    fn runner(path: &Path, partitions: i64, crash: i64, retry: RetryPolicy) -> Runner {
        let config = RunConfig::builder(path)
            .partitions(partitions)
            .crash_probability_percent(crash)
            .retry(retry)
            .build()
            .unwrap();
        Runner::new(config, Arc::new(TaskWorker::new(ByteCounter::new())))
    }

    #[tokio::test]
    async fn small_file_two_partitions() {
        let file = fixture(b"a b\nc\n");
        let report = runner(file.path(), 2, 0, RetryPolicy::unbounded())
            .run()
            .await
            .unwrap();

        assert_eq!(report.file_size, 6);
        assert_eq!(report.totals.counts, CountTriple::new(2, 3, 6));
        assert_eq!(report.totals.partitions, 2);
        assert_eq!(report.total_attempts(), 2);
    }

    #[tokio::test]
    async fn without_crashes_matches_single_pass_for_every_partition_count() {
        let text = "Lorem ipsum dolor sit amet,\nconsectetur adipiscing elit.\n\n  sed do\teiusmod tempor\n";
        let file = fixture(text.repeat(37).as_bytes());
        let expected = single_pass(file.path());

        for n in 1..=10 {
            let report = runner(file.path(), n, 0, RetryPolicy::unbounded())
                .run()
                .await
                .unwrap();
            assert_eq!(report.totals.counts, expected, "n={n}");
            // one attempt per partition when nothing crashes
            assert!(report.partitions.iter().all(|p| p.attempt_count() == 1));
        }
    }

    #[tokio::test]
    async fn maximum_crash_rate_still_terminates_with_exact_totals() {
        let file = fixture("word ".repeat(500).as_bytes());
        let expected = single_pass(file.path());

        for _ in 0..5 {
            let report = runner(file.path(), 10, 50, RetryPolicy::unbounded())
                .run()
                .await
                .unwrap();
            assert_eq!(report.totals.counts, expected);
            assert_eq!(report.totals.partitions, 10);
            assert_eq!(report.partitions.len(), 10);
            for (i, p) in report.partitions.iter().enumerate() {
                assert_eq!(p.partition.index, i);
                assert!(p.attempt_count() >= 1);
            }
        }
    }

    #[tokio::test]
    async fn empty_file_gives_zero_totals() {
        let file = fixture(b"");
        let report = runner(file.path(), 3, 0, RetryPolicy::unbounded())
            .run()
            .await
            .unwrap();
        assert_eq!(report.totals.counts, CountTriple::ZERO);
        assert_eq!(report.totals.partitions, 3);
    }

    #[tokio::test]
    async fn missing_file_fails_before_any_partition_starts() {
        let dir = tempfile::tempdir().unwrap();
        let err = runner(&dir.path().join("missing"), 4, 0, RetryPolicy::unbounded())
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, PwcError::FileOpen { .. }));
    }

    #[tokio::test]
    async fn directory_is_rejected_as_unopenable() {
        let dir = tempfile::tempdir().unwrap();
        let err = runner(dir.path(), 2, 0, RetryPolicy::unbounded())
            .run()
            .await
            .unwrap_err();
        match err {
            PwcError::FileOpen { path, .. } => assert_eq!(path, dir.path()),
            other => panic!("unexpected {other:?}"),
        }
    }

    /// Partition 0 never succeeds; everything else succeeds at once.
    struct StuckFirstPartition;

    #[async_trait]
    impl Worker for StuckFirstPartition {
        async fn run_once(&self, a: &Assignment) -> Result<AttemptOutcome, PwcError> {
            if a.partition.index == 0 {
                Ok(AttemptOutcome::crashed("always"))
            } else {
                Ok(AttemptOutcome::Success(CountTriple::ZERO))
            }
        }
    }

    #[tokio::test]
    async fn exhausted_partition_surfaces_its_own_error() {
        let file = fixture(b"abcdef");
        let config = RunConfig::builder(file.path())
            .partitions(3)
            .retry(RetryPolicy::unbounded().with_max_attempts(3))
            .build()
            .unwrap();
        let err = Runner::new(config, Arc::new(StuckFirstPartition))
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, PwcError::RetriesExhausted { index: 0, attempts: 3 }));
    }
}
