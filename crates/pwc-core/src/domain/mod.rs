//! Domain model (partitions, counts, outcomes, config, errors, ids).

pub mod config;
pub mod counts;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod partition;

pub use config::{
    Backoff, BuildError, FailureConfig, RetryPolicy, RunConfig, RunConfigBuilder,
    MAX_CRASH_PERCENT, MAX_PARTITIONS, MIN_PARTITIONS,
};
pub use counts::{CountMessage, CountTriple, Totals};
pub use errors::{ErrorKind, PwcError};
pub use ids::{AttemptId, RunId};
pub use outcome::{AttemptOutcome, AttemptRecord, OutcomeKind};
pub use partition::{Partition, partition};
