//! Worker attempt body, shared by every `Worker` implementation.
//!
//! One call = one attempt: fresh file handle, fresh seek, fresh random draw.
//! Nothing survives into the next attempt of the same partition.

use std::fs::File;
use std::path::Path;

use rand::Rng;

use crate::domain::{AttemptOutcome, FailureConfig, Partition, PwcError};
use crate::ports::Counter;

pub const SIMULATED_CRASH: &str = "simulated crash";

/// Count `partition` of the file at `path`, then draw for a simulated crash.
///
/// The counted triple is dropped when the draw says crash, so a crashed
/// attempt never hands out counts.
pub fn run_attempt<C, G>(
    counter: &C,
    path: &Path,
    partition: &Partition,
    failure: FailureConfig,
    rng: &mut G,
) -> Result<AttemptOutcome, PwcError>
where
    C: Counter,
    G: Rng + ?Sized,
{
    let mut file = File::open(path).map_err(|source| PwcError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let triple = counter
        .count(&mut file, partition.offset, partition.length)
        .map_err(|source| PwcError::RangeRead {
            index: partition.index,
            source,
        })?;

    if failure.should_crash(rng) {
        return Ok(AttemptOutcome::crashed(SIMULATED_CRASH));
    }
    Ok(AttemptOutcome::Success(triple))
}
