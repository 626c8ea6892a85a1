//! Child-process side of `--isolation process`.
//!
//! Runs exactly one attempt and reports through the exit status; on success
//! one JSON `CountMessage` line goes to stdout.

use std::io::{self, Write};
use std::process::ExitCode;

use pwc_core::app::run_attempt;
use pwc_core::domain::{AttemptOutcome, CountMessage, FailureConfig, Partition};
use pwc_core::impls::{ByteCounter, EXIT_CRASHED, EXIT_RANGE_ERROR};

use crate::args::AttemptArgs;

pub fn run(args: &AttemptArgs) -> ExitCode {
    let partition = Partition::new(args.partition, args.offset, args.length);
    let failure = FailureConfig::new(args.crash_rate);
    let mut rng = rand::thread_rng();

    match run_attempt(&ByteCounter::new(), &args.path, &partition, failure, &mut rng) {
        Ok(AttemptOutcome::Success(triple)) => {
            let written = CountMessage::from(triple)
                .encode_json()
                .map_err(|e| io::Error::other(e.to_string()))
                .and_then(|line| {
                    let mut stdout = io::stdout().lock();
                    writeln!(stdout, "{line}")?;
                    stdout.flush()
                });
            match written {
                Ok(()) => ExitCode::SUCCESS,
                // parent treats this as a crash and relaunches
                Err(_) => ExitCode::FAILURE,
            }
        }
        Ok(AttemptOutcome::Crashed { .. }) => ExitCode::from(EXIT_CRASHED as u8),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(EXIT_RANGE_ERROR as u8)
        }
    }
}
