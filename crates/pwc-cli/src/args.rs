//! Command-line surface.
//!
//! Positional arguments keep the classic `wc`-style shape
//! `pwc <filename> [# partitions] [crash rate]`; out-of-range or non-numeric
//! values are clamped rather than rejected.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pwc_core::domain::{Backoff, RetryPolicy, RunConfig};
use pwc_core::impls::ATTEMPT_SUBCOMMAND;

use crate::error::CliError;

pub const USAGE: &str = "usage: pwc <filename> [# partitions] [crash rate]";

#[derive(Debug, Parser)]
#[command(
    name = "pwc",
    version,
    about = "Count lines, words and bytes with one supervised worker per partition",
    args_conflicts_with_subcommands = true,
    disable_help_subcommand = true,
    allow_negative_numbers = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<ChildCommand>,

    /// Input file
    pub file: Option<PathBuf>,

    /// Number of partitions, clamped to 1..=10
    pub partitions: Option<String>,

    /// Per-attempt crash probability in percent, clamped to 0..=50
    pub crash_rate: Option<String>,

    /// Where each worker attempt runs
    #[arg(long, value_enum, default_value_t = Isolation::Task)]
    pub isolation: Isolation,

    /// Give up on a partition after this many attempts (default: never)
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Exponential backoff between attempts, starting at this many milliseconds
    #[arg(long, value_name = "MS")]
    pub backoff_ms: Option<u64>,

    /// Print per-partition attempt counts after the report
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum ChildCommand {
    /// Run one worker attempt and report through the exit status
    #[command(name = ATTEMPT_SUBCOMMAND, hide = true)]
    Attempt(AttemptArgs),
}

#[derive(Debug, Args)]
pub struct AttemptArgs {
    pub path: PathBuf,

    #[arg(long)]
    pub partition: usize,

    #[arg(long)]
    pub offset: u64,

    #[arg(long)]
    pub length: u64,

    #[arg(long, default_value_t = 0)]
    pub crash_rate: i64,
}

/// Worker implementation selection.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Isolation {
    /// Attempts run on blocking tasks inside this process
    Task,
    /// Every attempt is a fresh child process
    Process,
}

/// Parse like C `atoi`: optional sign, leading digits, anything else ignored.
/// No digits gives 0.
pub fn leading_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
    }
    if negative { -value } else { value }
}

impl Cli {
    pub fn retry_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::unbounded();
        if let Some(max) = self.max_attempts {
            policy = policy.with_max_attempts(max);
        }
        if let Some(ms) = self.backoff_ms {
            policy = policy.with_backoff(Backoff::exponential(Duration::from_millis(ms)));
        }
        policy
    }

    /// Resolve the run configuration for `file`.
    pub fn run_config(&self, file: PathBuf) -> Result<RunConfig, CliError> {
        // partitions: missing -> 1, non-numeric -> 0 -> clamped to 1
        let partitions = self.partitions.as_deref().map(leading_int).unwrap_or(1);
        let crash = self.crash_rate.as_deref().map(leading_int).unwrap_or(0);

        Ok(RunConfig::builder(file)
            .partitions(partitions)
            .crash_probability_percent(crash)
            .retry(self.retry_policy())
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("7", 7)]
    #[case::negative("-3", -3)]
    #[case::plus("+4", 4)]
    #[case::trailing_garbage("12abc", 12)]
    #[case::leading_space("  9", 9)]
    #[case::not_a_number("abc", 0)]
    #[case::empty("", 0)]
    #[case::huge("99999999999999999999999", i64::MAX)]
    fn leading_int_behaves_like_atoi(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(leading_int(raw), expected);
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pwc").chain(args.iter().copied())).unwrap()
    }

    #[rstest]
    #[case::defaults(&["f.txt"], 1, 0)]
    #[case::explicit(&["f.txt", "4", "20"], 4, 20)]
    #[case::clamped_high(&["f.txt", "25", "80"], 10, 50)]
    #[case::clamped_low(&["f.txt", "-2", "-7"], 1, 0)]
    #[case::non_numeric(&["f.txt", "many", "lots"], 1, 0)]
    fn positional_arguments_are_clamped(
        #[case] args: &[&str],
        #[case] partitions: usize,
        #[case] crash: u8,
    ) {
        let cli = parse(args);
        let file = cli.file.clone().unwrap();
        let cfg = cli.run_config(file).unwrap();
        assert_eq!(cfg.partitions, partitions);
        assert_eq!(cfg.failure.crash_probability_percent(), crash);
    }

    #[test]
    fn help_is_a_file_name_not_a_subcommand() {
        let cli = parse(&["help", "2", "0"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.file, Some(PathBuf::from("help")));
        assert_eq!(cli.partitions.as_deref(), Some("2"));
    }

    #[test]
    fn no_arguments_leaves_file_unset() {
        let cli = parse(&[]);
        assert!(cli.file.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn retry_flags_build_a_bounded_policy() {
        let cli = parse(&["f.txt", "--max-attempts", "5", "--backoff-ms", "10"]);
        let policy = cli.retry_policy();
        assert_eq!(policy.max_attempts, Some(5));
        assert_eq!(
            policy.backoff.map(|b| b.base_delay),
            Some(Duration::from_millis(10))
        );
    }

    #[test]
    fn zero_max_attempts_is_rejected() {
        let cli = parse(&["f.txt", "--max-attempts", "0"]);
        let err = cli.run_config(PathBuf::from("f.txt")).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn hidden_attempt_subcommand_parses() {
        let cli = parse(&[
            ATTEMPT_SUBCOMMAND,
            "data.txt",
            "--partition",
            "1",
            "--offset",
            "5",
            "--length",
            "9",
            "--crash-rate",
            "10",
        ]);
        match cli.command {
            Some(ChildCommand::Attempt(a)) => {
                assert_eq!(a.path, PathBuf::from("data.txt"));
                assert_eq!((a.partition, a.offset, a.length, a.crash_rate), (1, 5, 9, 10));
            }
            None => panic!("expected attempt subcommand"),
        }
    }

    #[test]
    fn isolation_flag_selects_process_mode() {
        let cli = parse(&["f.txt", "--isolation", "process"]);
        assert_eq!(cli.isolation, Isolation::Process);
    }
}
