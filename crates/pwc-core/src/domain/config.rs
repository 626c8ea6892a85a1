//! Run configuration: resolved once at startup, read-only afterwards.
//!
//! # 学習ポイント
//! - clamp は builder の中だけで行う（下流は常に正規化済みの値を見る）
//! - 設定は `Arc<RunConfig>` で共有し、グローバル状態は持たない

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MIN_PARTITIONS: usize = 1;
pub const MAX_PARTITIONS: usize = 10;
pub const MAX_CRASH_PERCENT: u8 = 50;

/// Per-attempt crash injection, identical for every attempt of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureConfig {
    crash_probability_percent: u8,
}

impl FailureConfig {
    /// Clamp `percent` into `0..=50`.
    pub fn new(percent: i64) -> Self {
        let clamped = percent.clamp(0, MAX_CRASH_PERCENT as i64) as u8;
        Self {
            crash_probability_percent: clamped,
        }
    }

    pub fn never() -> Self {
        Self::default()
    }

    pub fn crash_probability_percent(&self) -> u8 {
        self.crash_probability_percent
    }

    /// Draw once: `true` with probability `percent / 100`.
    pub fn should_crash<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        self.crash_probability_percent > 0
            && rng.gen_range(0u8..100) < self.crash_probability_percent
    }
}

/// Exponential delay between attempts of the same partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    /// Delay after the first failure.
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Backoff {
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

    pub fn exponential(base_delay: Duration) -> Self {
        Self {
            base_delay,
            multiplier: 2.0,
            max_delay: Self::DEFAULT_MAX_DELAY,
        }
    }

    /// delay = base_delay * multiplier^(failures - 1), capped at `max_delay`.
    pub fn next_delay(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(63) as i32;
        let nanos = self.base_delay.as_nanos() as f64 * self.multiplier.powi(exponent);
        if !nanos.is_finite() || nanos >= self.max_delay.as_nanos() as f64 {
            return self.max_delay;
        }
        Duration::from_nanos(nanos as u64)
    }
}

/// How a supervisor reacts to a crashed attempt.
///
/// The default retries forever with no delay. A cap or a backoff are opt-in
/// extensions; with the default a partition that never succeeds stalls the
/// whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
    pub backoff: Option<Backoff>,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Whether another attempt may start after `attempts` have been made.
    pub fn allows_another(&self, attempts: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts < max)
    }

    /// Pause before the next attempt, if any.
    pub fn delay_after(&self, failures: u32) -> Option<Duration> {
        self.backoff.as_ref().map(|b| b.next_delay(failures))
    }
}

/// Everything a run needs, fixed before the first partition starts.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub path: PathBuf,
    pub partitions: usize,
    pub failure: FailureConfig,
    pub retry: RetryPolicy,
}

impl RunConfig {
    pub fn builder(path: impl Into<PathBuf>) -> RunConfigBuilder {
        RunConfigBuilder::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BuildError {
    #[error("max attempts must be at least 1")]
    ZeroMaxAttempts,

    #[error("backoff multiplier must be finite and >= 1.0, got {0}")]
    BadMultiplier(f64),
}

/// Builds a [`RunConfig`], clamping raw inputs and rejecting inconsistent
/// retry settings in `build()`.
#[derive(Debug)]
pub struct RunConfigBuilder {
    path: PathBuf,
    partitions: i64,
    crash_probability_percent: i64,
    retry: RetryPolicy,
}

impl RunConfigBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            partitions: MIN_PARTITIONS as i64,
            crash_probability_percent: 0,
            retry: RetryPolicy::unbounded(),
        }
    }

    /// Clamped into `1..=10` at build time.
    pub fn partitions(mut self, n: i64) -> Self {
        self.partitions = n;
        self
    }

    /// Clamped into `0..=50` at build time.
    pub fn crash_probability_percent(mut self, percent: i64) -> Self {
        self.crash_probability_percent = percent;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<RunConfig, BuildError> {
        if self.retry.max_attempts == Some(0) {
            return Err(BuildError::ZeroMaxAttempts);
        }
        if let Some(backoff) = &self.retry.backoff
            && !(backoff.multiplier.is_finite() && backoff.multiplier >= 1.0)
        {
            return Err(BuildError::BadMultiplier(backoff.multiplier));
        }

        let partitions = self
            .partitions
            .clamp(MIN_PARTITIONS as i64, MAX_PARTITIONS as i64) as usize;

        Ok(RunConfig {
            path: self.path,
            partitions,
            failure: FailureConfig::new(self.crash_probability_percent),
            retry: self.retry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    #[rstest]
    #[case::negative(-5, 1)]
    #[case::zero(0, 1)]
    #[case::in_range(4, 4)]
    #[case::upper_bound(10, 10)]
    #[case::too_many(11, 10)]
    fn partitions_are_clamped(#[case] raw: i64, #[case] expected: usize) {
        let cfg = RunConfig::builder("f").partitions(raw).build().unwrap();
        assert_eq!(cfg.partitions, expected);
    }

    #[rstest]
    #[case::negative(-1, 0)]
    #[case::zero(0, 0)]
    #[case::in_range(25, 25)]
    #[case::upper_bound(50, 50)]
    #[case::too_high(99, 50)]
    fn crash_probability_is_clamped(#[case] raw: i64, #[case] expected: u8) {
        assert_eq!(FailureConfig::new(raw).crash_probability_percent(), expected);
    }

    #[test]
    fn zero_percent_never_crashes() {
        let failure = FailureConfig::never();
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..10_000).all(|_| !failure.should_crash(&mut rng)));
    }

    #[test]
    fn fifty_percent_crashes_about_half_the_time() {
        let failure = FailureConfig::new(50);
        let mut rng = StdRng::seed_from_u64(42);
        let crashes = (0..10_000).filter(|_| failure.should_crash(&mut rng)).count();
        assert!((4_000..6_000).contains(&crashes), "crashes={crashes}");
    }

    #[test]
    fn default_retry_policy_is_unbounded_without_delay() {
        let policy = RetryPolicy::unbounded();
        assert!(policy.allows_another(u32::MAX - 1));
        assert_eq!(policy.delay_after(3), None);
    }

    #[test]
    fn max_attempts_caps_retries() {
        let policy = RetryPolicy::unbounded().with_max_attempts(3);
        assert!(policy.allows_another(2));
        assert!(!policy.allows_another(3));
    }

    #[test]
    fn exponential_backoff_increases_and_caps() {
        let backoff = Backoff::exponential(Duration::from_millis(100));
        assert_eq!(backoff.next_delay(1), Duration::from_millis(100));
        assert_eq!(backoff.next_delay(2), Duration::from_millis(200));
        assert_eq!(backoff.next_delay(3), Duration::from_millis(400));
        assert_eq!(backoff.next_delay(40), Backoff::DEFAULT_MAX_DELAY);
    }

    #[test]
    fn build_rejects_zero_max_attempts() {
        let err = RunConfig::builder("f")
            .retry(RetryPolicy::unbounded().with_max_attempts(0))
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::ZeroMaxAttempts);
    }
}
