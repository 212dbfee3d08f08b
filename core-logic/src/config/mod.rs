use crate::error::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A randomized pause: uniform whole seconds in `[min_secs, max_secs]`
/// plus or minus up to `jitter_ms` milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    #[serde(default)]
    pub min_secs: u64,
    #[serde(default)]
    pub max_secs: u64,
    #[serde(default)]
    pub jitter_ms: u64,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange {
        min_secs: 0,
        max_secs: 0,
        jitter_ms: 0,
    };

    pub fn new(min_secs: u64, max_secs: u64, jitter_ms: u64) -> Self {
        Self {
            min_secs,
            max_secs,
            jitter_ms,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.max_secs == 0 && self.jitter_ms == 0
    }

    /// Draws one delay from the range. Never negative.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.is_zero() {
            return Duration::ZERO;
        }

        let base_ms = rng.gen_range(self.min_secs..=self.max_secs.max(self.min_secs)) * 1000;
        let jitter = self.jitter_ms as i64;
        let offset = if jitter > 0 {
            rng.gen_range(-jitter..=jitter)
        } else {
            0
        };

        let total_ms = (base_ms as i64 + offset).max(0) as u64;
        Duration::from_millis(total_ms)
    }

    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.min_secs > self.max_secs {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                reason: format!(
                    "min_secs ({}) is greater than max_secs ({})",
                    self.min_secs, self.max_secs
                ),
            });
        }
        Ok(())
    }
}

/// Controls how long the run loop sleeps between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Used when no account reported a next actionable timestamp
    #[serde(default = "default_wait_secs")]
    pub default_wait_secs: u64,
    /// Lower bound for any computed wait
    #[serde(default = "default_min_wait_secs")]
    pub min_wait_secs: u64,
}

fn default_wait_secs() -> u64 {
    5
}

fn default_min_wait_secs() -> u64 {
    5
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            default_wait_secs: default_wait_secs(),
            min_wait_secs: default_min_wait_secs(),
        }
    }
}

impl ScheduleConfig {
    pub fn default_wait(&self) -> Duration {
        Duration::from_secs(self.default_wait_secs)
    }

    pub fn min_wait(&self) -> Duration {
        Duration::from_secs(self.min_wait_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_range_never_sleeps() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(DelayRange::ZERO.sample(&mut rng), Duration::ZERO);
    }

    #[test]
    fn test_sample_stays_within_jittered_bounds() {
        let range = DelayRange::new(10, 20, 500);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let d = range.sample(&mut rng);
            assert!(d >= Duration::from_millis(9_500), "{:?}", d);
            assert!(d <= Duration::from_millis(20_500), "{:?}", d);
        }
    }

    #[test]
    fn test_jitter_never_goes_negative() {
        let range = DelayRange::new(0, 0, 2_000);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            assert!(range.sample(&mut rng) <= Duration::from_millis(2_000));
        }
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = DelayRange::new(5, 1, 0).validate("diamond.claim_delay");
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
    }
}
