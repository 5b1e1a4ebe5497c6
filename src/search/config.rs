//! Search budget and worker pool configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for a parallel schedule search.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tourney_gen::search::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_num_threads(2)
///     .with_eval_max(50_000)
///     .with_time_max_minutes(5)
///     .with_seed(42);
/// assert_eq!(config.time_max, Duration::from_secs(300));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of independent search workers.
    pub num_threads: usize,

    /// Stop once this many attempts have been evaluated across all workers.
    pub eval_max: u64,

    /// Stop once the run has lasted this long.
    pub time_max: Duration,

    /// Evaluations per telemetry message. Partial batches are never sent.
    pub telemetry_interval: u64,

    /// Base seed. Worker `i` uses `seed + i`; `None` seeds every worker from
    /// fresh entropy.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_threads: 6,
            eval_max: 1_000_000_000,
            time_max: Duration::from_secs(60 * 60),
            telemetry_interval: 100_000,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = n;
        self
    }

    pub fn with_eval_max(mut self, n: u64) -> Self {
        self.eval_max = n;
        self
    }

    pub fn with_time_max(mut self, d: Duration) -> Self {
        self.time_max = d;
        self
    }

    pub fn with_time_max_minutes(self, minutes: u64) -> Self {
        self.with_time_max(Duration::from_secs(minutes.saturating_mul(60)))
    }

    pub fn with_telemetry_interval(mut self, n: u64) -> Self {
        self.telemetry_interval = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_threads == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.telemetry_interval == 0 {
            return Err(ConfigError::ZeroTelemetryInterval);
        }
        Ok(())
    }
}
