//! Scheduler configuration.
//!
//! Values are resolved with the precedence: defaults, then an optional YAML
//! file, then `MLFQ_*` environment variables, then command-line flags.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::process::{DEFAULT_BURSTS, DEFAULT_PERIOD};
use crate::error::ConfigError;

/// Configuration for the scheduler and its periodic collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Upper bound on the dispatcher's idle wait, in milliseconds.
    pub tick_ms: u64,
    /// Promotion cadence in milliseconds. Zero disables the timer.
    pub promote_interval_ms: u64,
    /// Maximum level size before a split.
    pub split_threshold: usize,
    /// Dispatch turns given to newly submitted processes.
    pub default_bursts: u32,
    /// Sleep ticks between turns for newly submitted processes.
    pub default_period: u32,
    /// Delay between consecutive submissions, in milliseconds.
    pub submit_interval_ms: u64,
    /// Monitor render cadence in milliseconds. Zero disables the monitor.
    pub monitor_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            promote_interval_ms: 5000,
            split_threshold: 4,
            default_bursts: DEFAULT_BURSTS,
            default_period: DEFAULT_PERIOD,
            submit_interval_ms: 5000,
            monitor_interval_ms: 10000,
        }
    }
}

impl SchedulerConfig {
    /// Loads configuration from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Builds a configuration from defaults overridden by the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Applies `MLFQ_*` environment variable overrides.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(val) = std::env::var("MLFQ_TICK_MS") {
            self.tick_ms = parse_env_value(&val, "MLFQ_TICK_MS")?;
        }
        if let Ok(val) = std::env::var("MLFQ_PROMOTE_INTERVAL_MS") {
            self.promote_interval_ms = parse_env_value(&val, "MLFQ_PROMOTE_INTERVAL_MS")?;
        }
        if let Ok(val) = std::env::var("MLFQ_SPLIT_THRESHOLD") {
            self.split_threshold = parse_env_value(&val, "MLFQ_SPLIT_THRESHOLD")?;
        }
        if let Ok(val) = std::env::var("MLFQ_DEFAULT_BURSTS") {
            self.default_bursts = parse_env_value(&val, "MLFQ_DEFAULT_BURSTS")?;
        }
        if let Ok(val) = std::env::var("MLFQ_DEFAULT_PERIOD") {
            self.default_period = parse_env_value(&val, "MLFQ_DEFAULT_PERIOD")?;
        }
        if let Ok(val) = std::env::var("MLFQ_SUBMIT_INTERVAL_MS") {
            self.submit_interval_ms = parse_env_value(&val, "MLFQ_SUBMIT_INTERVAL_MS")?;
        }
        if let Ok(val) = std::env::var("MLFQ_MONITOR_INTERVAL_MS") {
            self.monitor_interval_ms = parse_env_value(&val, "MLFQ_MONITOR_INTERVAL_MS")?;
        }
        Ok(self)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "tick_ms must be greater than 0".to_string(),
            ));
        }

        if self.split_threshold == 0 {
            return Err(ConfigError::ValidationFailed(
                "split_threshold must be at least 1".to_string(),
            ));
        }

        if self.default_bursts == 0 {
            return Err(ConfigError::ValidationFailed(
                "default_bursts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick_ms = tick.as_millis() as u64;
        self
    }

    pub fn with_promote_interval(mut self, interval: Duration) -> Self {
        self.promote_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_split_threshold(mut self, threshold: usize) -> Self {
        self.split_threshold = threshold;
        self
    }

    pub fn with_default_bursts(mut self, bursts: u32) -> Self {
        self.default_bursts = bursts;
        self
    }

    pub fn with_default_period(mut self, period: u32) -> Self {
        self.default_period = period;
        self
    }

    pub fn with_submit_interval(mut self, interval: Duration) -> Self {
        self.submit_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Promotion cadence, or `None` when disabled.
    pub fn promote_interval(&self) -> Option<Duration> {
        (self.promote_interval_ms > 0).then(|| Duration::from_millis(self.promote_interval_ms))
    }

    pub fn submit_interval(&self) -> Duration {
        Duration::from_millis(self.submit_interval_ms)
    }

    /// Monitor cadence, or `None` when disabled.
    pub fn monitor_interval(&self) -> Option<Duration> {
        (self.monitor_interval_ms > 0).then(|| Duration::from_millis(self.monitor_interval_ms))
    }
}

fn parse_env_value<T: std::str::FromStr>(val: &str, key: &str) -> Result<T, ConfigError> {
    val.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("cannot parse '{}'", val),
    })
}
