//! Error types for mlfq-sched operations.
//!
//! Defines error types for the subsystems around the scheduling core:
//! - Configuration loading and validation
//! - Command execution by the built-in executor
//! - Reading submissions from a command source
//! - Scheduler lifecycle
//!
//! Queue-level failures live next to the queue in
//! [`crate::scheduler::QueueError`].

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors reported by a command executor for a single command.
///
/// These are contained to one dispatch turn and never stop the scheduler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Failed to parse argument '{argument}' of '{command}' as a number")]
    Parse { command: String, argument: String },

    #[error("Argument {argument} of '{command}' exceeds the limit of {limit}")]
    LimitExceeded {
        command: String,
        argument: i64,
        limit: u64,
    },

    #[error("Command '{0}' panicked during execution")]
    Panicked(String),

    #[error("Failed to write output of '{command}': {message}")]
    Output { command: String, message: String },
}

/// Errors that can occur while reading submissions.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Command source '{path}' is unavailable: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur in the scheduler lifecycle.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Dispatcher is already running")]
    AlreadyRunning,

    #[error("Dispatcher task failed: {0}")]
    DispatcherFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
