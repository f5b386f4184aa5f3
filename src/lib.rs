//! mlfq-sched: multilevel stacked-queue process scheduler simulator.
//!
//! This library provides a scheduling engine that dispatches textual
//! commands from foreground and background submissions through a stack of
//! priority levels, with periodic starvation-prevention promotion and
//! level splitting, plus the collaborators needed to run it end to end.

// Core modules
pub mod cli;
pub mod error;
pub mod executor;
pub mod monitor;
pub mod scheduler;
pub mod submission;

// Re-export commonly used error types
pub use error::{CommandError, ConfigError, SchedulerError, SubmissionError};
