//! Command-line interface for mlfq-sched.
//!
//! Provides commands for running the scheduler simulation, executing single
//! commands, and inspecting command files.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
