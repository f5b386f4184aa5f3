//! Process definitions for the scheduler.
//!
//! This module defines the unit of schedulable work:
//!
//! - `Process`: A command plus its scheduling bookkeeping
//! - `ProcessId`: Monotonically assigned, never reused identifier
//! - `ProcessClass`: Foreground or background admission class

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of dispatch turns a process needs before it terminates.
pub const DEFAULT_BURSTS: u32 = 5;

/// Default number of ticks a process sleeps in the wait queue between turns.
pub const DEFAULT_PERIOD: u32 = 2;

/// Unique identifier of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub u64);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Admission class of a process, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessClass {
    /// Interactive work. FIFO within the front level.
    Foreground,
    /// Batch work. Inserted at the front of the back level.
    Background,
}

impl ProcessClass {
    /// Single-letter tag used by the monitor output.
    pub fn tag(self) -> char {
        match self {
            ProcessClass::Foreground => 'F',
            ProcessClass::Background => 'B',
        }
    }
}

impl fmt::Display for ProcessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessClass::Foreground => write!(f, "foreground"),
            ProcessClass::Background => write!(f, "background"),
        }
    }
}

/// A unit of schedulable work.
///
/// A process lives in exactly one place at a time: a level of the queue
/// stack, the wait queue, or the dispatcher's hands while it executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// Unique identifier assigned at submission.
    pub id: ProcessId,
    /// Admission class.
    pub class: ProcessClass,
    /// Opaque command text, interpreted only by the executor.
    pub command: String,
    /// Dispatch turns still required. The process terminates at zero.
    pub remaining_bursts: u32,
    /// Ticks to sleep in the wait queue after each turn.
    pub period: u32,
    /// Ticks remaining before re-admission while parked.
    pub sleep_ticks: u32,
    /// Set once the process has been moved by promotion.
    pub promoted: bool,
}

impl Process {
    /// Creates a new process with default bursts and period.
    pub fn new(id: ProcessId, class: ProcessClass, command: impl Into<String>) -> Self {
        Self {
            id,
            class,
            command: command.into(),
            remaining_bursts: DEFAULT_BURSTS,
            period: DEFAULT_PERIOD,
            sleep_ticks: 0,
            promoted: false,
        }
    }

    /// Creates a foreground process.
    pub fn foreground(id: u64, command: impl Into<String>) -> Self {
        Self::new(ProcessId(id), ProcessClass::Foreground, command)
    }

    /// Creates a background process.
    pub fn background(id: u64, command: impl Into<String>) -> Self {
        Self::new(ProcessId(id), ProcessClass::Background, command)
    }

    /// Sets the number of dispatch turns.
    pub fn with_bursts(mut self, bursts: u32) -> Self {
        self.remaining_bursts = bursts;
        self
    }

    /// Sets the sleep period between turns.
    pub fn with_period(mut self, period: u32) -> Self {
        self.period = period;
        self
    }

    /// Returns whether this is foreground work.
    pub fn is_foreground(&self) -> bool {
        self.class == ProcessClass::Foreground
    }

    /// Splits the command text on whitespace for the executor.
    pub fn tokens(&self) -> Vec<String> {
        self.command.split_whitespace().map(str::to_string).collect()
    }

    /// Consumes one burst. Returns whether the process still has work left.
    pub fn consume_burst(&mut self) -> bool {
        self.remaining_bursts = self.remaining_bursts.saturating_sub(1);
        self.remaining_bursts > 0
    }

    /// Short display label, e.g. `3F` or `7B`.
    pub fn label(&self) -> String {
        format!("{}{}", self.id, self.class.tag())
    }
}
