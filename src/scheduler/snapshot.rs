//! Read-only views of scheduler state for monitoring.
//!
//! [`render`] produces the monitor text directly from the live structures
//! and is meant to be called while the scheduler lock is held, so a render
//! always reflects one consistent instant:
//!
//! ```text
//! Running: [1B]
//! ---------------------------
//! DQ: 1F 4B* 2F
//! ---------------------------
//! WQ: 3F:2 5B:1
//! ---------------------------
//! ```
//!
//! `DQ` lists the queue stack in dispatch order with `*` marking promoted
//! processes. `WQ` lists the wait queue with remaining sleep ticks.
//! [`StateSnapshot`] is the structured equivalent for JSON output.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::process::{ProcessClass, ProcessId};
use super::queue::QueueStack;
use super::wait_queue::WaitQueue;

const RULE: &str = "---------------------------";
const RUNNING_HEADER: &str = "Running: [1B]";

/// Renders the monitor text for the given queue stack and wait queue.
pub fn render(stack: &QueueStack, wait: &WaitQueue) -> String {
    write_monitor_text(
        stack.iter().map(|p| (p.label(), p.promoted)),
        wait.iter().map(|p| (p.label(), p.sleep_ticks)),
    )
}

fn write_monitor_text(
    queued: impl Iterator<Item = (String, bool)>,
    waiting: impl Iterator<Item = (String, u32)>,
) -> String {
    let dq: Vec<String> = queued
        .map(|(label, promoted)| if promoted { label + "*" } else { label })
        .collect();
    let wq: Vec<String> = waiting
        .map(|(label, ticks)| format!("{}:{}", label, ticks))
        .collect();

    let mut out = String::new();
    // writing to a String cannot fail
    let _ = writeln!(out, "{}", RUNNING_HEADER);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "DQ: {}", dq.join(" "));
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "WQ: {}", wq.join(" "));
    let _ = writeln!(out, "{}", RULE);
    out
}

/// A queued process as seen by the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueuedEntry {
    pub id: ProcessId,
    pub class: ProcessClass,
    pub level: usize,
    pub promoted: bool,
}

/// A sleeping process as seen by the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitingEntry {
    pub id: ProcessId,
    pub class: ProcessClass,
    pub sleep_ticks: u32,
}

/// Structured point-in-time view of the scheduler.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
    /// Process currently held by the dispatcher, if any.
    pub executing: Option<ProcessId>,
    /// Size of each level, front first.
    pub level_sizes: Vec<usize>,
    /// Queue stack contents in dispatch order.
    pub queued: Vec<QueuedEntry>,
    /// Wait queue contents in parking order.
    pub waiting: Vec<WaitingEntry>,
}

impl StateSnapshot {
    /// Captures the given structures. Call with the scheduler lock held.
    pub fn capture(stack: &QueueStack, wait: &WaitQueue, executing: Option<ProcessId>) -> Self {
        let queued = stack
            .levels()
            .enumerate()
            .flat_map(|(level, l)| {
                l.iter().map(move |p| QueuedEntry {
                    id: p.id,
                    class: p.class,
                    level,
                    promoted: p.promoted,
                })
            })
            .collect();

        let waiting = wait
            .iter()
            .map(|p| WaitingEntry {
                id: p.id,
                class: p.class,
                sleep_ticks: p.sleep_ticks,
            })
            .collect();

        Self {
            captured_at: Utc::now(),
            executing,
            level_sizes: stack.level_sizes(),
            queued,
            waiting,
        }
    }

    /// Renders the same text as [`render`] for this snapshot.
    pub fn render(&self) -> String {
        write_monitor_text(
            self.queued
                .iter()
                .map(|e| (format!("{}{}", e.id, e.class.tag()), e.promoted)),
            self.waiting
                .iter()
                .map(|e| (format!("{}{}", e.id, e.class.tag()), e.sleep_ticks)),
        )
    }

    /// Number of live processes visible in this snapshot.
    pub fn live_count(&self) -> usize {
        self.queued.len() + self.waiting.len() + usize::from(self.executing.is_some())
    }
}
