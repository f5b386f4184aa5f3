//! Starvation-prevention promotion and split rebalancing.
//!
//! Promotion relocates the process at the head of the top level to the
//! tail of the bottom level, so background work at the bottom is never
//! starved by a busy top tier. Rebalancing keeps every level at or below a
//! size threshold by splitting overgrown levels at their midpoint.
//!
//! # Split point
//!
//! A level of size `n` splits at index `n / 2`. The front `⌊n/2⌋` processes
//! stay in place and the back `⌈n/2⌉` form a new level inserted directly
//! after it. Splitting repeats until every level fits, so a single call
//! always leaves the stack balanced.

use serde::Serialize;
use tracing::debug;

use super::process::ProcessId;
use super::queue::QueueStack;

/// What a single `promote` call changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromotionReport {
    /// The process moved from the top level to the bottom level.
    pub moved: ProcessId,
    /// Number of splits performed by the follow-up rebalance.
    pub splits: usize,
}

impl QueueStack {
    /// Moves the front process of the top level to the back of the bottom
    /// level and marks it promoted.
    ///
    /// Returns `None` without touching the stack when fewer than two levels
    /// exist. If the bottom level then exceeds `threshold`, the stack is
    /// rebalanced.
    pub fn promote(&mut self, threshold: usize) -> Option<PromotionReport> {
        if self.levels.len() < 2 {
            return None;
        }

        let top = self.levels.front_mut()?;
        let mut process = top.pop_front()?;
        if top.is_empty() {
            self.levels.pop_front();
        }

        process.promoted = true;
        let moved = process.id;

        let bottom = self.levels.back_mut()?;
        bottom.push_back(process);
        let bottom_len = bottom.len();

        debug!(process_id = %moved, bottom_len, "Promoted process to bottom level");

        let splits = if bottom_len > threshold {
            self.rebalance(threshold)
        } else {
            0
        };

        Some(PromotionReport { moved, splits })
    }

    /// Splits every level larger than `threshold` until all levels fit.
    ///
    /// Order is preserved: reading the stack front to back yields the same
    /// process sequence before and after. Returns the number of splits.
    /// A `threshold` of zero is treated as one.
    pub fn rebalance(&mut self, threshold: usize) -> usize {
        let threshold = threshold.max(1);
        let mut splits = 0;
        let mut index = 0;

        while index < self.levels.len() {
            let level = &mut self.levels[index];
            if level.len() > threshold {
                let size = level.len();
                let tail = level.split_off(size / 2);
                debug!(
                    level = index,
                    size,
                    kept = level.len(),
                    moved = tail.len(),
                    "Split overgrown level"
                );
                self.levels.insert(index + 1, tail);
                splits += 1;
                // re-check the shrunken level before moving on
                continue;
            }
            index += 1;
        }

        splits
    }
}
