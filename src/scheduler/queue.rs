//! Stacked multilevel run queue.
//!
//! The queue stack is an ordered sequence of [`Level`]s. The front level is
//! the highest priority tier and the back level the lowest. Admission
//! depends on the process class:
//!
//! - Foreground processes are appended to the back of the front level, so
//!   they run FIFO within that level.
//! - Background processes are inserted at the front of the back level, so
//!   the most recent background submission runs ahead of older ones there.
//!
//! A level is removed the instant it becomes empty, so the stack never holds
//! an empty level between operations.

use std::collections::VecDeque;

use thiserror::Error;

use super::process::{Process, ProcessClass};

/// Errors that can occur during queue operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// Dequeue was attempted on a stack with no runnable process.
    #[error("Queue is empty")]
    EmptyQueue,
}

/// One priority tier of the queue stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Level {
    processes: VecDeque<Process>,
}

impl Level {
    /// Creates an empty level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a level holding a single process.
    pub fn with_process(process: Process) -> Self {
        let mut level = Self::new();
        level.push_back(process);
        level
    }

    pub fn push_back(&mut self, process: Process) {
        self.processes.push_back(process);
    }

    pub fn push_front(&mut self, process: Process) {
        self.processes.push_front(process);
    }

    pub fn pop_front(&mut self) -> Option<Process> {
        self.processes.pop_front()
    }

    pub fn front(&self) -> Option<&Process> {
        self.processes.front()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Iterates front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter()
    }

    /// Splits off everything from `at` onward into a new level.
    ///
    /// The front `at` processes stay in `self`.
    pub fn split_off(&mut self, at: usize) -> Level {
        Level {
            processes: self.processes.split_off(at),
        }
    }
}

impl FromIterator<Process> for Level {
    fn from_iter<I: IntoIterator<Item = Process>>(iter: I) -> Self {
        Level {
            processes: iter.into_iter().collect(),
        }
    }
}

/// Ordered sequence of levels, front = highest priority.
#[derive(Debug, Clone, Default)]
pub struct QueueStack {
    pub(crate) levels: VecDeque<Level>,
}

impl QueueStack {
    /// Creates an empty queue stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a stack from prepared levels. Empty levels are dropped.
    pub fn from_levels(levels: impl IntoIterator<Item = Level>) -> Self {
        Self {
            levels: levels.into_iter().filter(|l| !l.is_empty()).collect(),
        }
    }

    /// Admits a process according to its class.
    pub fn enqueue(&mut self, process: Process) {
        match process.class {
            ProcessClass::Foreground => {
                self.drop_empty_front();
                match self.levels.front_mut() {
                    Some(front) => front.push_back(process),
                    None => self.levels.push_front(Level::with_process(process)),
                }
            }
            ProcessClass::Background => match self.levels.back_mut() {
                Some(back) => back.push_front(process),
                None => self.levels.push_back(Level::with_process(process)),
            },
        }
    }

    /// Removes and returns the front process of the front level.
    ///
    /// The front level is dropped from the stack if this empties it.
    pub fn dequeue(&mut self) -> Result<Process, QueueError> {
        let front = self.levels.front_mut().ok_or(QueueError::EmptyQueue)?;
        let process = front.pop_front().ok_or(QueueError::EmptyQueue)?;
        if front.is_empty() {
            self.levels.pop_front();
        }
        Ok(process)
    }

    /// Returns the process that the next `dequeue` would yield.
    pub fn peek(&self) -> Option<&Process> {
        self.levels.front().and_then(Level::front)
    }

    /// Total number of processes across all levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(Level::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Level::is_empty)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Sizes of every level, front first.
    pub fn level_sizes(&self) -> Vec<usize> {
        self.levels.iter().map(Level::len).collect()
    }

    pub fn levels(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }

    /// Iterates every process in dispatch order: level by level, front
    /// level first, front to back within a level.
    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.levels.iter().flat_map(Level::iter)
    }

    fn drop_empty_front(&mut self) {
        while self.levels.front().is_some_and(Level::is_empty) {
            self.levels.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(stack: &QueueStack) -> Vec<u64> {
        stack.iter().map(|p| p.id.0).collect()
    }

    #[test]
    fn test_dequeue_empty_stack() {
        let mut stack = QueueStack::new();
        assert_eq!(stack.dequeue(), Err(QueueError::EmptyQueue));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_foreground_fifo() {
        let mut stack = QueueStack::new();
        stack.enqueue(Process::foreground(1, "a"));
        stack.enqueue(Process::foreground(2, "b"));

        assert_eq!(stack.level_count(), 1);
        assert_eq!(stack.dequeue().map(|p| p.id.0), Ok(1));
        assert_eq!(stack.dequeue().map(|p| p.id.0), Ok(2));
        assert_eq!(stack.level_count(), 0);
    }

    #[test]
    fn test_background_front_insertion() {
        let mut stack = QueueStack::new();
        stack.enqueue(Process::background(1, "a"));
        stack.enqueue(Process::background(2, "b"));
        stack.enqueue(Process::background(3, "c"));

        assert_eq!(ids(&stack), vec![3, 2, 1]);
        assert_eq!(stack.dequeue().map(|p| p.id.0), Ok(3));
    }

    #[test]
    fn test_background_goes_to_back_level() {
        let mut stack = QueueStack::from_levels(vec![
            Level::from_iter([Process::foreground(1, "a")]),
            Level::from_iter([Process::foreground(2, "b"), Process::foreground(3, "c")]),
        ]);
        stack.enqueue(Process::background(4, "d"));
        stack.enqueue(Process::foreground(5, "e"));

        assert_eq!(stack.level_sizes(), vec![2, 3]);
        assert_eq!(ids(&stack), vec![1, 5, 4, 2, 3]);
    }

    #[test]
    fn test_foreground_and_background_share_single_level() {
        let mut stack = QueueStack::new();
        stack.enqueue(Process::foreground(1, "a"));
        stack.enqueue(Process::background(2, "b"));

        assert_eq!(stack.level_count(), 1);
        assert_eq!(ids(&stack), vec![2, 1]);
    }

    #[test]
    fn test_empty_front_level_removed_on_dequeue() {
        let mut stack = QueueStack::from_levels(vec![
            Level::from_iter([Process::foreground(1, "a")]),
            Level::from_iter([Process::background(2, "b")]),
        ]);

        stack.dequeue().expect("front process");
        assert_eq!(stack.level_count(), 1);
        assert_eq!(stack.peek().map(|p| p.id.0), Some(2));
    }

    #[test]
    fn test_from_levels_drops_empty() {
        let stack = QueueStack::from_levels(vec![
            Level::new(),
            Level::from_iter([Process::foreground(1, "a")]),
        ]);
        assert_eq!(stack.level_count(), 1);
    }

    #[test]
    fn test_count_tracks_enqueues_minus_dequeues() {
        let mut stack = QueueStack::new();
        let mut expected = 0usize;
        for i in 0..20u64 {
            if i % 3 == 0 {
                stack.enqueue(Process::background(i, "x"));
            } else {
                stack.enqueue(Process::foreground(i, "x"));
            }
            expected += 1;
            assert_eq!(stack.len(), expected);
            if i % 4 == 0 {
                stack.dequeue().expect("non-empty");
                expected -= 1;
                assert_eq!(stack.len(), expected);
            }
        }
        while stack.dequeue().is_ok() {
            expected -= 1;
        }
        assert_eq!(expected, 0);
        assert_eq!(stack.level_count(), 0);
    }

    #[test]
    fn test_level_split_off() {
        let mut level: Level = (1..=5).map(|i| Process::foreground(i, "x")).collect();
        let tail = level.split_off(2);

        assert_eq!(level.iter().map(|p| p.id.0).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(tail.iter().map(|p| p.id.0).collect::<Vec<_>>(), vec![3, 4, 5]);
    }
}
