//! Wait queue for processes sleeping between dispatch turns.

use super::process::Process;

/// Processes parked between turns, each with its own countdown.
///
/// Entries are unordered with respect to each other; iteration follows
/// parking order for stable monitor output.
#[derive(Debug, Clone, Default)]
pub struct WaitQueue {
    entries: Vec<Process>,
}

impl WaitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks a process for `period` ticks.
    pub fn park(&mut self, mut process: Process) {
        process.sleep_ticks = process.period;
        self.entries.push(process);
    }

    /// Advances every entry by one tick.
    ///
    /// Entries whose countdown reaches zero are removed and returned in
    /// parking order, ready for re-admission. A process parked with
    /// `sleep_ticks = w` is returned by the `max(w, 1)`-th call.
    pub fn age(&mut self) -> Vec<Process> {
        for process in &mut self.entries {
            process.sleep_ticks = process.sleep_ticks.saturating_sub(1);
        }

        let (expired, sleeping): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|p| p.sleep_ticks == 0);
        self.entries = sleeping;
        expired
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_releases_after_exact_ticks() {
        let mut wq = WaitQueue::new();
        wq.park(Process::foreground(1, "x").with_period(3));

        assert!(wq.age().is_empty());
        assert!(wq.age().is_empty());
        assert_eq!(wq.iter().next().map(|p| p.sleep_ticks), Some(1));

        let released = wq.age();
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].id.0, 1);
        assert!(wq.is_empty());
    }

    #[test]
    fn test_zero_period_released_on_next_age() {
        let mut wq = WaitQueue::new();
        wq.park(Process::background(1, "x").with_period(0));

        assert_eq!(wq.age().len(), 1);
    }

    #[test]
    fn test_age_preserves_class_and_promoted_flag() {
        let mut wq = WaitQueue::new();
        let mut p = Process::background(5, "x").with_period(1);
        p.promoted = true;
        wq.park(p);

        let released = wq.age();
        assert!(!released[0].is_foreground());
        assert!(released[0].promoted);
    }

    #[test]
    fn test_mixed_periods_release_in_parking_order() {
        let mut wq = WaitQueue::new();
        wq.park(Process::foreground(1, "x").with_period(2));
        wq.park(Process::foreground(2, "x").with_period(1));
        wq.park(Process::foreground(3, "x").with_period(2));

        let first: Vec<u64> = wq.age().iter().map(|p| p.id.0).collect();
        assert_eq!(first, vec![2]);
        let second: Vec<u64> = wq.age().iter().map(|p| p.id.0).collect();
        assert_eq!(second, vec![1, 3]);
    }
}
