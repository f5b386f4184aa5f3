//! Single-consumer dispatcher over the shared queue stack.
//!
//! [`Scheduler`] owns the queue stack and the wait queue behind one mutex.
//! Every mutating operation (admission, dequeue, requeue, aging, promotion,
//! rebalancing) and every render takes that same lock, so no two of them
//! ever overlap. The lock is released while a command executes, so
//! submitters are never blocked by a slow command; since there is exactly
//! one dispatcher, no two commands ever run at the same time.
//!
//! # Dispatcher states
//!
//! ```text
//!   Idle ──► Dispatching ──► Executing ──► Requeueing ──► Idle
//!    │
//!    └──► Stopped (stop requested)
//! ```
//!
//! In `Idle` the dispatcher waits for new work, bounded by the tick
//! interval, so wait-queue aging keeps running with no submissions. Each
//! loop iteration is one tick: at most one dispatch followed by one aging
//! step of the wait queue.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use super::config::SchedulerConfig;
use super::process::{Process, ProcessClass, ProcessId};
use super::queue::QueueStack;
use super::rebalance::PromotionReport;
use super::snapshot::{self, StateSnapshot};
use super::wait_queue::WaitQueue;
use crate::error::SchedulerError;
use crate::executor::CommandExecutor;

/// State of the dispatcher state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DispatcherState {
    /// Waiting for work or the next tick.
    Idle,
    /// Removing the next process from the queue stack.
    Dispatching,
    /// Running a command with the lock released.
    Executing,
    /// Returning an unfinished process to the wait queue.
    Requeueing,
    /// Stop was observed; no further dispatches happen.
    Stopped,
}

impl fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatcherState::Idle => write!(f, "idle"),
            DispatcherState::Dispatching => write!(f, "dispatching"),
            DispatcherState::Executing => write!(f, "executing"),
            DispatcherState::Requeueing => write!(f, "requeueing"),
            DispatcherState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Counters describing scheduler activity since creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    /// Processes admitted through `submit` or `enqueue`.
    pub submitted: u64,
    /// Dispatch turns started.
    pub dispatched: u64,
    /// Processes that consumed their last burst.
    pub completed: u64,
    /// Dispatch turns whose command reported an error.
    pub command_failures: u64,
    /// Successful promotions.
    pub promotions: u64,
    /// Level splits performed by rebalancing.
    pub splits: u64,
    /// Wait-queue entries returned to the queue stack.
    pub readmitted: u64,
}

struct SharedSchedulerStats {
    submitted: AtomicU64,
    dispatched: AtomicU64,
    completed: AtomicU64,
    command_failures: AtomicU64,
    promotions: AtomicU64,
    splits: AtomicU64,
    readmitted: AtomicU64,
}

impl SharedSchedulerStats {
    fn new() -> Self {
        Self {
            submitted: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            command_failures: AtomicU64::new(0),
            promotions: AtomicU64::new(0),
            splits: AtomicU64::new(0),
            readmitted: AtomicU64::new(0),
        }
    }

    fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::SeqCst);
    }

    fn to_stats(&self) -> SchedulerStats {
        SchedulerStats {
            submitted: self.submitted.load(Ordering::SeqCst),
            dispatched: self.dispatched.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
            command_failures: self.command_failures.load(Ordering::SeqCst),
            promotions: self.promotions.load(Ordering::SeqCst),
            splits: self.splits.load(Ordering::SeqCst),
            readmitted: self.readmitted.load(Ordering::SeqCst),
        }
    }
}

/// What one dispatcher tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The process that was dispatched, if any.
    pub dispatched: Option<ProcessId>,
    /// Whether the dispatched process consumed its last burst.
    pub finished: bool,
    /// Processes returned from the wait queue by this tick's aging step.
    pub readmitted: Vec<ProcessId>,
}

struct SchedulerState {
    stack: QueueStack,
    wait: WaitQueue,
    executing: Option<ProcessId>,
    phase: DispatcherState,
}

/// The scheduling engine: queue stack, wait queue and dispatcher.
pub struct Scheduler {
    config: SchedulerConfig,
    state: Mutex<SchedulerState>,
    work_ready: Notify,
    stop_requested: AtomicBool,
    is_running: AtomicBool,
    next_id: AtomicU64,
    stats: SharedSchedulerStats,
}

impl Scheduler {
    /// Creates a scheduler after validating the configuration.
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;

        Ok(Self {
            config,
            state: Mutex::new(SchedulerState {
                stack: QueueStack::new(),
                wait: WaitQueue::new(),
                executing: None,
                phase: DispatcherState::Idle,
            }),
            work_ready: Notify::new(),
            stop_requested: AtomicBool::new(false),
            is_running: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
            stats: SharedSchedulerStats::new(),
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn lock_state(&self) -> MutexGuard<'_, SchedulerState> {
        // no code panics while holding the guard, so a poisoned lock still
        // holds consistent state
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: DispatcherState) {
        let mut state = self.lock_state();
        if state.phase != phase {
            trace!(from = %state.phase, to = %phase, "Dispatcher transition");
            state.phase = phase;
        }
    }

    /// Creates a process with the next id and the configured defaults and
    /// admits it.
    pub fn submit(&self, command: impl Into<String>, class: ProcessClass) -> ProcessId {
        let id = ProcessId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let process = Process::new(id, class, command)
            .with_bursts(self.config.default_bursts)
            .with_period(self.config.default_period);
        self.enqueue(process);
        id
    }

    /// Admits an already-built process and wakes the dispatcher.
    ///
    /// Ids of externally built processes are not checked for uniqueness;
    /// use [`Scheduler::submit`] for monotonic assignment.
    pub fn enqueue(&self, process: Process) {
        let id = process.id;
        let class = process.class;
        {
            let mut state = self.lock_state();
            state.stack.enqueue(process);
        }
        SharedSchedulerStats::add(&self.stats.submitted, 1);
        debug!(process_id = %id, class = %class, "Process admitted");
        self.work_ready.notify_one();
    }

    /// Runs one promotion step. See [`QueueStack::promote`].
    pub fn promote(&self) -> Option<PromotionReport> {
        let report = self
            .lock_state()
            .stack
            .promote(self.config.split_threshold)?;
        SharedSchedulerStats::add(&self.stats.promotions, 1);
        SharedSchedulerStats::add(&self.stats.splits, report.splits as u64);
        Some(report)
    }

    /// Splits overgrown levels. Returns the number of splits.
    pub fn rebalance(&self) -> usize {
        let splits = self
            .lock_state()
            .stack
            .rebalance(self.config.split_threshold);
        SharedSchedulerStats::add(&self.stats.splits, splits as u64);
        splits
    }

    /// Renders the monitor text from one consistent instant.
    pub fn render(&self) -> String {
        let state = self.lock_state();
        snapshot::render(&state.stack, &state.wait)
    }

    /// Captures a structured snapshot from one consistent instant.
    pub fn snapshot(&self) -> StateSnapshot {
        let state = self.lock_state();
        StateSnapshot::capture(&state.stack, &state.wait, state.executing)
    }

    pub fn state(&self) -> DispatcherState {
        self.lock_state().phase
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats.to_stats()
    }

    /// Processes currently in the queue stack.
    pub fn queued_len(&self) -> usize {
        self.lock_state().stack.len()
    }

    /// Processes currently in the wait queue.
    pub fn waiting_len(&self) -> usize {
        self.lock_state().wait.len()
    }

    /// Sizes of the queue stack levels, front first.
    pub fn level_sizes(&self) -> Vec<usize> {
        self.lock_state().stack.level_sizes()
    }

    /// Every live process: queued, waiting, or executing.
    pub fn live_count(&self) -> usize {
        let state = self.lock_state();
        state.stack.len() + state.wait.len() + usize::from(state.executing.is_some())
    }

    /// Raises the stop signal and wakes the dispatcher.
    ///
    /// A command already executing runs to completion; no new dispatch
    /// starts afterwards.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.work_ready.notify_one();
        info!("Stop requested");
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Runs one tick: dispatch at most one process, then age the wait queue.
    ///
    /// Only the dispatcher loop in [`Scheduler::run`] drives ticks, which
    /// keeps the queue stack single-consumer.
    pub(crate) async fn tick(&self, executor: &dyn CommandExecutor) -> TickReport {
        let mut report = TickReport::default();

        if let Some(process) = self.dispatch_next() {
            report.dispatched = Some(process.id);

            let args = process.tokens();
            if let Err(e) = executor.execute(&args).await {
                SharedSchedulerStats::add(&self.stats.command_failures, 1);
                warn!(process_id = %process.id, error = %e, "Command failed");
            }

            report.finished = self.requeue(process);
        }

        report.readmitted = self.age_wait_queue();
        report
    }

    /// Dequeues the next process, checking emptiness under the same lock.
    fn dispatch_next(&self) -> Option<Process> {
        let mut state = self.lock_state();
        if state.stack.is_empty() {
            return None;
        }

        state.phase = DispatcherState::Dispatching;
        match state.stack.dequeue() {
            Ok(process) => {
                state.executing = Some(process.id);
                state.phase = DispatcherState::Executing;
                SharedSchedulerStats::add(&self.stats.dispatched, 1);
                debug!(
                    process_id = %process.id,
                    remaining_bursts = process.remaining_bursts,
                    command = %process.command,
                    "Dispatching process"
                );
                Some(process)
            }
            Err(e) => {
                warn!(error = %e, "Dequeue failed on a non-empty stack");
                state.phase = DispatcherState::Idle;
                None
            }
        }
    }

    /// Consumes one burst and parks the process if it has work left.
    /// Returns whether the process terminated.
    fn requeue(&self, mut process: Process) -> bool {
        let mut state = self.lock_state();
        state.phase = DispatcherState::Requeueing;
        state.executing = None;

        let finished = !process.consume_burst();
        if finished {
            SharedSchedulerStats::add(&self.stats.completed, 1);
            debug!(process_id = %process.id, "Process finished");
        } else {
            trace!(
                process_id = %process.id,
                remaining_bursts = process.remaining_bursts,
                sleep_ticks = process.period,
                "Parking process"
            );
            state.wait.park(process);
        }

        state.phase = DispatcherState::Idle;
        finished
    }

    /// Ages the wait queue by one tick and re-admits expired entries.
    fn age_wait_queue(&self) -> Vec<ProcessId> {
        let mut state = self.lock_state();
        let expired = state.wait.age();
        let ids: Vec<ProcessId> = expired.iter().map(|p| p.id).collect();
        for process in expired {
            state.stack.enqueue(process);
        }
        drop(state);

        if !ids.is_empty() {
            SharedSchedulerStats::add(&self.stats.readmitted, ids.len() as u64);
            debug!(count = ids.len(), "Re-admitted sleeping processes");
        }
        ids
    }

    /// Waits until the stack holds work, stop is requested, or one tick
    /// elapses. A wakeup stored while a command was executing does not cut
    /// the idle tick short once the stack turns out to be empty.
    async fn wait_for_work(&self) {
        let deadline = Instant::now() + self.config.tick();
        loop {
            if self.is_stop_requested() || !self.lock_state().stack.is_empty() {
                return;
            }
            // a timeout is the normal idle path
            if tokio::time::timeout_at(deadline, self.work_ready.notified())
                .await
                .is_err()
            {
                return;
            }
        }
    }

    /// Dispatcher main loop. Returns once stop has been observed.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::AlreadyRunning` if another dispatcher loop
    /// is active on this scheduler.
    pub async fn run(&self, executor: Arc<dyn CommandExecutor>) -> Result<(), SchedulerError> {
        if self.is_running.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(
            tick_ms = self.config.tick_ms,
            split_threshold = self.config.split_threshold,
            "Dispatcher started"
        );

        loop {
            self.set_phase(DispatcherState::Idle);
            if self.is_stop_requested() {
                break;
            }

            self.wait_for_work().await;

            if self.is_stop_requested() {
                self.age_wait_queue();
                break;
            }

            self.tick(executor.as_ref()).await;
        }

        self.set_phase(DispatcherState::Stopped);
        self.is_running.store(false, Ordering::SeqCst);

        let stats = self.stats();
        info!(
            dispatched = stats.dispatched,
            completed = stats.completed,
            command_failures = stats.command_failures,
            remaining = self.live_count(),
            "Dispatcher stopped"
        );
        Ok(())
    }

    /// Spawns the dispatcher loop on the runtime.
    pub fn spawn(
        self: &Arc<Self>,
        executor: Arc<dyn CommandExecutor>,
    ) -> JoinHandle<Result<(), SchedulerError>> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.run(executor).await })
    }

    /// Waits until no live process remains, polling once per tick.
    pub async fn wait_until_drained(&self) {
        while self.live_count() > 0 && !self.is_stop_requested() {
            tokio::time::sleep(self.config.tick()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    use crate::error::CommandError;

    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl CommandExecutor for RecordingExecutor {
        async fn execute(&self, args: &[String]) -> Result<(), CommandError> {
            self.calls.lock().expect("calls lock").push(args.to_vec());
            if args.first().map(String::as_str) == Some("fail") {
                return Err(CommandError::Parse {
                    command: "fail".to_string(),
                    argument: "x".to_string(),
                });
            }
            Ok(())
        }
    }

    impl RecordingExecutor {
        fn commands(&self) -> Vec<String> {
            self.calls
                .lock()
                .expect("calls lock")
                .iter()
                .map(|c| c.join(" "))
                .collect()
        }
    }

    fn scheduler(bursts: u32, period: u32) -> Scheduler {
        let config = SchedulerConfig::default()
            .with_tick(Duration::from_millis(10))
            .with_default_bursts(bursts)
            .with_default_period(period);
        Scheduler::new(config).expect("valid config")
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SchedulerConfig::default().with_split_threshold(0);
        assert!(matches!(
            Scheduler::new(config),
            Err(SchedulerError::Config(_))
        ));
    }

    #[test]
    fn test_submit_assigns_monotonic_ids() {
        let s = scheduler(1, 0);
        let a = s.submit("echo a", ProcessClass::Foreground);
        let b = s.submit("echo b", ProcessClass::Background);

        assert_eq!(a, ProcessId(0));
        assert_eq!(b, ProcessId(1));
        assert_eq!(s.queued_len(), 2);
        assert_eq!(s.stats().submitted, 2);
    }

    #[tokio::test]
    async fn test_tick_on_empty_scheduler() {
        let s = scheduler(1, 0);
        let executor = RecordingExecutor::default();

        let report = s.tick(&executor).await;
        assert_eq!(report, TickReport::default());
        assert!(executor.commands().is_empty());
        assert_eq!(s.state(), DispatcherState::Idle);
    }

    #[tokio::test]
    async fn test_tick_finishes_single_burst_process() {
        let s = scheduler(1, 0);
        let executor = RecordingExecutor::default();
        let id = s.submit("echo  hi", ProcessClass::Foreground);

        let report = s.tick(&executor).await;

        assert_eq!(report.dispatched, Some(id));
        assert!(report.finished);
        assert_eq!(executor.commands(), vec!["echo hi"]);
        assert_eq!(s.live_count(), 0);
        assert_eq!(s.stats().completed, 1);
    }

    #[tokio::test]
    async fn test_tick_parks_and_readmits_after_period() {
        let s = scheduler(2, 2);
        let executor = RecordingExecutor::default();
        let id = s.submit("dummy", ProcessClass::Foreground);

        // tick 1: dispatch, park with 2 ticks, age to 1
        let report = s.tick(&executor).await;
        assert_eq!(report.dispatched, Some(id));
        assert!(!report.finished);
        assert!(report.readmitted.is_empty());
        assert_eq!(s.waiting_len(), 1);
        assert!(s.render().contains("WQ: 0F:1"));

        // tick 2: nothing queued, aging expires the entry
        let report = s.tick(&executor).await;
        assert_eq!(report.dispatched, None);
        assert_eq!(report.readmitted, vec![id]);
        assert_eq!(s.queued_len(), 1);

        // tick 3: last burst
        let report = s.tick(&executor).await;
        assert!(report.finished);
        assert_eq!(s.live_count(), 0);
        assert_eq!(s.stats().readmitted, 1);
    }

    #[tokio::test]
    async fn test_readmission_preserves_class_and_promoted() {
        let s = scheduler(2, 1);
        let executor = RecordingExecutor::default();
        let mut process = Process::background(42, "dummy").with_bursts(2).with_period(1);
        process.promoted = true;
        s.enqueue(process);

        s.tick(&executor).await;

        let snap = s.snapshot();
        assert_eq!(snap.queued.len(), 1);
        assert_eq!(snap.queued[0].class, ProcessClass::Background);
        assert!(snap.queued[0].promoted);
    }

    #[tokio::test]
    async fn test_command_failure_is_contained() {
        let s = scheduler(1, 0);
        let executor = RecordingExecutor::default();
        s.submit("fail now", ProcessClass::Foreground);
        s.submit("echo next", ProcessClass::Foreground);

        s.tick(&executor).await;
        s.tick(&executor).await;

        assert_eq!(executor.commands(), vec!["fail now", "echo next"]);
        assert_eq!(s.stats().command_failures, 1);
        assert_eq!(s.stats().completed, 2);
    }

    #[test]
    fn test_promote_and_rebalance_update_stats() {
        let config = SchedulerConfig::default().with_split_threshold(2);
        let s = Scheduler::new(config).expect("valid config");

        assert!(s.promote().is_none());

        s.enqueue(Process::foreground(0, "a"));
        s.enqueue(Process::foreground(1, "b"));
        s.enqueue(Process::foreground(2, "c"));
        assert_eq!(s.level_sizes(), vec![3]);
        assert_eq!(s.rebalance(), 1);
        assert_eq!(s.level_sizes(), vec![1, 2]);

        // bottom level grows to [1, 2, 0] and splits again
        let report = s.promote().expect("two levels");
        assert_eq!(report.moved, ProcessId(0));
        assert_eq!(report.splits, 1);
        assert_eq!(s.level_sizes(), vec![1, 2]);
        assert!(s.render().contains("DQ: 1F 2F 0F*"));

        let stats = s.stats();
        assert_eq!(stats.promotions, 1);
        assert_eq!(stats.splits, 2);
    }

    #[tokio::test]
    async fn test_run_stops_without_further_dispatch() {
        let s = Arc::new(scheduler(5, 0));
        let executor: Arc<dyn CommandExecutor> = Arc::new(RecordingExecutor::default());

        s.stop();
        s.submit("echo never", ProcessClass::Foreground);
        s.run(Arc::clone(&executor)).await.expect("run");

        assert_eq!(s.state(), DispatcherState::Stopped);
        assert_eq!(s.stats().dispatched, 0);
        assert_eq!(s.queued_len(), 1);
    }

    #[tokio::test]
    async fn test_run_drains_and_stops() {
        let s = Arc::new(scheduler(2, 1));
        let executor = Arc::new(RecordingExecutor::default());
        let handle = s.spawn(executor.clone());

        s.submit("echo a", ProcessClass::Foreground);
        s.submit("echo b", ProcessClass::Background);

        tokio::time::timeout(Duration::from_secs(5), s.wait_until_drained())
            .await
            .expect("drains in time");
        s.stop();
        handle.await.expect("join").expect("run");

        assert_eq!(executor.commands().len(), 4);
        assert_eq!(s.stats().completed, 2);
        assert!(!s.is_running());
    }

    #[tokio::test]
    async fn test_run_rejects_second_loop() {
        let s = Arc::new(scheduler(1, 0));
        let executor: Arc<dyn CommandExecutor> = Arc::new(RecordingExecutor::default());
        let handle = s.spawn(Arc::clone(&executor));

        while !s.is_running() {
            tokio::task::yield_now().await;
        }
        let second = s.run(Arc::clone(&executor)).await;
        assert!(matches!(second, Err(SchedulerError::AlreadyRunning)));

        s.stop();
        handle.await.expect("join").expect("run");
    }

    /// Blocks every `slow` command until released.
    #[derive(Default)]
    struct GateExecutor {
        started: Notify,
        release: Notify,
        inner: RecordingExecutor,
    }

    #[async_trait]
    impl CommandExecutor for GateExecutor {
        async fn execute(&self, args: &[String]) -> Result<(), CommandError> {
            if args.first().map(String::as_str) == Some("slow") {
                self.started.notify_one();
                self.release.notified().await;
            }
            self.inner.execute(args).await
        }
    }

    #[tokio::test]
    async fn test_state_stays_available_while_command_executes() {
        let s = Arc::new(scheduler(1, 0));
        let gate = Arc::new(GateExecutor::default());
        let slow = s.submit("slow", ProcessClass::Foreground);
        let handle = s.spawn(gate.clone());

        tokio::time::timeout(Duration::from_secs(5), gate.started.notified())
            .await
            .expect("slow command starts");

        assert_eq!(s.state(), DispatcherState::Executing);
        assert_eq!(s.snapshot().executing, Some(slow));

        let a = s.submit("echo a", ProcessClass::Foreground);
        let b = s.submit("echo b", ProcessClass::Foreground);
        assert!(s.render().contains("\nDQ: 1F 2F\n"));
        assert!(s.promote().is_none());
        assert_eq!(s.rebalance(), 0);
        assert_eq!(s.live_count(), 3);

        gate.release.notify_one();
        tokio::time::timeout(Duration::from_secs(5), s.wait_until_drained())
            .await
            .expect("drains in time");
        s.stop();
        handle.await.expect("join").expect("run");

        assert_eq!(gate.inner.commands(), vec!["slow", "echo a", "echo b"]);
        assert_eq!((a, b), (ProcessId(1), ProcessId(2)));
        assert_eq!(s.stats().completed, 3);
        assert_eq!(s.snapshot().executing, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_wait_ignores_stale_wakeup() {
        let s = scheduler(1, 0);
        let executor = RecordingExecutor::default();

        // admission stores a wakeup that the dispatcher never consumed
        s.submit("echo a", ProcessClass::Foreground);
        s.tick(&executor).await;
        assert_eq!(s.queued_len(), 0);

        let start = tokio::time::Instant::now();
        s.wait_for_work().await;
        assert!(start.elapsed() >= s.config().tick());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_wait_returns_on_submit_and_stop() {
        let s = Arc::new(scheduler(1, 0));
        let start = tokio::time::Instant::now();

        let waiter = {
            let s = Arc::clone(&s);
            tokio::spawn(async move { s.wait_for_work().await })
        };
        tokio::task::yield_now().await;
        s.submit("echo a", ProcessClass::Foreground);
        waiter.await.expect("join");
        assert!(start.elapsed() < s.config().tick());

        s.tick(&RecordingExecutor::default()).await;
        s.stop();
        s.wait_for_work().await;
        assert!(start.elapsed() < s.config().tick());
    }

    #[test]
    fn test_dispatcher_state_display() {
        assert_eq!(DispatcherState::Idle.to_string(), "idle");
        assert_eq!(DispatcherState::Stopped.to_string(), "stopped");
    }
}
