//! Multilevel stacked-queue scheduling engine.
//!
//! This module provides the scheduling core:
//!
//! - **QueueStack**: Ordered levels of processes, front level first
//! - **WaitQueue**: Processes sleeping between dispatch turns
//! - **Promotion / rebalancing**: Starvation prevention and level splitting
//! - **Scheduler**: Lock-serialized owner of all of the above plus the
//!   single dispatcher loop
//!
//! # Architecture
//!
//! ```text
//!   ┌───────────┐   submit    ┌──────────────────────────────┐   render   ┌─────────┐
//!   │ Submitter │ ──────────► │          Scheduler           │ ◄───────── │ Monitor │
//!   └───────────┘             │  ┌────────────┐ ┌─────────┐  │            └─────────┘
//!                             │  │ QueueStack │ │WaitQueue│  │
//!   ┌───────────┐   promote   │  └────────────┘ └─────────┘  │
//!   │   Timer   │ ──────────► │        one mutex             │
//!   └───────────┘             └──────────────┬───────────────┘
//!                                            │ dispatch (lock released)
//!                                     ┌──────▼──────┐
//!                                     │  Executor   │
//!                                     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use mlfq_sched::executor::BuiltinExecutor;
//! use mlfq_sched::scheduler::{ProcessClass, Scheduler, SchedulerConfig};
//! use std::sync::Arc;
//!
//! let scheduler = Arc::new(Scheduler::new(SchedulerConfig::default())?);
//! let dispatcher = scheduler.spawn(Arc::new(BuiltinExecutor::stdout()));
//!
//! scheduler.submit("gcd 12 18", ProcessClass::Foreground);
//! scheduler.submit("prime 100", ProcessClass::Background);
//! println!("{}", scheduler.render());
//!
//! scheduler.wait_until_drained().await;
//! scheduler.stop();
//! dispatcher.await??;
//! ```

pub mod config;
pub mod dispatcher;
pub mod maintenance;
pub mod process;
pub mod queue;
pub mod rebalance;
pub mod snapshot;
pub mod wait_queue;

// Re-export main types for convenience
pub use config::SchedulerConfig;
pub use dispatcher::{DispatcherState, Scheduler, SchedulerStats, TickReport};
pub use maintenance::PromotionTimer;
pub use process::{Process, ProcessClass, ProcessId};
pub use queue::{Level, QueueError, QueueStack};
pub use rebalance::PromotionReport;
pub use snapshot::{render, StateSnapshot};
pub use wait_queue::WaitQueue;
