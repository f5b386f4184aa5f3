//! Periodic promotion timer.
//!
//! Promotion runs on its own cadence, independent of dispatcher ticks. Each
//! firing takes the scheduler lock like any other mutation, so a promotion
//! never overlaps a dispatch step; their relative order is unspecified.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::dispatcher::Scheduler;

/// Background task that calls [`Scheduler::promote`] every `interval`.
pub struct PromotionTimer {
    shutdown_tx: broadcast::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl PromotionTimer {
    /// Starts the timer. The first promotion happens one full interval
    /// after start.
    pub fn start(scheduler: Arc<Scheduler>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.tick().await; // skip the immediate first tick

            info!(interval_ms = interval.as_millis() as u64, "Promotion timer started");
            loop {
                tokio::select! {
                    _ = tick.tick() => {}
                    _ = shutdown_rx.recv() => break,
                }

                if scheduler.is_stop_requested() {
                    break;
                }

                match scheduler.promote() {
                    Some(report) => debug!(
                        process_id = %report.moved,
                        splits = report.splits,
                        "Periodic promotion"
                    ),
                    None => debug!("Promotion skipped: fewer than two levels"),
                }
            }
            info!("Promotion timer stopped");
        });

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Signals the timer to stop and waits for it to finish.
    pub async fn stop(mut self) {
        // the task may already have exited on its own
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for PromotionTimer {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}
