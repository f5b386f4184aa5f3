//! Periodic state monitor.
//!
//! Prints the scheduler's state every interval, either as the monitor text
//! or as one JSON object per line.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::scheduler::Scheduler;

/// Output format of the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorFormat {
    #[default]
    Text,
    Json,
}

/// Produces one monitor report in the given format.
pub fn report(scheduler: &Scheduler, format: MonitorFormat) -> String {
    match format {
        MonitorFormat::Text => scheduler.render(),
        MonitorFormat::Json => match serde_json::to_string(&scheduler.snapshot()) {
            Ok(json) => json + "\n",
            Err(e) => {
                warn!(error = %e, "Failed to serialize snapshot");
                String::new()
            }
        },
    }
}

/// A background task that periodically prints scheduler state.
///
/// Call [`StateMonitor::stop`] to cancel.
pub struct StateMonitor {
    shutdown_tx: broadcast::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl StateMonitor {
    /// Start a monitor that prints to stdout every `interval`, first one
    /// interval after start.
    pub fn start(scheduler: Arc<Scheduler>, interval: Duration, format: MonitorFormat) -> Self {
        Self::start_with_sink(scheduler, interval, format, std::io::stdout())
    }

    /// Start a monitor that writes its reports to `sink`.
    pub fn start_with_sink(
        scheduler: Arc<Scheduler>,
        interval: Duration,
        format: MonitorFormat,
        mut sink: impl Write + Send + 'static,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.tick().await; // skip the immediate first tick

            loop {
                tokio::select! {
                    _ = tick.tick() => {}
                    _ = shutdown_rx.recv() => break,
                }
                let text = report(&scheduler, format);
                if let Err(e) = sink.write_all(text.as_bytes()).and_then(|_| sink.flush()) {
                    warn!(error = %e, "Failed to write monitor report");
                }
            }
        });

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Signal the monitor to stop and wait for it to finish.
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for StateMonitor {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}
