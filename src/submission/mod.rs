//! Reading process submissions from a command source.
//!
//! The source is newline-delimited text. Each line may hold several
//! `;`-separated sub-commands, and each sub-command becomes one process.
//! Any whitespace-separated token starting with `&` marks the sub-command
//! as background; the `&` is stripped from the stored command text.
//!
//! ```text
//! echo hello; gcd 12 18
//! &prime 1000 ; sum 10 &
//! ```
//!
//! yields `echo hello` (F), `gcd 12 18` (F), `prime 1000` (B), `sum 10` (B).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::error::SubmissionError;
use crate::scheduler::{ProcessClass, Scheduler};

/// One parsed sub-command, ready to become a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub command: String,
    pub class: ProcessClass,
}

impl Submission {
    pub fn is_foreground(&self) -> bool {
        self.class == ProcessClass::Foreground
    }
}

/// Parses one source line into its sub-commands. Empty sub-commands are
/// skipped.
pub fn parse_line(line: &str) -> Vec<Submission> {
    line.split(';').filter_map(parse_command).collect()
}

/// Parses a whole source text, line by line.
pub fn parse_source(text: &str) -> Vec<Submission> {
    text.lines().flat_map(parse_line).collect()
}

fn parse_command(raw: &str) -> Option<Submission> {
    let mut background = false;
    let tokens: Vec<&str> = raw
        .split_whitespace()
        .filter_map(|token| match token.strip_prefix('&') {
            Some(rest) => {
                background = true;
                let rest = rest.trim_start_matches('&');
                (!rest.is_empty()).then_some(rest)
            }
            None => Some(token),
        })
        .collect();

    if tokens.is_empty() {
        return None;
    }

    Some(Submission {
        command: tokens.join(" "),
        class: if background {
            ProcessClass::Background
        } else {
            ProcessClass::Foreground
        },
    })
}

/// Feeds a command file into a scheduler, one process at a time.
pub struct Submitter {
    path: PathBuf,
    interval: Duration,
}

impl Submitter {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            interval,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the source and submits every sub-command, sleeping `interval`
    /// after each submission. Returns the number of processes submitted.
    ///
    /// An unreadable or missing source is reported once and ends submission
    /// without an error. Lines that are not valid UTF-8 are skipped. Stops
    /// early if the scheduler is stopped.
    pub async fn run(&self, scheduler: Arc<Scheduler>) -> Result<usize, SubmissionError> {
        let file = match tokio::fs::File::open(&self.path).await {
            Ok(file) => file,
            Err(source) => {
                self.report_unavailable(source, 0);
                return Ok(0);
            }
        };

        let mut lines = BufReader::new(file).split(b'\n');
        let mut submitted = 0;
        let mut line_number = 0;

        loop {
            let bytes = match lines.next_segment().await {
                Ok(Some(bytes)) => bytes,
                Ok(None) => break,
                Err(source) => {
                    self.report_unavailable(source, submitted);
                    return Ok(submitted);
                }
            };
            line_number += 1;

            let line = match String::from_utf8(bytes) {
                Ok(line) => line,
                Err(e) => {
                    warn!(line = line_number, error = %e, "Skipping line that is not valid UTF-8");
                    continue;
                }
            };

            for submission in parse_line(line.trim_end_matches('\r')) {
                if scheduler.is_stop_requested() {
                    info!(submitted, "Scheduler stopped, submitter exiting early");
                    return Ok(submitted);
                }

                let id = scheduler.submit(submission.command.as_str(), submission.class);
                debug!(process_id = %id, command = %submission.command, "Submitted");
                submitted += 1;

                tokio::time::sleep(self.interval).await;
            }
        }

        info!(submitted, path = %self.path.display(), "Submitter finished");
        Ok(submitted)
    }

    fn report_unavailable(&self, source: std::io::Error, submitted: usize) {
        let err = SubmissionError::SourceUnavailable {
            path: self.path.display().to_string(),
            source,
        };
        warn!(error = %err, submitted, "No further processes will be submitted");
    }
}
