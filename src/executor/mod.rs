//! Command execution for dispatched processes.
//!
//! The scheduler hands each dispatched process's tokenized command to a
//! [`CommandExecutor`] and only cares that the call returned. The
//! [`BuiltinExecutor`] implements the toy vocabulary in [`builtins`] and
//! writes its output lines to a sink (stdout by default).

pub mod builtins;

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::trace;

use crate::error::CommandError;

pub use builtins::{count_primes, evaluate, gcd, sum_modulo, PRIME_LIMIT};

/// Executes one tokenized command per dispatch turn.
///
/// Implementations must return in bounded time. Errors are contained to the
/// turn that produced them.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, args: &[String]) -> Result<(), CommandError>;
}

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Executor for the built-in command vocabulary.
///
/// Evaluation runs on the blocking thread pool so a large `prime` sieve
/// does not stall the async runtime.
#[derive(Clone)]
pub struct BuiltinExecutor {
    sink: Sink,
}

impl Default for BuiltinExecutor {
    fn default() -> Self {
        Self::stdout()
    }
}

impl BuiltinExecutor {
    /// Creates an executor that prints to stdout.
    pub fn stdout() -> Self {
        Self::with_sink(std::io::stdout())
    }

    /// Creates an executor that prints to the given writer.
    pub fn with_sink(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    fn write_line(&self, command: &str, line: &str) -> Result<(), CommandError> {
        let output_err = |message: String| CommandError::Output {
            command: command.to_string(),
            message,
        };
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| output_err("output sink poisoned".to_string()))?;
        writeln!(sink, "{}", line).map_err(|e| output_err(e.to_string()))?;
        sink.flush().map_err(|e| output_err(e.to_string()))
    }
}

#[async_trait]
impl CommandExecutor for BuiltinExecutor {
    async fn execute(&self, args: &[String]) -> Result<(), CommandError> {
        let name = args.first().cloned().unwrap_or_default();
        let owned = args.to_vec();

        let output = tokio::task::spawn_blocking(move || evaluate(&owned))
            .await
            .map_err(|_| CommandError::Panicked(name.clone()))??;

        trace!(command = %name, has_output = output.is_some(), "Command evaluated");

        match output {
            Some(line) => self.write_line(&name, &line),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("buffer lock").write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().expect("buffer lock").clone()).expect("utf8")
        }
    }

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[tokio::test]
    async fn test_builtin_executor_writes_lines() {
        let buffer = SharedBuffer::default();
        let executor = BuiltinExecutor::with_sink(buffer.clone());

        executor.execute(&args("echo a b")).await.expect("echo");
        executor.execute(&args("dummy")).await.expect("dummy");
        executor.execute(&args("gcd 12 18")).await.expect("gcd");

        assert_eq!(buffer.contents(), "a b\nGCD of 12 and 18 is 6\n");
    }

    #[tokio::test]
    async fn test_builtin_executor_parse_error_writes_nothing() {
        let buffer = SharedBuffer::default();
        let executor = BuiltinExecutor::with_sink(buffer.clone());

        let result = executor.execute(&args("prime x")).await;
        assert!(matches!(result, Err(CommandError::Parse { .. })));
        assert!(buffer.contents().is_empty());
    }

    #[tokio::test]
    async fn test_builtin_executor_rejects_huge_prime_bound() {
        let buffer = SharedBuffer::default();
        let executor = BuiltinExecutor::with_sink(buffer.clone());

        let result = executor.execute(&args("prime 100000000000")).await;
        assert!(matches!(
            result,
            Err(CommandError::LimitExceeded { limit: PRIME_LIMIT, .. })
        ));
        assert!(buffer.contents().is_empty());

        executor.execute(&args("prime 10")).await.expect("small bound");
        assert_eq!(buffer.contents(), "Number of primes less than or equal to 10 is 4\n");
    }
}
