//! Test runner I/O boundary interfaces
//!
//! This module defines trait-based abstractions for the two operations of a run that touch the outside world:
//! - Test discovery (filesystem scan for test inputs and their expectation files)
//! - Checker execution (subprocess launch, bounded wait, output capture)
//!
//! The runner in `test_runner.rs` only talks to these traits, so its classification and reporting logic can be
//! driven by scripted executors in tests.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::runtime::Runtime;

use crate::checker::{Execution, Invocation};
use crate::discovery::{self, TestPair};

/// Errors that occur during test operations
#[derive(Debug, Error)]
pub enum TestError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to write report: {0}")]
    Report(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Test Discovery Interface
// ============================================================================

/// Enumerate the (test, expectation) pairs of a run.
pub trait TestDiscovery {
    /// Pairs under `root` for test inputs with the given extension, in run order.
    fn discover_pairs(&self, root: &Path, extension: &str) -> Box<dyn Iterator<Item = TestPair>>;
}

// ============================================================================
// Test Executor Interface
// ============================================================================

/// Run the checker once and capture what it did.
pub trait TestExecutor {
    /// Launch `invocation` and wait at most `timeout` for it.
    ///
    /// Returns [`TestError::Spawn`] when the process could not be started and [`TestError::Io`] when its output or
    /// status could not be collected; a crash or a non-verdict exit code is a normal [`Execution::Exited`].
    fn execute(&self, invocation: &Invocation, timeout: Duration) -> Result<Execution, TestError>;
}

// ============================================================================
// Default Implementations
// ============================================================================

/// Filesystem walk under the test root.
pub struct DefaultTestDiscovery;

impl TestDiscovery for DefaultTestDiscovery {
    fn discover_pairs(&self, root: &Path, extension: &str) -> Box<dyn Iterator<Item = TestPair>> {
        Box::new(discovery::find_pairs(root, extension))
    }
}

/// Checker execution as a child process with a deadline.
///
/// Owns a single-threaded tokio runtime; the harness stays sequential and only uses the runtime to race the child
/// against a timer.
pub struct DefaultTestExecutor {
    runtime: Runtime,
}

impl DefaultTestExecutor {
    pub fn new() -> Result<Self, TestError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(TestError::Runtime)?;
        Ok(Self { runtime })
    }
}

impl TestExecutor for DefaultTestExecutor {
    fn execute(&self, invocation: &Invocation, timeout: Duration) -> Result<Execution, TestError> {
        self.runtime.block_on(run_with_deadline(invocation, timeout))
    }
}

async fn run_with_deadline(invocation: &Invocation, timeout: Duration) -> Result<Execution, TestError> {
    tracing::debug!(command = %invocation.display(), ?timeout, "launching checker");

    let start = Instant::now();
    let mut child = Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| TestError::Spawn {
            program: invocation.program.display().to_string(),
            source,
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Both pipes are drained while waiting so a chatty checker cannot block on a full pipe.
    let completion = async {
        let (status, stdout, stderr) = tokio::try_join!(child.wait(), drain(stdout), drain(stderr))?;
        Ok::<_, std::io::Error>((status, stdout, stderr))
    };
    let outcome = tokio::time::timeout(timeout, completion).await;

    match outcome {
        Ok(result) => {
            let (status, stdout, stderr) = result?;
            Ok(Execution::Exited {
                code: status.code(),
                stdout,
                stderr,
                elapsed: start.elapsed(),
            })
        }
        Err(_) => {
            let elapsed = start.elapsed();
            // `kill` also reaps the child, so nothing outlives the timeout.
            if let Err(err) = child.kill().await {
                tracing::warn!(command = %invocation.display(), error = %err, "failed to kill timed out checker");
            }
            Ok(Execution::TimedOut { elapsed })
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}
