//! Test runner implementation
//!
//! Drives discovery and the checker over every (test, expectation) pair, one pair at a time:
//!
//! 1. Read the expected verdict from the expectation file.
//! 2. Run the checker with a deadline.
//! 3. Classify its exit code and compare with the expectation.
//!
//! No pair failure stops the run; the final [`TestSummary`] decides the exit code.
//!
//! ## TestReporter Trait
//!
//! Reporting is separated from execution by the `TestReporter` trait. [`ConsoleReporter`] prints the classic
//! line-per-test log, [`JsonReporter`] writes a single machine-readable document once the run is over.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::ExitCode;
use super::test_interfaces::{TestDiscovery, TestError, TestExecutor};
use crate::checker::{Execution, Invocation, classify_exit_code};
use crate::config::HarnessConfig;
use crate::discovery::TestPair;
use crate::expectation::{Verdict, read_expectation};
use crate::version::HARNESS_VERSION;

// ============================================================================
// Results
// ============================================================================

/// Result of running the checker for one pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    PassedSafe {
        elapsed: Duration,
    },
    PassedUnsafe {
        elapsed: Duration,
    },
    Mismatch {
        expected: Verdict,
        actual: Verdict,
        elapsed: Duration,
    },
    Timeout {
        elapsed: Duration,
    },
    InvocationError(InvocationError),
}

/// A pair that produced no verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationError {
    pub cause: ErrorCause,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCause {
    /// The expectation file is unreadable or invalid; the checker was not run.
    Expectation(String),
    /// The checker could not be started.
    Launch(String),
    /// The checker started but its output or exit status could not be collected.
    Execution(String),
    /// The checker exited with a code that is not a verdict, or was killed by a signal (`None`).
    ExitCode(Option<i32>),
}

impl RunResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, RunResult::PassedSafe { .. } | RunResult::PassedUnsafe { .. })
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            RunResult::PassedSafe { elapsed }
            | RunResult::PassedUnsafe { elapsed }
            | RunResult::Mismatch { elapsed, .. }
            | RunResult::Timeout { elapsed } => *elapsed,
            RunResult::InvocationError(error) => error.elapsed,
        }
    }

    /// Stable status name used in machine-readable output
    pub fn status(&self) -> &'static str {
        match self {
            RunResult::PassedSafe { .. } => "passed_safe",
            RunResult::PassedUnsafe { .. } => "passed_unsafe",
            RunResult::Mismatch { .. } => "mismatch",
            RunResult::Timeout { .. } => "timeout",
            RunResult::InvocationError(_) => "invocation_error",
        }
    }

    fn invocation_error(cause: ErrorCause, elapsed: Duration) -> Self {
        RunResult::InvocationError(InvocationError {
            cause,
            stdout: Vec::new(),
            stderr: Vec::new(),
            elapsed,
        })
    }
}

/// A pair together with its result
#[derive(Debug, Clone)]
pub struct PairOutcome {
    pub pair: TestPair,
    pub result: RunResult,
}

/// Summary of a test run, in execution order
#[derive(Debug, Clone, Default)]
pub struct TestSummary {
    pub outcomes: Vec<PairOutcome>,
    pub duration: Duration,
}

impl TestSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Identifiers of every pair that did not pass
    pub fn failed_ids(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| !o.result.is_passed())
            .map(|o| o.pair.id())
            .collect()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.failed() == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Running
// ============================================================================

/// Run the checker for one pair and classify the outcome.
#[tracing::instrument(skip_all, fields(pair = %pair))]
pub fn run_pair(pair: &TestPair, config: &HarnessConfig, executor: &dyn TestExecutor) -> RunResult {
    let start = Instant::now();

    let expected = match read_expectation(pair.expectation.path()) {
        Ok(verdict) => verdict,
        Err(err) => {
            tracing::debug!(error = %err, "expectation unreadable, checker not run");
            return RunResult::invocation_error(ErrorCause::Expectation(err.to_string()), start.elapsed());
        }
    };

    let invocation = Invocation::new(config, pair);
    let execution = match executor.execute(&invocation, config.timeout) {
        Ok(execution) => execution,
        Err(err @ TestError::Spawn { .. }) => {
            return RunResult::invocation_error(ErrorCause::Launch(err.to_string()), start.elapsed());
        }
        Err(err) => return RunResult::invocation_error(ErrorCause::Execution(err.to_string()), start.elapsed()),
    };

    match execution {
        Execution::TimedOut { elapsed } => RunResult::Timeout { elapsed },
        Execution::Exited {
            code,
            stdout,
            stderr,
            elapsed,
        } => match classify_exit_code(code) {
            None => RunResult::InvocationError(InvocationError {
                cause: ErrorCause::ExitCode(code),
                stdout,
                stderr,
                elapsed,
            }),
            Some(actual) if actual != expected => RunResult::Mismatch {
                expected,
                actual,
                elapsed,
            },
            Some(Verdict::Safe) => RunResult::PassedSafe { elapsed },
            Some(Verdict::Unsafe) => RunResult::PassedUnsafe { elapsed },
        },
    }
}

/// Pairs selected for a run, without running anything.
pub fn collect_pairs(config: &HarnessConfig, filter: Option<&str>, discovery: &dyn TestDiscovery) -> Vec<TestPair> {
    discovery
        .discover_pairs(&config.root, &config.extension)
        .filter(|pair| filter.is_none_or(|keyword| pair.id().contains(keyword)))
        .collect()
}

/// Run every discovered pair and report as it goes.
///
/// Only reporter write failures abort the run; every pair outcome, good or bad, is recorded and the next pair
/// started.
pub fn run_tests(
    config: &HarnessConfig,
    filter: Option<&str>,
    discovery: &dyn TestDiscovery,
    executor: &dyn TestExecutor,
    reporter: &mut dyn TestReporter,
) -> Result<TestSummary, TestError> {
    let start = Instant::now();
    tracing::info!(root = %config.root.display(), "starting test run");
    reporter.on_run_start(config).map_err(TestError::Report)?;

    let mut summary = TestSummary::default();
    let pairs = discovery
        .discover_pairs(&config.root, &config.extension)
        .filter(|pair| filter.is_none_or(|keyword| pair.id().contains(keyword)));

    for pair in pairs {
        reporter.on_pair_start(&pair).map_err(TestError::Report)?;
        let result = run_pair(&pair, config, executor);
        reporter.on_pair_complete(&pair, &result).map_err(TestError::Report)?;
        summary.outcomes.push(PairOutcome { pair, result });
    }

    summary.duration = start.elapsed();
    tracing::info!(
        total = summary.total(),
        failed = summary.failed(),
        duration_secs = summary.duration.as_secs_f64(),
        "test run finished"
    );
    reporter.on_run_complete(&summary).map_err(TestError::Report)?;
    Ok(summary)
}

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Trait for reporting test execution results.
///
/// Implement this trait to customize the output format.
pub trait TestReporter {
    /// Called once before discovery starts
    fn on_run_start(&mut self, _config: &HarnessConfig) -> io::Result<()> {
        Ok(())
    }

    /// Called right before the checker is launched for a pair
    fn on_pair_start(&mut self, _pair: &TestPair) -> io::Result<()> {
        Ok(())
    }

    /// Called when a pair has a result
    fn on_pair_complete(&mut self, pair: &TestPair, result: &RunResult) -> io::Result<()>;

    /// Called when all pairs have been attempted
    fn on_run_complete(&mut self, summary: &TestSummary) -> io::Result<()>;
}

/// Seconds with two decimals, as in `took 0.12s`
fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

/// Line-per-test console output
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TestReporter for ConsoleReporter<W> {
    fn on_run_start(&mut self, config: &HarnessConfig) -> io::Result<()> {
        writeln!(self.out, "SOLVER={}", config.solver.as_deref().unwrap_or(""))?;
        writeln!(self.out, "DEFAULT_ARGS={}", config.default_args)?;
        writeln!(self.out, "SPECBMC_BIN={}", config.binary.display())?;
        writeln!(self.out, "TIMEOUT={}s", config.timeout.as_secs_f64())?;
        writeln!(self.out)
    }

    fn on_pair_start(&mut self, pair: &TestPair) -> io::Result<()> {
        write!(self.out, "test {} ... ", pair)?;
        self.out.flush()
    }

    fn on_pair_complete(&mut self, _pair: &TestPair, result: &RunResult) -> io::Result<()> {
        match result {
            RunResult::PassedSafe { elapsed } | RunResult::PassedUnsafe { elapsed } => {
                writeln!(self.out, "ok, took {}", format_elapsed(*elapsed))
            }
            RunResult::Mismatch {
                expected,
                actual,
                elapsed,
            } => writeln!(
                self.out,
                "failed, expected {} but was {}, took {}",
                expected,
                actual,
                format_elapsed(*elapsed)
            ),
            RunResult::Timeout { .. } => writeln!(self.out, "timeout"),
            RunResult::InvocationError(error) => match &error.cause {
                ErrorCause::Expectation(detail) => {
                    writeln!(self.out, "error, failed to read expectation: {}", detail)
                }
                ErrorCause::Launch(detail) => writeln!(self.out, "error, failed to launch checker: {}", detail),
                ErrorCause::Execution(detail) => writeln!(self.out, "error, checker failed: {}", detail),
                ErrorCause::ExitCode(code) => {
                    match code {
                        Some(code) => writeln!(self.out, "error, checker exited with code {}, output was:", code)?,
                        None => writeln!(self.out, "error, checker was terminated by a signal, output was:")?,
                    }
                    writeln!(self.out, "{}", String::from_utf8_lossy(&error.stdout))?;
                    writeln!(self.out, "{}", String::from_utf8_lossy(&error.stderr))
                }
            },
        }
    }

    fn on_run_complete(&mut self, summary: &TestSummary) -> io::Result<()> {
        writeln!(self.out)?;

        let failed = summary.failed_ids();
        if failed.is_empty() {
            writeln!(self.out, "All tests passed.")?;
        } else {
            let noun = if failed.len() == 1 { "test" } else { "tests" };
            writeln!(self.out, "{} {} failed!", failed.len(), noun)?;
            writeln!(self.out)?;
            writeln!(self.out, "Failed tests:")?;
            for id in &failed {
                writeln!(self.out, "  - {}", id)?;
            }
        }
        self.out.flush()
    }
}

// ============================================================================
// JSON Reporter
// ============================================================================

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    config: JsonConfig<'a>,
    results: Vec<JsonPairRecord>,
    total: usize,
    passed: usize,
    failed: usize,
    duration_secs: f64,
}

#[derive(Serialize)]
struct JsonConfig<'a> {
    root: &'a PathBuf,
    binary: &'a PathBuf,
    solver: Option<&'a str>,
    default_args: &'a str,
    timeout_secs: f64,
}

#[derive(Serialize)]
struct JsonPairRecord {
    id: String,
    test: PathBuf,
    expectation: PathBuf,
    status: &'static str,
    elapsed_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stderr: Option<String>,
}

impl JsonPairRecord {
    fn new(outcome: &PairOutcome) -> Self {
        let mut record = Self {
            id: outcome.pair.id(),
            test: outcome.pair.test.path().to_path_buf(),
            expectation: outcome.pair.expectation.path().to_path_buf(),
            status: outcome.result.status(),
            elapsed_secs: outcome.result.elapsed().as_secs_f64(),
            expected: None,
            actual: None,
            exit_code: None,
            detail: None,
            stdout: None,
            stderr: None,
        };

        match &outcome.result {
            RunResult::PassedSafe { .. } => record.actual = Some(Verdict::Safe),
            RunResult::PassedUnsafe { .. } => record.actual = Some(Verdict::Unsafe),
            RunResult::Mismatch { expected, actual, .. } => {
                record.expected = Some(*expected);
                record.actual = Some(*actual);
            }
            RunResult::Timeout { .. } => {}
            RunResult::InvocationError(error) => match &error.cause {
                ErrorCause::Expectation(detail) | ErrorCause::Launch(detail) | ErrorCause::Execution(detail) => {
                    record.detail = Some(detail.clone());
                }
                ErrorCause::ExitCode(code) => {
                    record.exit_code = *code;
                    record.stdout = Some(String::from_utf8_lossy(&error.stdout).into_owned());
                    record.stderr = Some(String::from_utf8_lossy(&error.stderr).into_owned());
                }
            },
        }
        record
    }
}

/// Writes one JSON document describing the whole run once it is over.
pub struct JsonReporter<W: Write> {
    out: W,
    config: Option<HarnessConfig>,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, config: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TestReporter for JsonReporter<W> {
    fn on_run_start(&mut self, config: &HarnessConfig) -> io::Result<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn on_pair_complete(&mut self, _pair: &TestPair, _result: &RunResult) -> io::Result<()> {
        Ok(())
    }

    fn on_run_complete(&mut self, summary: &TestSummary) -> io::Result<()> {
        let config = self.config.take().unwrap_or_default();
        let report = JsonReport {
            version: HARNESS_VERSION,
            config: JsonConfig {
                root: &config.root,
                binary: &config.binary,
                solver: config.solver.as_deref(),
                default_args: &config.default_args,
                timeout_secs: config.timeout.as_secs_f64(),
            },
            results: summary.outcomes.iter().map(JsonPairRecord::new).collect(),
            total: summary.total(),
            passed: summary.passed(),
            failed: summary.failed(),
            duration_secs: summary.duration.as_secs_f64(),
        };
        serde_json::to_writer_pretty(&mut self.out, &report)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::discovery::{ExpectationFile, TestCase, find_pairs};

    /// Replays scripted executions and records the command lines it was given.
    struct ScriptedExecutor {
        executions: RefCell<VecDeque<Result<Execution, TestError>>>,
        invocations: RefCell<Vec<Invocation>>,
    }

    impl ScriptedExecutor {
        fn new(executions: Vec<Result<Execution, TestError>>) -> Self {
            Self {
                executions: RefCell::new(executions.into()),
                invocations: RefCell::new(Vec::new()),
            }
        }
    }

    impl TestExecutor for ScriptedExecutor {
        fn execute(&self, invocation: &Invocation, _timeout: Duration) -> Result<Execution, TestError> {
            self.invocations.borrow_mut().push(invocation.clone());
            self.executions
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected invocation {}", invocation.display()))
        }
    }

    struct TreeDiscovery;

    impl TestDiscovery for TreeDiscovery {
        fn discover_pairs(&self, root: &Path, extension: &str) -> Box<dyn Iterator<Item = TestPair>> {
            Box::new(find_pairs(root, extension))
        }
    }

    fn exited(code: i32, millis: u64) -> Result<Execution, TestError> {
        Ok(Execution::Exited {
            code: Some(code),
            stdout: b"checker stdout".to_vec(),
            stderr: b"checker stderr".to_vec(),
            elapsed: Duration::from_millis(millis),
        })
    }

    fn pair_with_expectation(dir: &Path, name: &str, yaml: &str) -> TestPair {
        let test = dir.join(format!("{name}.muasm"));
        let expectation = dir.join(format!("{name}.env.yaml"));
        fs::write(&test, "").unwrap();
        fs::write(&expectation, yaml).unwrap();
        TestPair::new(TestCase::new(test), ExpectationFile::new(expectation))
    }

    #[test]
    fn test_safe_expectation_and_safe_exit_passes() {
        let dir = tempfile::tempdir().unwrap();
        let pair = pair_with_expectation(dir.path(), "a", "test: {expect: safe}");
        let executor = ScriptedExecutor::new(vec![exited(0, 120)]);

        let result = run_pair(&pair, &HarnessConfig::default(), &executor);
        assert_eq!(
            result,
            RunResult::PassedSafe {
                elapsed: Duration::from_millis(120)
            }
        );
    }

    #[test]
    fn test_unsafe_expectation_and_unsafe_exit_passes() {
        let dir = tempfile::tempdir().unwrap();
        let pair = pair_with_expectation(dir.path(), "a", "test: {expect: unsafe}");
        let executor = ScriptedExecutor::new(vec![exited(2, 5)]);

        let result = run_pair(&pair, &HarnessConfig::default(), &executor);
        assert!(matches!(result, RunResult::PassedUnsafe { .. }));
    }

    #[test]
    fn test_opposite_verdict_is_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let pair = pair_with_expectation(dir.path(), "a", "test: {expect: unsafe}");
        let executor = ScriptedExecutor::new(vec![exited(0, 100)]);

        let result = run_pair(&pair, &HarnessConfig::default(), &executor);
        assert_eq!(
            result,
            RunResult::Mismatch {
                expected: Verdict::Unsafe,
                actual: Verdict::Safe,
                elapsed: Duration::from_millis(100),
            }
        );
        assert!(!result.is_passed());
    }

    #[test]
    fn test_unknown_exit_code_keeps_output() {
        let dir = tempfile::tempdir().unwrap();
        let pair = pair_with_expectation(dir.path(), "a", "test: {expect: safe}");
        let executor = ScriptedExecutor::new(vec![exited(1, 10)]);

        match run_pair(&pair, &HarnessConfig::default(), &executor) {
            RunResult::InvocationError(error) => {
                assert_eq!(error.cause, ErrorCause::ExitCode(Some(1)));
                assert_eq!(error.stdout, b"checker stdout");
                assert_eq!(error.stderr, b"checker stderr");
            }
            other => panic!("expected invocation error, got {:?}", other),
        }
    }

    #[test]
    fn test_timeout_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let pair = pair_with_expectation(dir.path(), "a", "test: {expect: safe}");
        let executor = ScriptedExecutor::new(vec![Ok(Execution::TimedOut {
            elapsed: Duration::from_secs(60),
        })]);

        let result = run_pair(&pair, &HarnessConfig::default(), &executor);
        assert_eq!(
            result,
            RunResult::Timeout {
                elapsed: Duration::from_secs(60)
            }
        );
    }

    #[test]
    fn test_bad_expectation_never_runs_checker() {
        let dir = tempfile::tempdir().unwrap();
        let pair = pair_with_expectation(dir.path(), "a", "test: {expect: maybe}");
        let executor = ScriptedExecutor::new(Vec::new());

        let result = run_pair(&pair, &HarnessConfig::default(), &executor);
        assert!(matches!(
            result,
            RunResult::InvocationError(InvocationError {
                cause: ErrorCause::Expectation(_),
                ..
            })
        ));
        assert!(executor.invocations.borrow().is_empty());
    }

    #[test]
    fn test_launch_failure_is_invocation_error() {
        let dir = tempfile::tempdir().unwrap();
        let pair = pair_with_expectation(dir.path(), "a", "test: {expect: safe}");
        let executor = ScriptedExecutor::new(vec![Err(TestError::Spawn {
            program: "target/debug/specbmc".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        })]);

        match run_pair(&pair, &HarnessConfig::default(), &executor) {
            RunResult::InvocationError(error) => match error.cause {
                ErrorCause::Launch(detail) => assert!(detail.contains("target/debug/specbmc")),
                other => panic!("expected launch error, got {:?}", other),
            },
            other => panic!("expected invocation error, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_after_spawn_is_not_a_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let pair = pair_with_expectation(dir.path(), "a", "test: {expect: safe}");
        let executor = ScriptedExecutor::new(vec![Err(TestError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "pipe closed",
        )))]);

        let result = run_pair(&pair, &HarnessConfig::default(), &executor);
        match &result {
            RunResult::InvocationError(error) => match &error.cause {
                ErrorCause::Execution(detail) => assert!(detail.contains("pipe closed")),
                other => panic!("expected execution error, got {:?}", other),
            },
            other => panic!("expected invocation error, got {:?}", other),
        }

        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.on_pair_complete(&pair, &result).unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, "error, checker failed: I/O error: pipe closed\n");
    }

    #[test]
    fn test_run_continues_after_failures() {
        let dir = tempfile::tempdir().unwrap();
        pair_with_expectation(dir.path(), "a", "test: {expect: safe}");
        pair_with_expectation(dir.path(), "b", "test: {expect: safe}");
        pair_with_expectation(dir.path(), "c", "test: {expect: unsafe}");
        let executor = ScriptedExecutor::new(vec![
            Ok(Execution::TimedOut {
                elapsed: Duration::from_secs(1),
            }),
            exited(3, 1),
            exited(2, 1),
        ]);
        let config = HarnessConfig::default().with_root(dir.path());
        let mut reporter = ConsoleReporter::new(Vec::new());

        let summary = run_tests(&config, None, &TreeDiscovery, &executor, &mut reporter).unwrap();
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.failed_ids().len(), 2);
        assert_eq!(summary.exit_code(), ExitCode::FAILURE);
        assert_eq!(executor.invocations.borrow().len(), 3);
    }

    #[test]
    fn test_filter_selects_pairs_by_id() {
        let dir = tempfile::tempdir().unwrap();
        pair_with_expectation(dir.path(), "spectre_v1", "test: {expect: unsafe}");
        pair_with_expectation(dir.path(), "fence", "test: {expect: safe}");
        let executor = ScriptedExecutor::new(vec![exited(0, 1)]);
        let config = HarnessConfig::default().with_root(dir.path());
        let mut reporter = ConsoleReporter::new(Vec::new());

        let summary = run_tests(&config, Some("fence"), &TreeDiscovery, &executor, &mut reporter).unwrap();
        assert_eq!(summary.total(), 1);
        assert_eq!(summary.exit_code(), ExitCode::SUCCESS);

        let listed = collect_pairs(&config, Some("spectre"), &TreeDiscovery);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].test.stem(), Some("spectre_v1"));
    }

    #[test]
    fn test_empty_run_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let executor = ScriptedExecutor::new(Vec::new());
        let config = HarnessConfig::default().with_root(dir.path());
        let mut reporter = ConsoleReporter::new(Vec::new());

        let summary = run_tests(&config, None, &TreeDiscovery, &executor, &mut reporter).unwrap();
        assert_eq!(summary.exit_code(), ExitCode::SUCCESS);
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(out.ends_with("\nAll tests passed.\n"));
    }

    #[test]
    fn test_console_reports_invocation_error_output() {
        let pair = TestPair::new(TestCase::new("test/a.muasm"), ExpectationFile::new("test/a.yaml"));
        let result = RunResult::InvocationError(InvocationError {
            cause: ErrorCause::ExitCode(Some(101)),
            stdout: b"partial output".to_vec(),
            stderr: b"thread 'main' panicked".to_vec(),
            elapsed: Duration::from_millis(3),
        });
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.on_pair_start(&pair).unwrap();
        reporter.on_pair_complete(&pair, &result).unwrap();

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(
            out,
            "test test/a.muasm with environment test/a.yaml ... error, checker exited with code 101, output was:\n\
             partial output\n\
             thread 'main' panicked\n"
        );
    }

    #[test]
    fn test_json_report_lists_every_pair() {
        let dir = tempfile::tempdir().unwrap();
        pair_with_expectation(dir.path(), "a", "test: {expect: safe}");
        pair_with_expectation(dir.path(), "b", "test: {expect: safe}");
        let executor = ScriptedExecutor::new(vec![exited(0, 250), exited(2, 250)]);
        let config = HarnessConfig::default().with_root(dir.path());
        let mut reporter = JsonReporter::new(Vec::new());

        run_tests(&config, None, &TreeDiscovery, &executor, &mut reporter).unwrap();

        let report: serde_json::Value = serde_json::from_slice(&reporter.into_inner()).unwrap();
        assert_eq!(report["total"], 2);
        assert_eq!(report["failed"], 1);
        assert_eq!(report["config"]["default_args"], "--skip-cex");
        assert_eq!(report["results"][0]["status"], "passed_safe");
        assert_eq!(report["results"][0]["elapsed_secs"], 0.25);
        assert_eq!(report["results"][1]["status"], "mismatch");
        assert_eq!(report["results"][1]["expected"], "safe");
        assert_eq!(report["results"][1]["actual"], "unsafe");
    }
}
