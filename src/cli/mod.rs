//! CLI module for the specbmc test harness
//!
//! ## Usage
//!
//! `specbmc-harness [OPTIONS]` runs every test under the test root. All options can also be set through the
//! environment (`SOLVER`, `DEFAULT_ARGS`, `SPECBMC_BIN`, `TIMEOUT`, ...); flags win over the environment.
//!
//! ## Modules
//!
//! - `test_interfaces` - Discovery and checker execution boundaries
//! - `test_runner` - Pair execution, aggregation and reporting
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod test_interfaces;
pub mod test_runner;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::{
    self, DEFAULT_ARGS, DEFAULT_CHECKER_BIN, DEFAULT_TEST_EXTENSION, DEFAULT_TEST_ROOT, HarnessConfig,
};
use crate::version::HARNESS_VERSION;
use test_interfaces::{DefaultTestDiscovery, DefaultTestExecutor, TestError};
use test_runner::{ConsoleReporter, JsonReporter, TestReporter};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<TestError> for CliError {
    fn from(err: TestError) -> Self {
        CliError::failure(format!("Error: {}", err))
    }
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::failure(format!("Error: {}", err))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per test, summary at the end
    #[default]
    Console,
    /// A single JSON document once the run is over
    Json,
}

/// Runs the specbmc checker over the test suite and compares its verdicts with the expectation files
#[derive(Parser, Debug)]
#[command(name = "specbmc-harness")]
#[command(version = HARNESS_VERSION)]
#[command(about = "Runs the specbmc checker over the test suite", long_about = None)]
pub struct Cli {
    /// Directory searched recursively for test inputs
    #[arg(long, env = "TEST_ROOT", value_name = "DIR", default_value = DEFAULT_TEST_ROOT)]
    pub root: PathBuf,

    /// Extension of test input files
    #[arg(long, env = "TEST_EXTENSION", value_name = "EXT", default_value = DEFAULT_TEST_EXTENSION)]
    pub extension: String,

    /// Checker binary
    #[arg(long, env = "SPECBMC_BIN", value_name = "PATH", default_value = DEFAULT_CHECKER_BIN)]
    pub binary: PathBuf,

    /// Solver passed to the checker as `--solver <NAME>`
    #[arg(long, env = "SOLVER", value_name = "NAME")]
    pub solver: Option<String>,

    /// Extra checker arguments, split like a shell command line
    #[arg(long, env = "DEFAULT_ARGS", value_name = "ARGS", default_value = DEFAULT_ARGS, allow_hyphen_values = true)]
    pub default_args: String,

    /// Per-test timeout in seconds
    #[arg(long, env = "TIMEOUT", value_name = "SECS", default_value = "60", value_parser = parse_timeout_arg)]
    pub timeout: Duration,

    /// Only run tests whose name contains this keyword
    #[arg(short = 'k', value_name = "EXPR")]
    pub filter: Option<String>,

    /// List the selected tests without running them
    #[arg(long = "collect-only")]
    pub collect_only: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,
}

fn parse_timeout_arg(value: &str) -> Result<Duration, String> {
    config::parse_timeout(value).map_err(|e| e.to_string())
}

impl Cli {
    /// Resolve the harness configuration from the parsed flags.
    pub fn harness_config(&self) -> CliResult<HarnessConfig> {
        let config = HarnessConfig::new()
            .with_root(&self.root)
            .with_extension(&self.extension)
            .with_binary(&self.binary)
            .with_solver(self.solver.clone())
            .with_timeout(self.timeout)
            .with_default_args(&self.default_args)?;
        Ok(config)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.harness_config()?;

    if cli.collect_only {
        return collect_only(&config, cli.filter.as_deref());
    }

    let executor = DefaultTestExecutor::new()?;
    let mut reporter: Box<dyn TestReporter> = match cli.format {
        OutputFormat::Console => Box::new(ConsoleReporter::stdout()),
        OutputFormat::Json => Box::new(JsonReporter::stdout()),
    };

    let summary = test_runner::run_tests(
        &config,
        cli.filter.as_deref(),
        &DefaultTestDiscovery,
        &executor,
        reporter.as_mut(),
    )?;

    match summary.exit_code() {
        ExitCode::SUCCESS => Ok(ExitCode::SUCCESS),
        // Failures were already reported
        code => Err(CliError::new("", code)),
    }
}

/// Print the selected pairs, one per line.
fn collect_only(config: &HarnessConfig, filter: Option<&str>) -> CliResult<ExitCode> {
    use std::io::Write;

    let pairs = test_runner::collect_pairs(config, filter, &DefaultTestDiscovery);
    let mut out = io::stdout().lock();
    let write = |out: &mut io::StdoutLock<'_>| -> io::Result<()> {
        for pair in &pairs {
            writeln!(out, "{}", pair)?;
        }
        writeln!(out)?;
        writeln!(out, "collected {} item(s)", pairs.len())
    };
    write(&mut out).map_err(|e| CliError::failure(format!("Error: failed to write test list: {}", e)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Tests
// ============================================================================
