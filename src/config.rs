//! Harness configuration
//!
//! Every knob has a default matching the conventional checkout layout: tests under `test/`, the checker built in
//! debug mode at `target/debug/specbmc`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_TEST_ROOT: &str = "test";
pub const DEFAULT_TEST_EXTENSION: &str = "muasm";
pub const DEFAULT_CHECKER_BIN: &str = "target/debug/specbmc";
/// Counterexample generation is skipped unless asked for; it dominates run time.
pub const DEFAULT_ARGS: &str = "--skip-cex";
pub const DEFAULT_TIMEOUT_SECS: f64 = 60.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("cannot split default arguments `{0}`: unbalanced quotes or trailing escape")]
    UnbalancedQuotes(String),

    #[error("invalid timeout `{0}`: expected a positive number of seconds")]
    InvalidTimeout(String),
}

/// Settings for one harness run
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Directory scanned recursively for test inputs
    pub root: PathBuf,
    /// Extension of test input files, without the dot
    pub extension: String,
    /// Checker binary
    pub binary: PathBuf,
    /// Solver passed as `--solver <name>`
    pub solver: Option<String>,
    /// Extra arguments as configured, before splitting
    pub default_args: String,
    /// `default_args` split into words
    pub extra_args: Vec<String>,
    /// Upper bound for a single checker run
    pub timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_TEST_ROOT),
            extension: DEFAULT_TEST_EXTENSION.to_string(),
            binary: PathBuf::from(DEFAULT_CHECKER_BIN),
            solver: None,
            default_args: DEFAULT_ARGS.to_string(),
            extra_args: vec![DEFAULT_ARGS.to_string()],
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory scanned for tests
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the test input extension (a leading dot is ignored)
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Set the checker binary
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the solver; an empty name means the checker's default
    pub fn with_solver(mut self, solver: Option<String>) -> Self {
        self.solver = solver.filter(|s| !s.trim().is_empty());
        self
    }

    /// Set the extra checker arguments, split like a POSIX shell would
    pub fn with_default_args(mut self, default_args: &str) -> Result<Self, ConfigError> {
        self.extra_args = split_args(default_args)?;
        self.default_args = default_args.to_string();
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Split an argument string on shell word boundaries, honoring quotes and escapes.
pub fn split_args(args: &str) -> Result<Vec<String>, ConfigError> {
    shlex::split(args).ok_or_else(|| ConfigError::UnbalancedQuotes(args.to_string()))
}

/// Parse a timeout given in (possibly fractional) seconds.
pub fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout(value.to_string()))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::InvalidTimeout(value.to_string()));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTimeout(value.to_string()))
}
