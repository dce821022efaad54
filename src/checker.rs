//! Checker invocation contract
//!
//! The checker is called as
//!
//! ```text
//! <binary> <test-file> --env <expectation-file> [--solver <name>] <extra-args...>
//! ```
//!
//! and reports its verdict through the exit code: `0` for safe, `2` for unsafe. Any other code means the checker
//! itself failed (crash, usage error, unsupported input).

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::HarnessConfig;
use crate::discovery::TestPair;
use crate::expectation::Verdict;

pub const EXIT_CODE_SAFE: i32 = 0;
pub const EXIT_CODE_UNSAFE: i32 = 2;

/// Map a checker exit code to its verdict.
///
/// `None` (terminated by a signal) and every code other than safe/unsafe are not verdicts.
pub fn classify_exit_code(code: Option<i32>) -> Option<Verdict> {
    match code {
        Some(EXIT_CODE_SAFE) => Some(Verdict::Safe),
        Some(EXIT_CODE_UNSAFE) => Some(Verdict::Unsafe),
        _ => None,
    }
}

/// Fully resolved checker command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(config: &HarnessConfig, pair: &TestPair) -> Self {
        let mut args: Vec<OsString> = vec![
            pair.test.path().as_os_str().to_owned(),
            "--env".into(),
            pair.expectation.path().as_os_str().to_owned(),
        ];
        if let Some(solver) = &config.solver {
            args.push("--solver".into());
            args.push(solver.into());
        }
        args.extend(config.extra_args.iter().map(OsString::from));

        Self {
            program: config.binary.clone(),
            args,
        }
    }

    /// Command line as a single printable string
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of running the checker process once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// The process ran to completion; `code` is `None` when it was killed by a signal.
    Exited {
        code: Option<i32>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
        elapsed: Duration,
    },
    /// The deadline passed; the process was killed and reaped.
    TimedOut { elapsed: Duration },
}
