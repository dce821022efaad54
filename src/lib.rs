#![forbid(unsafe_code)]
//! specbmc test harness
//!
//! Runs the `specbmc` bounded model checker over a tree of test inputs and checks each verdict against the
//! expectation files sitting next to the input. A test input `name.muasm` is paired with every sibling file matching
//! `name.*yaml`; each pair is one checker invocation.
//!
//! ## Pipeline
//!
//! - [`discovery`] finds test inputs and their expectation files.
//! - [`expectation`] reads the declared verdict out of an expectation file.
//! - [`checker`] builds the checker command line and classifies its exit code.
//! - [`cli::test_runner`] runs each pair, aggregates results and reports them.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod checker;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod expectation;
pub mod version;

pub use checker::{Execution, Invocation, classify_exit_code};
pub use cli::test_runner::{RunResult, TestSummary, run_pair, run_tests};
pub use config::HarnessConfig;
pub use discovery::{ExpectationFile, TestCase, TestPair, find_expectations, find_tests};
pub use expectation::{ExpectationError, Verdict, read_expectation};
