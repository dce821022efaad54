//! Expectation files
//!
//! An expectation file is a YAML document declaring the verdict the checker must reach for a test input:
//!
//! ```yaml
//! test:
//!   expect: unsafe
//! ```
//!
//! Only `test.expect` is read here. Everything else in the document belongs to the checker (solver options,
//! security policy, ...) and is ignored.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Verdict of the checker for one test input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Unsafe,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Unsafe => "unsafe",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an expected verdict could not be read.
#[derive(Debug, Error)]
pub enum ExpectationError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid expectation in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Deserialize)]
struct ExpectationDocument {
    test: TestSection,
}

#[derive(Deserialize)]
struct TestSection {
    expect: Verdict,
}

/// Parse the verdict out of an expectation document.
///
/// Fails when `test.expect` is missing or is not exactly `safe` or `unsafe`.
pub fn parse_expectation(source: &str) -> Result<Verdict, serde_yaml::Error> {
    let document: ExpectationDocument = serde_yaml::from_str(source)?;
    Ok(document.test.expect)
}

/// Read the expected verdict from an expectation file on disk.
pub fn read_expectation(path: &Path) -> Result<Verdict, ExpectationError> {
    let source = fs::read_to_string(path).map_err(|source| ExpectationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_expectation(&source).map_err(|source| ExpectationError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}
