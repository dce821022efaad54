//! Test discovery
//!
//! Test inputs are found by walking the test root for files with the test extension. Expectations live next to
//! their input: for `dir/name.muasm` every file in `dir/` matching `name.*yaml` is one expectation, so one input can
//! be checked under several configurations (`name.z3.yaml`, `name.cvc4.yaml`, ...).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

/// A test input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    path: PathBuf,
}

impl TestCase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without the test extension (`a.muasm` -> `a`); `None` when it is not valid UTF-8
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }

    /// Containing directory (`.` for a bare file name)
    pub fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// An expectation file belonging to a [`TestCase`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectationFile {
    path: PathBuf,
}

impl ExpectationFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One checker invocation: a test input under one expectation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPair {
    pub test: TestCase,
    pub expectation: ExpectationFile,
}

impl TestPair {
    pub fn new(test: TestCase, expectation: ExpectationFile) -> Self {
        Self { test, expectation }
    }

    /// Identifier used in reports and in the list of failed tests
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TestPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with environment {}",
            self.test.path.display(),
            self.expectation.path.display()
        )
    }
}

/// Lazily walk `root` for files ending in `.{extension}`.
///
/// Entries are visited in file-name order within each directory. Symlinks to regular files are kept; symlinked
/// directories are not descended into. Entries that cannot be read are logged and skipped; a missing root yields
/// nothing.
pub fn find_tests(root: &Path, extension: &str) -> impl Iterator<Item = TestCase> + use<> {
    let extension = extension.to_string();
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry during test discovery");
                None
            }
        })
        .filter(|entry| entry.path().is_file())
        .filter(move |entry| entry.path().extension().and_then(|e| e.to_str()) == Some(extension.as_str()))
        .map(|entry| TestCase::new(entry.into_path()))
}

/// Expectation files for `test`, sorted by file name.
///
/// A test without expectations yields an empty list; it is not an error. Symlinks to regular files count as
/// expectation files.
pub fn find_expectations(test: &TestCase) -> Vec<ExpectationFile> {
    let Some(stem) = test.stem() else {
        tracing::warn!(test = %test.path().display(), "test file name is not valid UTF-8, skipping");
        return Vec::new();
    };
    let pattern = match Pattern::new(&format!("{}.*yaml", Pattern::escape(stem))) {
        Ok(pattern) => pattern,
        Err(err) => {
            tracing::warn!(test = %test.path().display(), error = %err, "cannot build expectation pattern");
            return Vec::new();
        }
    };

    let entries = match fs::read_dir(test.dir()) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %test.dir().display(), error = %err, "cannot list test directory");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.path().is_file())
        .filter(|entry| entry.file_name().to_str().is_some_and(|name| pattern.matches(name)))
        .map(|entry| entry.path())
        .collect();
    files.sort();

    if files.is_empty() {
        tracing::debug!(test = %test.path().display(), "no expectation files, test contributes no pairs");
    }

    files.into_iter().map(ExpectationFile::new).collect()
}

/// All pairs under `root`, in discovery order.
pub fn find_pairs(root: &Path, extension: &str) -> impl Iterator<Item = TestPair> + use<> {
    find_tests(root, extension).flat_map(|test| {
        find_expectations(&test)
            .into_iter()
            .map(move |expectation| TestPair::new(test.clone(), expectation))
    })
}
