//! Structured error types shared across gcb crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`HarnessError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, sizes, axis names, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Adds a `path` context entry rendered with [`Path::display`].
    pub fn with_path(self, path: &Path) -> Self {
        self.with_context("path", path.display().to_string())
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the benchmark harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum HarnessError {
    /// The instance generator could not be spawned, exited non-zero, or wrote nothing.
    #[error("generation failure: {0}")]
    GenerationFailure(ErrorInfo),
    /// A destination file already exists and overwriting was not requested.
    #[error("path conflict: {0}")]
    PathConflict(ErrorInfo),
    /// A sweep axis declared no candidate values.
    #[error("empty axis: {0}")]
    EmptyAxis(ErrorInfo),
    /// A parameter grid is malformed (unknown axis, duplicate value, out of domain).
    #[error("invalid grid: {0}")]
    InvalidGrid(ErrorInfo),
    /// The solver binary is missing, not executable, or could not be spawned.
    #[error("solver invocation error: {0}")]
    SolverInvocation(ErrorInfo),
    /// The solver exited with a non-zero status.
    #[error("run failure: {0}")]
    RunFailure(ErrorInfo),
    /// The solver exceeded its per-run timeout and was terminated.
    #[error("run timeout: {0}")]
    RunTimeout(ErrorInfo),
    /// Invalid harness configuration outside of the parameter grid.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Filesystem errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Broken internal invariants.
    #[error("internal error: {0}")]
    Internal(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl HarnessError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            HarnessError::GenerationFailure(info)
            | HarnessError::PathConflict(info)
            | HarnessError::EmptyAxis(info)
            | HarnessError::InvalidGrid(info)
            | HarnessError::SolverInvocation(info)
            | HarnessError::RunFailure(info)
            | HarnessError::RunTimeout(info)
            | HarnessError::Config(info)
            | HarnessError::Io(info)
            | HarnessError::Serde(info)
            | HarnessError::Internal(info) => info,
        }
    }

    /// Whether the error is recorded per run rather than aborting the operation.
    pub fn is_run_level(&self) -> bool {
        matches!(self, HarnessError::RunFailure(_) | HarnessError::RunTimeout(_))
    }

    /// Wraps an I/O error against a filesystem path.
    pub fn io(code: &str, path: &Path, err: impl ToString) -> Self {
        HarnessError::Io(ErrorInfo::new(code, err.to_string()).with_path(path))
    }
}
