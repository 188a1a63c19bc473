//! Error types for the evaluation engine.
//!
//! Configuration faults, backend failures and per-issue evaluation errors are
//! kept apart so callers can report a failed issue next to successful ones.

use thiserror::Error;

/// A fault in how a run was configured. Always fatal and never corrected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sampling percentage must lie in (0, 100], got {0}")]
    InvalidSubsetPercent(f32),

    #[error("external access delay must not be negative, got {0}ms")]
    NegativeDelay(i64),

    #[error("link check concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("dependency cycle between issues: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("unknown issue code: {0}")]
    UnknownIssue(String),

    #[error("issue '{issue}' depends on unknown issue '{dependency}'")]
    UnknownDependency { issue: String, dependency: String },

    #[error("issue code registered twice: {0}")]
    DuplicateIssue(String),
}

/// A failure reported by the data store backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("data store unavailable: {0}")]
    Unavailable(String),

    #[error("query rejected: {0}")]
    Rejected(String),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Why a single compute step failed.
#[derive(Debug, Clone, Error)]
pub enum ComputeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("dependency '{dependency}' did not produce {expected}")]
    DependencyShape {
        dependency: &'static str,
        expected: &'static str,
    },

    #[error("dependency '{0}' was not resolved")]
    MissingDependency(&'static str),

    #[error("no link checker configured for this run")]
    NoLinkChecker,
}

/// Error surfaced by the engine for one issue.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("issue '{issue}' failed: {source}")]
    Issue {
        issue: String,
        #[source]
        source: ComputeError,
    },

    #[error("issue '{issue}' was not evaluated because dependency '{dependency}' failed")]
    DependencyFailed { issue: String, dependency: String },
}

impl EvalError {
    /// True for faults that would recur on every run with the same setup.
    pub fn is_config(&self) -> bool {
        matches!(self, EvalError::Config(_))
    }
}

/// Returned when a result payload has no natural scalar count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is not supported for this result")]
pub struct Unsupported(pub &'static str);

/// Failure while rendering a result.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Unsupported(#[from] Unsupported),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
