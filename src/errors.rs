use std::io;

use thiserror::Error;

use crate::types::PathString;

/// Error type for path resolution, lookup, rewriting, and storage failures.
#[derive(Debug, Error)]
pub enum RewrapError {
    #[error("path '{path}' is not resolvable: {reason}")]
    InvalidPath { path: PathString, reason: String },
    #[error("lookup mismatch at '{path}': {details}")]
    LookupMismatch { path: PathString, details: String },
    #[error(
        "rewrite count mismatch at '{path}': expected {expected}, found {found}, rewritten {rewritten}"
    )]
    CountMismatch {
        path: PathString,
        expected: usize,
        found: usize,
        rewritten: usize,
    },
    #[error("storage failure: {0}")]
    Storage(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: PathString,
        source: serde_json::Error,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl RewrapError {
    /// Build an `InvalidPath` error without boilerplate at the call site.
    pub fn invalid_path(path: impl Into<PathString>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a `LookupMismatch` error for a resolved location.
    pub fn lookup_mismatch(path: impl Into<PathString>, details: impl Into<String>) -> Self {
        Self::LookupMismatch {
            path: path.into(),
            details: details.into(),
        }
    }
}
