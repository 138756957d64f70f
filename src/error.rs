// Error taxonomy for the trait comparison core.
//
// The pure transforms fail with MalformedInput or KeyMismatch. Anything that
// goes wrong inside the timeline or analysis services is wrapped, uninterpreted,
// in Collaborator. None of these are retried.

use thiserror::Error;

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, AffinityError>;

/// Which side of a comparison a trait was missing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::First => f.write_str("first"),
            Side::Second => f.write_str("second"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AffinityError {
    /// The analysis result is missing a key (or has the wrong type) at `path`.
    #[error("Malformed analysis result at {path}: {reason}")]
    MalformedInput { path: String, reason: String },

    /// A trait present in one map has no counterpart in the other.
    #[error("Trait '{trait_id}' is missing from the {missing_from} profile")]
    KeyMismatch { trait_id: String, missing_from: Side },

    /// The timeline or analysis service failed.
    #[error("Collaborator failed: {source:#}")]
    Collaborator {
        #[source]
        source: anyhow::Error,
    },
}

impl AffinityError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        AffinityError::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn collaborator(source: anyhow::Error) -> Self {
        AffinityError::Collaborator { source }
    }
}
