//! Error types for the classifier.
//!
//! Container contract violations live in [`StructureError`]; they indicate a
//! broken invariant inside the learner rather than bad caller input and abort
//! construction when they surface. Caller-facing failures are [`LearnerError`].

use thiserror::Error;

/// Contract violations of the in-crate containers (ordered map, priority queue).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("key not found in ordered map")]
    KeyNotFound,

    #[error("rank {index} out of range for map of size {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("delete_max on an empty priority queue")]
    EmptyQueue,
}

/// Errors returned by learner construction and queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LearnerError {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("unknown category `{category}`")]
    UnknownCategory { category: String },

    #[error(transparent)]
    Structure(#[from] StructureError),
}

impl LearnerError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        LearnerError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

pub type Result<T, E = LearnerError> = std::result::Result<T, E>;
