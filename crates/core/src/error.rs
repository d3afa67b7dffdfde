//! Errors raised by the pure catalog models.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// A catalog rule was broken.
///
/// Storage and network failures never appear here; the infra layer has its
/// own error types for those.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input the model refuses, such as registering for an event that has
    /// already started.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The entity a workflow depends on does not exist.
    #[error("not found")]
    NotFound,

    /// The request is well formed but clashes with current state (a full
    /// event, a taken slug).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
