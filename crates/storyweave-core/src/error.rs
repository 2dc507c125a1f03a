//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Each variant maps to a distinct recovery path for callers: a structural
/// error means "retry loading the story", an invalid transition means the
/// client submitted a stale or disabled choice, and an infrastructure error
/// means a collaborator could not be reached.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The story graph failed validation (dangling targets, missing start
    /// scene, duplicate keys).
    #[error("structural data error: {0}")]
    Structural(String),

    /// A choice was rejected: disabled, out of range, or not part of the
    /// current scene. No state was changed.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed input outside of the story graph itself.
    #[error("validation error: {0}")]
    Validation(String),

    /// A collaborator or persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
