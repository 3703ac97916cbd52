//! Error types for audit event recording.

use thiserror::Error;

/// Boxed error carried verbatim from a collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while recording an audit event.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A user-attributed operation was invoked without a signed-in user.
    #[error("no authenticated user in the security context")]
    Unauthenticated,

    /// An identity the record needs was not available.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The caller's save operation failed; no event was written.
    #[error("mutation failed: {0}")]
    Mutation(#[source] BoxError),

    /// The event store rejected the write.
    #[error("event store write failed: {0}")]
    Store(#[source] BoxError),

    /// Failed to convert an entity or event to a field map.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;
