//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`IpadhaError`]
//! via `#[from]` (or an adapter-level `into_domain`).

/// Base error type crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum IpadhaError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The hub rejected the access token.
    #[error("hub rejected the access token")]
    Unauthorized,

    /// Network or protocol failure talking to the hub.
    #[error("hub transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("entity id must not be empty")]
    EmptyEntityId,

    #[error("entity id {0:?} must have the form domain.object_id")]
    MalformedEntityId(String),

    #[error("slider track width must be positive")]
    InvalidTrackWidth,
}

/// A lookup that found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
