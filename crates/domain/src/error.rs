//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`PresetsError`] via `#[from]`.

/// Top-level error shared by the domain and application layers.
#[derive(Debug, thiserror::Error)]
pub enum PresetsError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A looked-up item does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The preset selector entity has no current state.
    #[error("preset selector {selector} has no state")]
    PresetUnavailable { selector: String },

    /// The host failed to perform a request.
    #[error("host error")]
    Host(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Group identifier is empty.
    #[error("group id must not be empty")]
    EmptyGroupId,

    /// Identifier contains characters other than lowercase ASCII
    /// alphanumerics and underscores.
    #[error("{0:?} is not a valid slug")]
    InvalidSlug(String),

    /// Group has no preset selector entity.
    #[error("group {0} has no preset selector")]
    EmptySelector(String),

    /// Group has no member lights.
    #[error("group {0} has no lights")]
    NoLights(String),

    /// Two groups share the same identifier.
    #[error("group {0} is defined more than once")]
    DuplicateGroup(String),

    /// A service call payload is missing a required field.
    #[error("missing field {0}")]
    MissingField(&'static str),

    /// A service call payload field has the wrong type.
    #[error("field {0} has an invalid value")]
    InvalidField(&'static str),
}

/// A named item could not be found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
