//! Error types for the draft layer.
//!
//! Nothing here is transient: every error is a deterministic consequence of
//! registry state or of the entity handed in, so none of them is retried.

use draftline_model::StoreError;
use thiserror::Error;

/// Result type for draft operations.
pub type DraftResult<T> = Result<T, DraftError>;

/// Errors that can occur in draft operations.
#[derive(Debug, Error)]
pub enum DraftError {
    /// Registration misuse.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Drafting or scoping a type that was never registered.
    #[error("lookup failure: {0}")]
    Lookup(#[from] LookupFailure),

    /// Only saved rows can be drafted.
    #[error("cannot draft unsaved {entity_type}")]
    Unsaved { entity_type: String },

    /// Drafts are not drafted again.
    #[error("{entity_type} {id} is already a draft")]
    AlreadyDraft { entity_type: String, id: String },

    /// Settings could not be parsed.
    #[error("invalid drafting settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// Passed through unchanged from the store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registration misuse. Always a setup mistake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("{0} is already registered for drafting")]
    AlreadyRegistered(String),

    #[error("{entity_type} has no association named `{name}`")]
    UnknownAssociation { entity_type: String, name: String },

    #[error("{entity_type}.{name} is a {kind} association and cannot be drafted")]
    NotDraftable {
        entity_type: String,
        name: String,
        kind: String,
    },

    #[error("`{name}` is reserved and cannot be drafted on {entity_type}")]
    ReservedAssociation { entity_type: String, name: String },

    #[error("explicit association list for {0} is empty")]
    EmptyAssociationList(String),

    #[error("{entity_type} has no attribute named `{name}`")]
    UnknownAttribute { entity_type: String, name: String },

    #[error("{0} has no approved_version_id column")]
    MissingBackReference(String),

    #[error("{owner}.{association} targets {target}, which has no draft configuration")]
    MissingTargetConfig {
        owner: String,
        association: String,
        target: String,
    },
}

/// A type was used before it was registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    #[error("{0} is not registered for drafting")]
    Unregistered(String),
}
