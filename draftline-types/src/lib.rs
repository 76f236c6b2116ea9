//! Core type definitions for draftline.
//!
//! This crate defines the identifier types shared by the model and draft
//! layers:
//! - Entity identifiers (UUID v7)
//! - The live/draft link ([`VersionLink`]) and the well-known column names
//!   every draftable table shares
//!
//! Schema, entity and storage types live in `draftline-model`; the draft
//! registry and clone orchestrator live in `draftline-draft`.

mod ids;
mod link;

pub use ids::EntityId;
pub use link::{APPROVED_VERSION_COLUMN, CREATED_AT_COLUMN, ID_COLUMN, VersionLink};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
