//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No table exists for the entity type.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// A table for the entity type was already created.
    #[error("table already exists: {0}")]
    TableExists(String),

    /// A write would break a unique constraint.
    #[error("unique constraint violated on {entity_type}.{column} = {value}")]
    UniqueViolation {
        entity_type: String,
        column: String,
        value: String,
    },

    /// Row not found.
    #[error("entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Named scope was never defined on the table.
    #[error("unknown scope `{name}` on {entity_type}")]
    UnknownScope { entity_type: String, name: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
