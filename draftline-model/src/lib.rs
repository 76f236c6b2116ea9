//! Core entity model for draftline.
//!
//! Defines the types the draft layer reasons about and the collaborators it
//! consumes:
//! - [`Entity`] — one row plus its loaded associations (an in-memory graph)
//! - [`EntitySchema`] — declares a type's columns and associations
//! - [`AssociationKind`] — how two entity types are related
//! - [`SchemaCatalog`] / [`RowSource`] — the persistence/query contract
//! - [`ShallowCloner`] — the single-entity copy primitive
//! - [`MemoryStore`] — an in-memory implementation of both store traits
//!
//! The store is deliberately simple: one table per schema, flattened rows,
//! a link table for association membership and a unique constraint on the
//! back-reference column.

mod catalog;
mod cloner;
mod entity;
mod error;
mod query;
mod schema;
mod store;

pub use catalog::{RowSource, SchemaCatalog, ScopeDef, ScopeSet};
pub use cloner::{AttributeCloner, ShallowCloner};
pub use entity::{Entity, Related};
pub use error::{StoreError, StoreResult};
pub use query::{Predicate, Query};
pub use schema::{AssociationDef, AssociationKind, EntitySchema};
pub use store::MemoryStore;
