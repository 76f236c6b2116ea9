//! Draft/approval versioning for entity graphs.
//!
//! Given a live entity and the associations configured for its type, this
//! crate builds a linked, editable draft copy of the whole subgraph. Each
//! cloned row points back at the live row it came from through its
//! `approved_version_id` column, and every draftable table is split into two
//! disjoint scopes: `approved` (no back-reference) and `draft`.
//!
//! # Components
//!
//! - **Classifier** ([`classifier`]): which associations are draftable
//! - **Registry** ([`DraftRegistry`]): per-type configuration, cascading from
//!   a root type through every draftable association
//! - **Builder** ([`DraftBuilder`]): the recursive clone
//! - **Scopes** ([`scope`]): the approved/draft partition
//!
//! Storage is consumed through the `draftline-model` traits; the builder
//! itself never writes.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use draftline_draft::{DraftBuilder, DraftRegistry, RegisterOptions};
//! use draftline_model::{AssociationDef, Entity, EntitySchema, MemoryStore};
//!
//! let store = Arc::new(
//!     MemoryStore::with_schemas([
//!         EntitySchema::new("business")
//!             .draftable()
//!             .association(AssociationDef::has_one("address", "address")),
//!         EntitySchema::new("address").draftable().column("city"),
//!     ])
//!     .unwrap(),
//! );
//! let registry = Arc::new(DraftRegistry::new(store.clone()));
//! registry.register("business", RegisterOptions::new()).unwrap();
//! assert!(registry.is_registered("address"));
//!
//! let live = store
//!     .save(&Entity::new("business").with_one("address", Entity::new("address")))
//!     .unwrap();
//! let draft = DraftBuilder::new(registry).create_draft(&live).unwrap();
//! assert_eq!(draft.approved_version, live.id);
//! ```

pub mod classifier;
mod config;
mod error;
mod orchestrator;
mod registry;
pub mod scope;

pub use classifier::{DraftableKind, ResolvedAssociation};
pub use config::DraftingConfig;
pub use error::{ConfigurationError, DraftError, DraftResult, LookupFailure};
pub use orchestrator::DraftBuilder;
pub use registry::{DraftConfig, DraftRegistry, RegisterOptions};
pub use scope::{Scope, has_draft, is_draft};
