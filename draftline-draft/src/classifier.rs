//! Decides which associations take part in drafting.
//!
//! Owning associations (`has_one`, `has_many`) and join-table associations
//! (`has_and_belongs_to_many`) are draftable. `belongs_to` points up the graph
//! and `has_many_through` is derived from other associations, so neither is.

use crate::{ConfigurationError, DraftResult};
use draftline_model::{AssociationDef, AssociationKind, SchemaCatalog};
use serde::{Deserialize, Serialize};

/// The draftable shape of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftableKind {
    /// A single owned child, cloned.
    ToOne,
    /// An ordered collection of owned children, each cloned.
    ToMany,
    /// Shared rows behind a join table; only the membership is copied.
    ManyToMany,
}

impl DraftableKind {
    pub const fn from_kind(kind: AssociationKind) -> Option<Self> {
        match kind {
            AssociationKind::HasOne => Some(Self::ToOne),
            AssociationKind::HasMany => Some(Self::ToMany),
            AssociationKind::HasAndBelongsToMany => Some(Self::ManyToMany),
            AssociationKind::BelongsTo | AssociationKind::HasManyThrough => None,
        }
    }

    /// Whether drafting produces new child rows for this association.
    pub const fn is_owned(&self) -> bool {
        matches!(self, Self::ToOne | Self::ToMany)
    }
}

/// An association resolved against the catalog at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedAssociation {
    pub name: String,
    pub kind: DraftableKind,
    pub target: String,
}

impl ResolvedAssociation {
    fn from_def(def: &AssociationDef) -> Option<Self> {
        DraftableKind::from_kind(def.kind).map(|kind| Self {
            name: def.name.clone(),
            kind,
            target: def.target.clone(),
        })
    }
}

/// True iff `name` is a draftable association on `entity_type`.
pub fn is_relevant(catalog: &dyn SchemaCatalog, entity_type: &str, name: &str) -> bool {
    catalog
        .reflect_association(entity_type, name)
        .is_some_and(|def| DraftableKind::from_kind(def.kind).is_some())
}

/// Resolves a name the caller claims is a draftable association.
pub fn resolve(
    catalog: &dyn SchemaCatalog,
    entity_type: &str,
    name: &str,
) -> DraftResult<ResolvedAssociation> {
    let def = catalog.reflect_association(entity_type, name).ok_or_else(|| {
        ConfigurationError::UnknownAssociation {
            entity_type: entity_type.to_string(),
            name: name.to_string(),
        }
    })?;
    ResolvedAssociation::from_def(&def).ok_or_else(|| {
        ConfigurationError::NotDraftable {
            entity_type: entity_type.to_string(),
            name: name.to_string(),
            kind: format!("{:?}", def.kind),
        }
        .into()
    })
}

/// Every draftable association on `entity_type` in declaration order,
/// skipping reserved names.
pub fn draftable_associations(
    catalog: &dyn SchemaCatalog,
    entity_type: &str,
    reserved: &[String],
) -> Vec<ResolvedAssociation> {
    catalog
        .associations(entity_type)
        .iter()
        .filter(|def| !reserved.contains(&def.name))
        .filter_map(ResolvedAssociation::from_def)
        .collect()
}
