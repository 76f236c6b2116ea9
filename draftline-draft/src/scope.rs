//! The `approved` / `draft` partition of a draftable table.
//!
//! Both scopes test the same column, one for null and one for not-null, so
//! every row lands in exactly one of them. When a type reads through the
//! approved scope by default, the draft scope is defined to bypass that
//! default; stacking it on top would leave it permanently empty.

use draftline_model::{
    Entity, Predicate, Query, RowSource, SchemaCatalog, ScopeDef, StoreResult,
};
use draftline_types::{APPROVED_VERSION_COLUMN, EntityId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which side of the partition a row is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Approved,
    Draft,
}

impl Scope {
    /// The scope name as defined on the catalog.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Draft => "draft",
        }
    }

    pub fn predicate(&self) -> Predicate {
        match self {
            Self::Approved => Predicate::is_null(APPROVED_VERSION_COLUMN),
            Self::Draft => Predicate::is_not_null(APPROVED_VERSION_COLUMN),
        }
    }

    pub fn definition(&self) -> ScopeDef {
        match self {
            Self::Approved => ScopeDef::new(self.predicate()),
            Self::Draft => ScopeDef::new(self.predicate()).bypassing_default(),
        }
    }

    /// The read this scope performs on `entity_type`.
    pub fn query(&self, entity_type: &str) -> Query {
        self.definition().to_query(entity_type)
    }

    /// Classifies an in-memory row.
    pub fn of(entity: &Entity) -> Self {
        if entity.is_draft() {
            Self::Draft
        } else {
            Self::Approved
        }
    }
}

/// Defines both scopes on the table and, when asked, makes `approved` the
/// default read filter.
pub fn install(
    catalog: &dyn SchemaCatalog,
    entity_type: &str,
    use_default_scope: bool,
) -> StoreResult<()> {
    for scope in [Scope::Approved, Scope::Draft] {
        catalog.define_scope(entity_type, scope.name(), scope.definition())?;
    }
    if use_default_scope {
        catalog.define_default_scope(entity_type, Scope::Approved.predicate())?;
    }
    debug!(
        "Installed approved/draft scopes on {} (default scope: {})",
        entity_type, use_default_scope
    );
    Ok(())
}

/// True when the row carries a back-reference.
pub fn is_draft(entity: &Entity) -> bool {
    entity.is_draft()
}

/// True when some stored row is a draft of `entity`. Unsaved entities have
/// no drafts.
pub fn has_draft(rows: &dyn RowSource, entity: &Entity) -> StoreResult<bool> {
    let Some(id) = entity.id else {
        return Ok(false);
    };
    Ok(!rows.query(&draft_of(&entity.entity_type, id))?.is_empty())
}

fn draft_of(entity_type: &str, live: EntityId) -> Query {
    Scope::Draft
        .query(entity_type)
        .filter(Predicate::equals(APPROVED_VERSION_COLUMN, live.to_string()))
}
