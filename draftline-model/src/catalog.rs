//! The persistence/query contract the draft layer consumes.
//!
//! Implementations own table metadata, scope definitions and row storage;
//! the draft layer only ever talks to them through these traits.

use crate::{AssociationDef, Entity, Predicate, Query, StoreResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A named scope attached to a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeDef {
    pub predicate: Predicate,
    /// Evaluate without the table's default scope. A scope whose predicate
    /// contradicts the default would otherwise never match anything.
    #[serde(default)]
    pub bypass_default: bool,
}

impl ScopeDef {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            bypass_default: false,
        }
    }

    #[must_use]
    pub fn bypassing_default(mut self) -> Self {
        self.bypass_default = true;
        self
    }

    /// The query this scope runs against `entity_type`.
    pub fn to_query(&self, entity_type: &str) -> Query {
        let query = Query::new(entity_type).filter(self.predicate.clone());
        if self.bypass_default {
            query.unscoped()
        } else {
            query
        }
    }
}

/// Every scope a table carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeSet {
    #[serde(default)]
    pub named: BTreeMap<String, ScopeDef>,
    /// Filter applied to every read that is not `unscoped`.
    #[serde(default)]
    pub default: Option<Predicate>,
}

impl ScopeSet {
    pub fn get(&self, name: &str) -> Option<&ScopeDef> {
        self.named.get(name)
    }
}

/// Table metadata and scope definitions.
pub trait SchemaCatalog: Send + Sync {
    /// False while a table is not yet migrated in.
    fn table_exists(&self, entity_type: &str) -> bool;

    /// Column names of the table; empty for unknown tables.
    fn columns(&self, entity_type: &str) -> BTreeSet<String>;

    fn has_column(&self, entity_type: &str, column: &str) -> bool {
        self.columns(entity_type).contains(column)
    }

    /// Every association the type declares, in declaration order.
    fn associations(&self, entity_type: &str) -> Vec<AssociationDef>;

    /// Looks up one association by name.
    fn reflect_association(&self, entity_type: &str, name: &str) -> Option<AssociationDef> {
        self.associations(entity_type)
            .into_iter()
            .find(|a| a.name == name)
    }

    /// Attaches a named scope to the table, replacing any scope of that name.
    fn define_scope(&self, entity_type: &str, name: &str, scope: ScopeDef) -> StoreResult<()>;

    /// Installs a filter applied to every read that is not `unscoped`.
    fn define_default_scope(&self, entity_type: &str, predicate: Predicate) -> StoreResult<()>;

    /// Snapshot of the table's scopes; empty for unknown tables.
    fn scopes(&self, entity_type: &str) -> ScopeSet;

    /// Replaces every scope on the table with `scopes`. Used to roll back a
    /// partially applied set of definitions.
    fn restore_scopes(&self, entity_type: &str, scopes: ScopeSet) -> StoreResult<()>;
}

/// Row reads.
pub trait RowSource: Send + Sync {
    fn query(&self, query: &Query) -> StoreResult<Vec<Entity>>;
}
