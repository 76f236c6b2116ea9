//! Row predicates and the query value the store evaluates.

use crate::Entity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A filter over the columns of one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    IsNull(String),
    IsNotNull(String),
    Eq(String, Value),
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn is_null(column: &str) -> Self {
        Self::IsNull(column.into())
    }

    pub fn is_not_null(column: &str) -> Self {
        Self::IsNotNull(column.into())
    }

    pub fn equals(column: &str, value: impl Into<Value>) -> Self {
        Self::Eq(column.into(), value.into())
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Self::IsNull(column) => entity.column_value(column).is_null(),
            Self::IsNotNull(column) => !entity.column_value(column).is_null(),
            Self::Eq(column, value) => entity.column_value(column) == *value,
            Self::And(all) => all.iter().all(|p| p.matches(entity)),
        }
    }
}

/// A read against one table.
///
/// Unless `unscoped` is set, the table's default scope (if any) is applied
/// before `filters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub entity_type: String,
    #[serde(default)]
    pub unscoped: bool,
    #[serde(default)]
    pub filters: Vec<Predicate>,
}

impl Query {
    pub fn new(entity_type: &str) -> Self {
        Self {
            entity_type: entity_type.into(),
            unscoped: false,
            filters: Vec::new(),
        }
    }

    /// Bypasses the table's default scope.
    #[must_use]
    pub fn unscoped(mut self) -> Self {
        self.unscoped = true;
        self
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Evaluates the explicit filters against a row. Default scopes are the
    /// store's concern and are not consulted here.
    pub fn matches(&self, entity: &Entity) -> bool {
        entity.entity_type == self.entity_type && self.filters.iter().all(|p| p.matches(entity))
    }
}
