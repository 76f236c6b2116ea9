use draftline_types::{APPROVED_VERSION_COLUMN, CREATED_AT_COLUMN, ID_COLUMN};
use serde::{Deserialize, Serialize};

/// Describes an entity type's table: its scalar columns and the associations
/// it declares to other types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub entity_type: String,
    /// Scalar column names, including `id`.
    pub columns: Vec<String>,
    #[serde(default)]
    pub associations: Vec<AssociationDef>,
}

impl EntitySchema {
    /// A table with only the identity column.
    pub fn new(entity_type: &str) -> Self {
        Self {
            entity_type: entity_type.into(),
            columns: vec![ID_COLUMN.into()],
            associations: Vec::new(),
        }
    }

    /// Adds a scalar column. Adding a column twice is a no-op.
    #[must_use]
    pub fn column(mut self, name: &str) -> Self {
        if !self.has_column(name) {
            self.columns.push(name.into());
        }
        self
    }

    /// Adds the back-reference column draftable types must carry.
    #[must_use]
    pub fn draftable(self) -> Self {
        self.column(APPROVED_VERSION_COLUMN)
    }

    /// Adds the `created_at` column.
    #[must_use]
    pub fn timestamps(self) -> Self {
        self.column(CREATED_AT_COLUMN)
    }

    /// Declares an association.
    #[must_use]
    pub fn association(mut self, def: AssociationDef) -> Self {
        self.associations.push(def);
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn find_association(&self, name: &str) -> Option<&AssociationDef> {
        self.associations.iter().find(|a| a.name == name)
    }
}

/// A named relationship from one entity type to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssociationDef {
    pub name: String,
    pub kind: AssociationKind,
    /// Entity type on the other end.
    pub target: String,
}

impl AssociationDef {
    fn simple(name: &str, kind: AssociationKind, target: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
        }
    }

    /// The owner holds a single child row.
    pub fn has_one(name: &str, target: &str) -> Self {
        Self::simple(name, AssociationKind::HasOne, target)
    }

    /// The owner holds an ordered collection of child rows.
    pub fn has_many(name: &str, target: &str) -> Self {
        Self::simple(name, AssociationKind::HasMany, target)
    }

    /// Shared rows linked through a join table.
    pub fn has_and_belongs_to_many(name: &str, target: &str) -> Self {
        Self::simple(name, AssociationKind::HasAndBelongsToMany, target)
    }

    /// This row points at a parent row.
    pub fn belongs_to(name: &str, target: &str) -> Self {
        Self::simple(name, AssociationKind::BelongsTo, target)
    }

    /// A collection reached through another association.
    pub fn has_many_through(name: &str, target: &str) -> Self {
        Self::simple(name, AssociationKind::HasManyThrough, target)
    }
}

/// How an association relates the two types.
///
/// Only the owning kinds (`HasOne`, `HasMany`) and the join-table kind
/// (`HasAndBelongsToMany`) are structural enough to be drafted; the draft
/// layer decides that, this enum only describes the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    BelongsTo,
    HasOne,
    HasMany,
    HasManyThrough,
    HasAndBelongsToMany,
}
