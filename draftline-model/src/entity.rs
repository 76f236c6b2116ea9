use draftline_types::{APPROVED_VERSION_COLUMN, EntityId, ID_COLUMN, VersionLink};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One row of an entity type together with whichever associations were
/// loaded alongside it.
///
/// Children are owned, so an `Entity` is always a finite tree even when the
/// type graph has cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// `None` until the row is saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub entity_type: String,
    /// Back-reference to the live row this row is a draft of.
    #[serde(default)]
    pub approved_version: Option<EntityId>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub associations: BTreeMap<String, Related>,
}

/// The loaded value of one association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related {
    One(Option<Box<Entity>>),
    Many(Vec<Entity>),
}

impl Related {
    /// Iterates the related entities regardless of cardinality.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Entity> + '_> {
        match self {
            Self::One(one) => Box::new(one.as_deref().into_iter()),
            Self::Many(many) => Box::new(many.iter()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(one) => usize::from(one.is_some()),
            Self::Many(many) => many.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Entity {
    /// A fresh, unsaved live entity.
    pub fn new(entity_type: &str) -> Self {
        Self {
            id: None,
            entity_type: entity_type.into(),
            approved_version: None,
            attributes: Map::new(),
            associations: BTreeMap::new(),
        }
    }

    /// Sets the identity, as if the row had been loaded from storage.
    #[must_use]
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets a scalar attribute.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Attaches a to-one association.
    #[must_use]
    pub fn with_one(mut self, name: &str, child: Entity) -> Self {
        self.associations
            .insert(name.into(), Related::One(Some(Box::new(child))));
        self
    }

    /// Attaches a collection association.
    #[must_use]
    pub fn with_many(mut self, name: &str, children: Vec<Entity>) -> Self {
        self.associations.insert(name.into(), Related::Many(children));
        self
    }

    /// Reads a scalar attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Extract a string attribute.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_str())
    }

    /// Reads any column as stored, including `id` and the back-reference.
    /// Missing attributes read as null.
    pub fn column_value(&self, column: &str) -> Value {
        match column {
            ID_COLUMN => id_value(self.id),
            APPROVED_VERSION_COLUMN => id_value(self.approved_version),
            _ => self.get(column).cloned().unwrap_or(Value::Null),
        }
    }

    /// Forces a column to null.
    pub fn set_null(&mut self, column: &str) {
        match column {
            ID_COLUMN => self.id = None,
            APPROVED_VERSION_COLUMN => self.approved_version = None,
            _ => {
                self.attributes.insert(column.into(), Value::Null);
            }
        }
    }

    /// The single child of a to-one association, if loaded and present.
    pub fn one(&self, name: &str) -> Option<&Entity> {
        match self.associations.get(name) {
            Some(Related::One(one)) => one.as_deref(),
            _ => None,
        }
    }

    /// Members of a collection association; empty when not loaded.
    pub fn many(&self, name: &str) -> &[Entity] {
        match self.associations.get(name) {
            Some(Related::Many(many)) => many,
            _ => &[],
        }
    }

    pub fn link(&self) -> VersionLink {
        VersionLink::from_back_reference(self.approved_version)
    }

    /// True when the row carries a back-reference to a live row.
    pub fn is_draft(&self) -> bool {
        self.approved_version.is_some()
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }
}

fn id_value(id: Option<EntityId>) -> Value {
    id.map_or(Value::Null, |id| Value::String(id.to_string()))
}
