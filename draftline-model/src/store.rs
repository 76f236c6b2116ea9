//! In-memory store implementing [`SchemaCatalog`] and [`RowSource`].
//!
//! Saves are whole-graph and atomic: every row reachable from the saved
//! entity is planned first, constraints are checked against the plan and the
//! table, and only then is anything written.

use crate::{
    AssociationDef, Entity, EntitySchema, Predicate, Query, Related, RowSource, SchemaCatalog,
    ScopeDef, ScopeSet, StoreError, StoreResult,
};
use draftline_types::{APPROVED_VERSION_COLUMN, CREATED_AT_COLUMN, EntityId};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug)]
struct Table {
    schema: EntitySchema,
    rows: BTreeMap<EntityId, Entity>,
    scopes: ScopeSet,
}

impl Table {
    fn new(schema: EntitySchema) -> Self {
        Self {
            schema,
            rows: BTreeMap::new(),
            scopes: ScopeSet::default(),
        }
    }

    fn visible(&self, row: &Entity, unscoped: bool) -> bool {
        unscoped || self.scopes.default.as_ref().is_none_or(|p| p.matches(row))
    }
}

#[derive(Debug, Default)]
struct StoreState {
    tables: BTreeMap<String, Table>,
    /// (owner id, association name) -> member ids in order.
    links: BTreeMap<(EntityId, String), Vec<EntityId>>,
}

impl StoreState {
    fn table(&self, entity_type: &str) -> StoreResult<&Table> {
        self.tables
            .get(entity_type)
            .ok_or_else(|| StoreError::UnknownTable(entity_type.to_string()))
    }

    fn table_mut(&mut self, entity_type: &str) -> StoreResult<&mut Table> {
        self.tables
            .get_mut(entity_type)
            .ok_or_else(|| StoreError::UnknownTable(entity_type.to_string()))
    }

    /// One live row has at most one draft per table.
    fn check_unique_back_reference(&self, rows: &[Entity]) -> StoreResult<()> {
        let mut claimed: BTreeMap<(&str, EntityId), EntityId> = BTreeMap::new();
        for row in rows {
            let (Some(id), Some(back_ref)) = (row.id, row.approved_version) else {
                continue;
            };
            let clash_in_batch = claimed
                .insert((row.entity_type.as_str(), back_ref), id)
                .is_some_and(|other| other != id);
            let clash_in_table = self.table(&row.entity_type)?.rows.values().any(|existing| {
                existing.approved_version == Some(back_ref) && existing.id != Some(id)
            });
            if clash_in_batch || clash_in_table {
                return Err(StoreError::UniqueViolation {
                    entity_type: row.entity_type.clone(),
                    column: APPROVED_VERSION_COLUMN.to_string(),
                    value: back_ref.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SavePlan {
    rows: Vec<Entity>,
    links: Vec<((EntityId, String), Vec<EntityId>)>,
}

impl SavePlan {
    /// Assigns ids and creation stamps in place and records the flattened
    /// row plus its association links.
    fn collect(&mut self, state: &StoreState, entity: &mut Entity, now: i64) -> StoreResult<EntityId> {
        let table = state.table(&entity.entity_type)?;
        let id = *entity.id.get_or_insert_with(EntityId::new);
        if table.schema.has_column(CREATED_AT_COLUMN)
            && entity.column_value(CREATED_AT_COLUMN).is_null()
        {
            entity
                .attributes
                .insert(CREATED_AT_COLUMN.to_string(), Value::from(now));
        }

        for (name, related) in &mut entity.associations {
            let members = match related {
                Related::One(Some(child)) => vec![self.collect(state, child, now)?],
                Related::One(None) => Vec::new(),
                Related::Many(children) => children
                    .iter_mut()
                    .map(|child| self.collect(state, child, now))
                    .collect::<StoreResult<Vec<_>>>()?,
            };
            self.links.push(((id, name.clone()), members));
        }

        self.rows.push(Entity {
            id: Some(id),
            entity_type: entity.entity_type.clone(),
            approved_version: entity.approved_version,
            attributes: entity.attributes.clone(),
            associations: BTreeMap::new(),
        });
        Ok(id)
    }
}

/// Thread-safe in-memory tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    /// Creates an empty store with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with one table per schema.
    pub fn with_schemas(schemas: impl IntoIterator<Item = EntitySchema>) -> StoreResult<Self> {
        let store = Self::new();
        for schema in schemas {
            store.create_table(schema)?;
        }
        Ok(store)
    }

    /// Creates a store from a JSON array of schemas.
    pub fn from_schemas_json(json: &str) -> StoreResult<Self> {
        let schemas: Vec<EntitySchema> = serde_json::from_str(json)?;
        Self::with_schemas(schemas)
    }

    pub fn create_table(&self, schema: EntitySchema) -> StoreResult<()> {
        let mut state = self.write();
        if state.tables.contains_key(&schema.entity_type) {
            return Err(StoreError::TableExists(schema.entity_type));
        }
        debug!("Created table {}", schema.entity_type);
        state
            .tables
            .insert(schema.entity_type.clone(), Table::new(schema));
        Ok(())
    }

    pub fn schema(&self, entity_type: &str) -> Option<EntitySchema> {
        self.read().tables.get(entity_type).map(|t| t.schema.clone())
    }

    /// Saves the entity and every loaded association, assigning ids to unsaved
    /// rows. Returns the graph as saved.
    ///
    /// Fails without writing anything if a table is missing or a draft would
    /// become the second draft of the same live row.
    pub fn save(&self, entity: &Entity) -> StoreResult<Entity> {
        let mut saved = entity.clone();
        let now = chrono::Utc::now().timestamp_millis();
        let mut state = self.write();

        let mut plan = SavePlan::default();
        let root_id = plan.collect(&state, &mut saved, now)?;
        state.check_unique_back_reference(&plan.rows)?;

        let row_count = plan.rows.len();
        for row in plan.rows {
            if let (Some(id), Ok(table)) = (row.id, state.table_mut(&row.entity_type)) {
                table.rows.insert(id, row);
            }
        }
        state.links.extend(plan.links);

        debug!(
            "Saved {} row(s) rooted at {} {}",
            row_count, saved.entity_type, root_id
        );
        Ok(saved)
    }

    /// Loads one flattened row (associations are not loaded).
    pub fn find(&self, entity_type: &str, id: EntityId) -> StoreResult<Entity> {
        self.read()
            .table(entity_type)?
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
            })
    }

    /// Deletes one row and the links it owns.
    pub fn delete(&self, entity_type: &str, id: EntityId) -> StoreResult<Entity> {
        let mut state = self.write();
        let removed = state
            .table_mut(entity_type)?
            .rows
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
            })?;
        state.links.retain(|(owner, _), _| *owner != id);
        debug!("Deleted {} {}", entity_type, id);
        Ok(removed)
    }

    /// Ids linked under `owner`'s association, in saved order.
    pub fn linked_ids(&self, owner: EntityId, association: &str) -> Vec<EntityId> {
        self.read()
            .links
            .get(&(owner, association.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Runs a named scope previously attached with `define_scope`.
    pub fn query_scope(&self, entity_type: &str, name: &str) -> StoreResult<Vec<Entity>> {
        let query = {
            let state = self.read();
            let table = state.table(entity_type)?;
            table
                .scopes
                .get(name)
                .ok_or_else(|| StoreError::UnknownScope {
                    entity_type: entity_type.to_string(),
                    name: name.to_string(),
                })?
                .to_query(entity_type)
        };
        self.query(&query)
    }

    /// Rows in the table, ignoring every scope.
    pub fn row_count(&self, entity_type: &str) -> usize {
        self.read()
            .tables
            .get(entity_type)
            .map_or(0, |t| t.rows.len())
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SchemaCatalog for MemoryStore {
    fn table_exists(&self, entity_type: &str) -> bool {
        self.read().tables.contains_key(entity_type)
    }

    fn columns(&self, entity_type: &str) -> BTreeSet<String> {
        self.read()
            .tables
            .get(entity_type)
            .map(|t| t.schema.columns.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn has_column(&self, entity_type: &str, column: &str) -> bool {
        self.read()
            .tables
            .get(entity_type)
            .is_some_and(|t| t.schema.has_column(column))
    }

    fn associations(&self, entity_type: &str) -> Vec<AssociationDef> {
        self.read()
            .tables
            .get(entity_type)
            .map(|t| t.schema.associations.clone())
            .unwrap_or_default()
    }

    fn reflect_association(&self, entity_type: &str, name: &str) -> Option<AssociationDef> {
        self.read()
            .tables
            .get(entity_type)
            .and_then(|t| t.schema.find_association(name).cloned())
    }

    fn define_scope(&self, entity_type: &str, name: &str, scope: ScopeDef) -> StoreResult<()> {
        let mut state = self.write();
        state
            .table_mut(entity_type)?
            .scopes
            .named
            .insert(name.to_string(), scope);
        debug!("Defined scope {} on {}", name, entity_type);
        Ok(())
    }

    fn define_default_scope(&self, entity_type: &str, predicate: Predicate) -> StoreResult<()> {
        let mut state = self.write();
        state.table_mut(entity_type)?.scopes.default = Some(predicate);
        debug!("Defined default scope on {}", entity_type);
        Ok(())
    }

    fn scopes(&self, entity_type: &str) -> ScopeSet {
        self.read()
            .tables
            .get(entity_type)
            .map(|t| t.scopes.clone())
            .unwrap_or_default()
    }

    fn restore_scopes(&self, entity_type: &str, scopes: ScopeSet) -> StoreResult<()> {
        let mut state = self.write();
        state.table_mut(entity_type)?.scopes = scopes;
        debug!("Restored scopes on {}", entity_type);
        Ok(())
    }
}

impl RowSource for MemoryStore {
    fn query(&self, query: &Query) -> StoreResult<Vec<Entity>> {
        let state = self.read();
        let table = state.table(&query.entity_type)?;
        Ok(table
            .rows
            .values()
            .filter(|row| table.visible(row, query.unscoped) && query.matches(row))
            .cloned()
            .collect())
    }
}
