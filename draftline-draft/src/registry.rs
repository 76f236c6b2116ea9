//! Per-type draft configuration.
//!
//! A type is configured once. Registering a root type also configures every
//! type reachable through its draftable associations, each with its own
//! default association set. The cascade is planned as a whole before anything
//! is stored, and scopes installed for it are rolled back if any of them
//! fails, so a failing type anywhere in the graph leaves both the registry
//! and the catalog's scopes as they were.

use crate::classifier::{self, ResolvedAssociation};
use crate::{ConfigurationError, DraftResult, DraftingConfig, LookupFailure, scope};
use draftline_model::{Query, SchemaCatalog, ScopeSet};
use draftline_types::{APPROVED_VERSION_COLUMN, ID_COLUMN};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// How one type is drafted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftConfig {
    pub entity_type: String,
    /// Associations cloned with the owner, in the order they are cloned.
    pub associations: Vec<ResolvedAssociation>,
    /// Columns forced to null on every clone. Always holds `id`.
    pub nullify: BTreeSet<String>,
    /// Whether reads of the type go through the approved scope by default.
    pub default_scope: bool,
}

impl DraftConfig {
    pub fn association(&self, name: &str) -> Option<&ResolvedAssociation> {
        self.associations.iter().find(|a| a.name == name)
    }

    pub fn association_names(&self) -> Vec<&str> {
        self.associations.iter().map(|a| a.name.as_str()).collect()
    }
}

/// Caller-supplied options for [`DraftRegistry::register`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Explicit association list; `None` infers every draftable association.
    pub associations: Option<Vec<String>>,
    /// Extra columns to null on every clone.
    pub nullify: Vec<String>,
    /// Overrides the registry-wide default-scope setting.
    pub use_default_scope: Option<bool>,
}

impl RegisterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn associations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associations = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn nullify<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nullify = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn default_scope(mut self, enabled: bool) -> Self {
        self.use_default_scope = Some(enabled);
        self
    }
}

/// Process-wide set of draft configurations, built once at startup and
/// shared by handle. Reads are lock-light and safe from any thread.
pub struct DraftRegistry {
    catalog: Arc<dyn SchemaCatalog>,
    settings: DraftingConfig,
    configs: RwLock<HashMap<String, Arc<DraftConfig>>>,
}

impl DraftRegistry {
    /// Creates an empty registry with default settings.
    pub fn new(catalog: Arc<dyn SchemaCatalog>) -> Self {
        Self::with_settings(catalog, DraftingConfig::default())
    }

    pub fn with_settings(catalog: Arc<dyn SchemaCatalog>, settings: DraftingConfig) -> Self {
        Self {
            catalog,
            settings,
            configs: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &dyn SchemaCatalog {
        self.catalog.as_ref()
    }

    pub fn settings(&self) -> &DraftingConfig {
        &self.settings
    }

    /// Registers `entity_type` and cascades to its owned associations.
    ///
    /// A missing table is tolerated (migrations may not have run yet) and
    /// registers nothing.
    pub fn register(&self, entity_type: &str, options: RegisterOptions) -> DraftResult<()> {
        if !self.catalog.table_exists(entity_type) {
            debug!("Skipping draft registration of {}: no table", entity_type);
            return Ok(());
        }
        if options.associations.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigurationError::EmptyAssociationList(entity_type.to_string()).into());
        }

        let mut configs = self.write();
        if configs.contains_key(entity_type) {
            return Err(ConfigurationError::AlreadyRegistered(entity_type.to_string()).into());
        }

        let root = self.plan(
            entity_type,
            options.associations.as_deref(),
            &options.nullify,
            options.use_default_scope.unwrap_or(self.settings.default_scope),
        )?;
        let planned = self.plan_cascade(root, &configs)?;
        self.commit(&mut configs, planned)
    }

    /// Registers `entity_type` with exactly `associations` and nothing below.
    pub fn register_subset(&self, entity_type: &str, associations: &[&str]) -> DraftResult<()> {
        if !self.catalog.table_exists(entity_type) {
            debug!("Skipping draft registration of {}: no table", entity_type);
            return Ok(());
        }
        if associations.is_empty() {
            return Err(ConfigurationError::EmptyAssociationList(entity_type.to_string()).into());
        }

        let mut configs = self.write();
        if configs.contains_key(entity_type) {
            return Err(ConfigurationError::AlreadyRegistered(entity_type.to_string()).into());
        }

        let names: Vec<String> = associations.iter().map(|s| (*s).to_string()).collect();
        let config = self.plan(entity_type, Some(&names), &[], self.settings.default_scope)?;
        self.commit(&mut configs, vec![config])
    }

    /// Drops the configuration of `entity_type`. Drafting it afterwards is a
    /// lookup failure, and owners still configured to clone it fail mid-graph.
    /// Meant for tests; configurations cascaded from it are left in place.
    pub fn deregister(&self, entity_type: &str) -> bool {
        let removed = self.write().remove(entity_type).is_some();
        if removed {
            warn!("Deregistered {} from drafting", entity_type);
        }
        removed
    }

    pub fn config(&self, entity_type: &str) -> Option<Arc<DraftConfig>> {
        self.read().get(entity_type).cloned()
    }

    pub fn is_registered(&self, entity_type: &str) -> bool {
        self.read().contains_key(entity_type)
    }

    /// Registered type names, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.read().keys().cloned().collect();
        types.sort();
        types
    }

    /// Query for the approved rows of a registered type.
    pub fn approved(&self, entity_type: &str) -> DraftResult<Query> {
        self.scope_query(entity_type, scope::Scope::Approved)
    }

    /// Query for the draft rows of a registered type.
    pub fn drafts(&self, entity_type: &str) -> DraftResult<Query> {
        self.scope_query(entity_type, scope::Scope::Draft)
    }

    fn scope_query(&self, entity_type: &str, scope: scope::Scope) -> DraftResult<Query> {
        if !self.is_registered(entity_type) {
            return Err(LookupFailure::Unregistered(entity_type.to_string()).into());
        }
        Ok(scope.query(entity_type))
    }

    /// Depth-first walk over every configured association's target. The
    /// visited set makes cyclic type graphs terminate; types already
    /// registered are left alone. Owned targets must carry the back-reference
    /// since their rows get cloned. Many-to-many targets are shared rather
    /// than cloned, so one without it is simply not draftable and is skipped.
    fn plan_cascade(
        &self,
        root: DraftConfig,
        registered: &HashMap<String, Arc<DraftConfig>>,
    ) -> DraftResult<Vec<DraftConfig>> {
        let mut visited: HashSet<String> = HashSet::from([root.entity_type.clone()]);
        let mut stack = vec![root];
        let mut planned = Vec::new();

        while let Some(config) = stack.pop() {
            for assoc in &config.associations {
                let target = &assoc.target;
                if visited.contains(target) || registered.contains_key(target) {
                    continue;
                }
                if !self.catalog.table_exists(target) {
                    debug!("Not cascading into {}: no table", target);
                    continue;
                }
                if !assoc.kind.is_owned()
                    && !self.catalog.has_column(target, APPROVED_VERSION_COLUMN)
                {
                    debug!("Not cascading into shared {}: no back-reference", target);
                    continue;
                }
                visited.insert(target.clone());
                debug!(
                    "Cascading draft registration {}.{} -> {}",
                    config.entity_type, assoc.name, target
                );
                stack.push(self.plan(target, None, &[], self.settings.default_scope)?);
            }
            planned.push(config);
        }
        Ok(planned)
    }

    /// Resolves one type's configuration without storing it.
    fn plan(
        &self,
        entity_type: &str,
        explicit: Option<&[String]>,
        extra_nullify: &[String],
        default_scope: bool,
    ) -> DraftResult<DraftConfig> {
        let columns = self.catalog.columns(entity_type);
        if !columns.contains(APPROVED_VERSION_COLUMN) {
            return Err(ConfigurationError::MissingBackReference(entity_type.to_string()).into());
        }

        let associations = match explicit {
            Some(names) => self.resolve_explicit(entity_type, names)?,
            None => classifier::draftable_associations(
                self.catalog(),
                entity_type,
                &self.settings.reserved_associations,
            ),
        };

        let mut nullify = BTreeSet::from([ID_COLUMN.to_string()]);
        nullify.extend(
            self.settings
                .timestamp_columns
                .iter()
                .filter(|c| columns.contains(*c))
                .cloned(),
        );
        for name in extra_nullify {
            if !columns.contains(name) {
                return Err(ConfigurationError::UnknownAttribute {
                    entity_type: entity_type.to_string(),
                    name: name.clone(),
                }
                .into());
            }
            nullify.insert(name.clone());
        }

        Ok(DraftConfig {
            entity_type: entity_type.to_string(),
            associations,
            nullify,
            default_scope,
        })
    }

    fn resolve_explicit(
        &self,
        entity_type: &str,
        names: &[String],
    ) -> DraftResult<Vec<ResolvedAssociation>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            if self.settings.is_reserved(name) {
                return Err(ConfigurationError::ReservedAssociation {
                    entity_type: entity_type.to_string(),
                    name: name.clone(),
                }
                .into());
            }
            if seen.insert(name.as_str()) {
                resolved.push(classifier::resolve(self.catalog(), entity_type, name)?);
            }
        }
        Ok(resolved)
    }

    /// Installs scopes for every planned type, then stores the configs. If
    /// any install fails, every table touched so far gets its previous
    /// scopes back.
    fn commit(
        &self,
        configs: &mut HashMap<String, Arc<DraftConfig>>,
        planned: Vec<DraftConfig>,
    ) -> DraftResult<()> {
        let mut touched: Vec<(String, ScopeSet)> = Vec::with_capacity(planned.len());
        for config in &planned {
            let entity_type = &config.entity_type;
            touched.push((entity_type.clone(), self.catalog.scopes(entity_type)));
            if let Err(err) = scope::install(self.catalog(), entity_type, config.default_scope) {
                self.restore_scopes(touched);
                return Err(err.into());
            }
        }
        for config in planned {
            info!(
                "Registered {} for drafting (associations: {:?})",
                config.entity_type,
                config.association_names()
            );
            configs.insert(config.entity_type.clone(), Arc::new(config));
        }
        Ok(())
    }

    fn restore_scopes(&self, touched: Vec<(String, ScopeSet)>) {
        for (entity_type, previous) in touched.into_iter().rev() {
            match self.catalog.restore_scopes(&entity_type, previous) {
                Ok(()) => debug!("Rolled back scopes on {}", entity_type),
                Err(e) => warn!("Failed to roll back scopes on {}: {}", entity_type, e),
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<DraftConfig>>> {
        self.configs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<DraftConfig>>> {
        self.configs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DraftRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftRegistry")
            .field("settings", &self.settings)
            .field("registered", &self.registered_types())
            .finish()
    }
}
