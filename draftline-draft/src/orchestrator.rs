//! Recursive draft construction.
//!
//! The builder never touches storage: it turns a loaded live graph into an
//! unsaved draft graph and hands it back. Saving (and any uniqueness
//! rejection that comes with it) is the caller's business.

use crate::classifier::ResolvedAssociation;
use crate::registry::{DraftConfig, DraftRegistry};
use crate::{ConfigurationError, DraftError, DraftResult, LookupFailure};
use draftline_model::{AttributeCloner, Entity, Related, ShallowCloner};
use draftline_types::EntityId;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds drafts from live entities using the registry's configurations.
#[derive(Clone)]
pub struct DraftBuilder {
    registry: Arc<DraftRegistry>,
    cloner: Arc<dyn ShallowCloner>,
}

impl DraftBuilder {
    /// Creates a builder that copies attributes with [`AttributeCloner`].
    pub fn new(registry: Arc<DraftRegistry>) -> Self {
        Self::with_cloner(registry, Arc::new(AttributeCloner))
    }

    pub fn with_cloner(registry: Arc<DraftRegistry>, cloner: Arc<dyn ShallowCloner>) -> Self {
        Self { registry, cloner }
    }

    pub fn registry(&self) -> &DraftRegistry {
        &self.registry
    }

    /// Clones `live` and its configured associations into a linked, unsaved
    /// draft graph.
    pub fn create_draft(&self, live: &Entity) -> DraftResult<Entity> {
        let config = self
            .registry
            .config(&live.entity_type)
            .ok_or_else(|| LookupFailure::Unregistered(live.entity_type.clone()))?;
        let source = live_id(live)?;

        let mut cloned = 0usize;
        let draft = self.clone_graph(live, &config, &mut cloned)?;
        info!(
            "Created draft of {} {} ({} row(s) cloned)",
            live.entity_type, source, cloned
        );
        Ok(draft)
    }

    fn clone_graph(
        &self,
        live: &Entity,
        config: &DraftConfig,
        cloned: &mut usize,
    ) -> DraftResult<Entity> {
        let source_id = live_id(live)?;

        let mut draft = self.cloner.shallow_clone(live);
        for column in &config.nullify {
            draft.set_null(column);
        }
        draft.id = None;
        draft.approved_version = Some(source_id);
        *cloned += 1;

        for assoc in &config.associations {
            // Unloaded associations stay unloaded on the draft.
            let Some(related) = live.associations.get(&assoc.name) else {
                continue;
            };
            let value = if assoc.kind.is_owned() {
                self.clone_owned(live, assoc, related, cloned)?
            } else {
                related.clone()
            };
            draft.associations.insert(assoc.name.clone(), value);
        }

        debug!("Cloned {} {}", live.entity_type, source_id);
        Ok(draft)
    }

    /// Owned children become new rows, each drafted with its own type's
    /// configuration. Collection order is kept.
    fn clone_owned(
        &self,
        owner: &Entity,
        assoc: &ResolvedAssociation,
        related: &Related,
        cloned: &mut usize,
    ) -> DraftResult<Related> {
        Ok(match related {
            Related::One(None) => Related::One(None),
            Related::One(Some(child)) => {
                Related::One(Some(Box::new(self.clone_child(owner, assoc, child, cloned)?)))
            }
            Related::Many(children) => Related::Many(
                children
                    .iter()
                    .map(|child| self.clone_child(owner, assoc, child, cloned))
                    .collect::<DraftResult<Vec<_>>>()?,
            ),
        })
    }

    fn clone_child(
        &self,
        owner: &Entity,
        assoc: &ResolvedAssociation,
        child: &Entity,
        cloned: &mut usize,
    ) -> DraftResult<Entity> {
        let config = self.registry.config(&child.entity_type).ok_or_else(|| {
            ConfigurationError::MissingTargetConfig {
                owner: owner.entity_type.clone(),
                association: assoc.name.clone(),
                target: child.entity_type.clone(),
            }
        })?;
        self.clone_graph(child, &config, cloned)
    }
}

impl std::fmt::Debug for DraftBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftBuilder")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// The id a draft links back to. Only saved, live rows qualify.
fn live_id(entity: &Entity) -> DraftResult<EntityId> {
    match (entity.id, entity.approved_version) {
        (None, _) => Err(DraftError::Unsaved {
            entity_type: entity.entity_type.clone(),
        }),
        (Some(id), Some(_)) => Err(DraftError::AlreadyDraft {
            entity_type: entity.entity_type.clone(),
            id: id.to_string(),
        }),
        (Some(id), None) => Ok(id),
    }
}
