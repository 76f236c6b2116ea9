use crate::Entity;
use std::collections::BTreeMap;

/// Copies a single entity without its associations.
///
/// The default implementation keeps the type, the back-reference and every
/// scalar attribute, and drops the identity so the copy is unsaved. Override
/// it when a type carries attributes that must never be copied (encrypted
/// blobs, external handles) or needs derived values recomputed.
pub trait ShallowCloner: Send + Sync {
    fn shallow_clone(&self, entity: &Entity) -> Entity {
        Entity {
            id: None,
            entity_type: entity.entity_type.clone(),
            approved_version: entity.approved_version,
            attributes: entity.attributes.clone(),
            associations: BTreeMap::new(),
        }
    }
}

/// The plain attribute copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeCloner;

impl ShallowCloner for AttributeCloner {}
