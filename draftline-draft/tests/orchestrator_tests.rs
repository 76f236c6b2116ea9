mod common;

use common::{live_business, make_registry, make_store};
use draftline_draft::{
    ConfigurationError, DraftBuilder, DraftError, LookupFailure, RegisterOptions, has_draft,
    is_draft,
};
use draftline_model::{AttributeCloner, Entity, Related, ShallowCloner};
use draftline_types::EntityId;
use serde_json::Value;
use std::sync::Arc;

fn make_builder() -> (Arc<draftline_model::MemoryStore>, DraftBuilder) {
    let store = make_store();
    let registry = make_registry(&store);
    (store, DraftBuilder::new(registry))
}

// ── Business scenario ────────────────────────────────────────────

#[test]
fn business_draft_clones_employees_and_address() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new())
        .unwrap();
    let live = live_business(&store, 3);

    let draft = builder.create_draft(&live).unwrap();

    assert_eq!(draft.id, None);
    assert_eq!(draft.approved_version, live.id);
    assert_eq!(draft.get_str("name"), Some("Acme"));

    let employees = draft.many("employees");
    assert_eq!(employees.len(), 3);
    for (clone, original) in employees.iter().zip(live.many("employees")) {
        assert_eq!(clone.id, None);
        assert_eq!(clone.approved_version, original.id);
        assert_eq!(clone.get_str("name"), original.get_str("name"));
    }

    let address = draft.one("address").unwrap();
    assert_eq!(address.id, None);
    assert_eq!(address.approved_version, live.one("address").unwrap().id);
}

#[test]
fn draft_nulls_identity_and_timestamps() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new().nullify(["tax_id"]))
        .unwrap();
    let live = live_business(&store, 1);
    assert!(live.get("created_at").unwrap().is_i64());

    let draft = builder.create_draft(&live).unwrap();
    assert_eq!(draft.get("created_at"), Some(&Value::Null));
    assert_eq!(draft.get("tax_id"), Some(&Value::Null));
    assert_eq!(draft.many("employees")[0].get("created_at"), Some(&Value::Null));
}

#[test]
fn to_many_order_is_preserved() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new())
        .unwrap();
    let live = live_business(&store, 5);

    let draft = builder.create_draft(&live).unwrap();
    let names: Vec<_> = draft
        .many("employees")
        .iter()
        .map(|e| e.get_str("name").unwrap().to_string())
        .collect();
    assert_eq!(names, ["emp-0", "emp-1", "emp-2", "emp-3", "emp-4"]);
}

#[test]
fn nested_children_are_cloned_with_their_own_config() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new())
        .unwrap();
    let live = live_business(&store, 1);

    let draft = builder.create_draft(&live).unwrap();
    let employee = &draft.many("employees")[0];
    let original = &live.many("employees")[0];
    assert_eq!(
        employee.one("home_address").unwrap().approved_version,
        original.one("home_address").unwrap().id
    );
    assert_eq!(employee.many("confidential_browsing_activities").len(), 1);
}

#[test]
fn empty_and_unloaded_associations() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new())
        .unwrap();
    let mut live = live_business(&store, 0);
    live.associations.remove("address");

    let draft = builder.create_draft(&live).unwrap();
    assert_eq!(draft.associations.get("vending_machines"), Some(&Related::Many(Vec::new())));
    assert!(draft.many("employees").is_empty());
    assert!(!draft.associations.contains_key("address"));
}

#[test]
fn unconfigured_associations_are_not_copied() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new().associations(["address"]))
        .unwrap();
    let live = live_business(&store, 2);

    let draft = builder.create_draft(&live).unwrap();
    assert!(draft.one("address").is_some());
    assert!(!draft.associations.contains_key("employees"));
    assert!(!draft.associations.contains_key("images"));
}

// ── Employee subset scenario ─────────────────────────────────────

#[test]
fn employee_subset_leaves_browsing_activity_unset() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register_subset("employee", &["home_address"])
        .unwrap();
    builder
        .registry()
        .register("business", RegisterOptions::new())
        .unwrap();
    let live = live_business(&store, 2);

    let draft = builder.create_draft(&live).unwrap();
    for employee in draft.many("employees") {
        assert!(employee.one("home_address").is_some());
        assert!(!employee
            .associations
            .contains_key("confidential_browsing_activities"));
    }
}

// ── Many-to-many ─────────────────────────────────────────────────

#[test]
fn many_to_many_members_are_reassociated_not_cloned() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new())
        .unwrap();
    let live = live_business(&store, 0);

    let draft = builder.create_draft(&live).unwrap();
    let image = &draft.many("images")[0];
    let original_tags: Vec<Option<EntityId>> =
        live.many("images")[0].many("tags").iter().map(|t| t.id).collect();
    let draft_tags: Vec<Option<EntityId>> = image.many("tags").iter().map(|t| t.id).collect();
    assert_eq!(draft_tags, original_tags);
    assert!(image.many("tags").iter().all(|t| !is_draft(t)));

    let tags_before = store.row_count("tag");
    let saved = store.save(&draft).unwrap();
    assert_eq!(store.row_count("tag"), tags_before);
    let image_id = saved.many("images")[0].id.unwrap();
    assert_eq!(
        store.linked_ids(image_id, "tags"),
        original_tags.into_iter().flatten().collect::<Vec<_>>()
    );
}

// ── Failures ─────────────────────────────────────────────────────

#[test]
fn unregistered_type_is_a_lookup_failure() {
    let (store, builder) = make_builder();
    let live = live_business(&store, 0);
    let err = builder.create_draft(&live).unwrap_err();
    assert!(matches!(
        err,
        DraftError::Lookup(LookupFailure::Unregistered(ref t)) if t == "business"
    ));
}

#[test]
fn deregistered_child_fails_mid_graph() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new())
        .unwrap();
    builder.registry().deregister("address");
    let live = live_business(&store, 1);

    let err = builder.create_draft(&live).unwrap_err();
    assert!(matches!(
        err,
        DraftError::Configuration(ConfigurationError::MissingTargetConfig { ref target, .. })
            if target == "address"
    ));
}

#[test]
fn unsaved_source_is_rejected() {
    let (_store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new())
        .unwrap();
    let err = builder.create_draft(&Entity::new("business")).unwrap_err();
    assert!(matches!(err, DraftError::Unsaved { .. }));
}

#[test]
fn drafting_a_draft_is_rejected() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new())
        .unwrap();
    let live = live_business(&store, 0);
    let draft = store.save(&builder.create_draft(&live).unwrap()).unwrap();

    let err = builder.create_draft(&draft).unwrap_err();
    assert!(matches!(err, DraftError::AlreadyDraft { .. }));
}

// ── Persistence of drafts ────────────────────────────────────────

#[test]
fn saved_draft_is_found_by_has_draft() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new())
        .unwrap();
    let live = live_business(&store, 1);
    assert!(!has_draft(&*store, &live).unwrap());

    let draft = store.save(&builder.create_draft(&live).unwrap()).unwrap();
    assert!(is_draft(&draft));
    assert!(!is_draft(&live));
    assert!(has_draft(&*store, &live).unwrap());
    assert!(has_draft(&*store, &live.many("employees")[0]).unwrap());
    assert!(!has_draft(&*store, &Entity::new("business")).unwrap());
}

#[test]
fn second_draft_save_surfaces_store_rejection() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new())
        .unwrap();
    let live = live_business(&store, 1);
    store.save(&builder.create_draft(&live).unwrap()).unwrap();

    let rows_before = store.row_count("business");
    let err = store
        .save(&builder.create_draft(&live).unwrap())
        .unwrap_err();
    let err: DraftError = err.into();
    assert!(matches!(
        err,
        DraftError::Store(draftline_model::StoreError::UniqueViolation { .. })
    ));
    assert_eq!(store.row_count("business"), rows_before);
}

#[test]
fn concurrent_drafts_of_same_entity_persist_once() {
    let (store, builder) = make_builder();
    builder
        .registry()
        .register("business", RegisterOptions::new())
        .unwrap();
    let live = Arc::new(live_business(&store, 2));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let builder = builder.clone();
            let live = Arc::clone(&live);
            std::thread::spawn(move || {
                let draft = builder.create_draft(&live).unwrap();
                store.save(&draft).is_ok()
            })
        })
        .collect();
    let persisted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(persisted, 1);
}

// ── Custom cloner ────────────────────────────────────────────────

struct StampingCloner;

impl ShallowCloner for StampingCloner {
    fn shallow_clone(&self, entity: &Entity) -> Entity {
        AttributeCloner.shallow_clone(entity).with("copied", true)
    }
}

#[test]
fn custom_cloner_is_used_at_every_level() {
    let store = make_store();
    let registry = make_registry(&store);
    registry.register("business", RegisterOptions::new()).unwrap();
    let builder = DraftBuilder::with_cloner(registry, Arc::new(StampingCloner));
    let live = live_business(&store, 2);

    let draft = builder.create_draft(&live).unwrap();
    assert_eq!(draft.get("copied"), Some(&Value::Bool(true)));
    assert!(draft
        .many("employees")
        .iter()
        .all(|e| e.get("copied") == Some(&Value::Bool(true))));
}
