#![allow(dead_code)]

use draftline_draft::DraftRegistry;
use draftline_model::{AssociationDef, Entity, EntitySchema, MemoryStore};
use std::sync::Arc;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn business_schema() -> EntitySchema {
    EntitySchema::new("business")
        .draftable()
        .timestamps()
        .column("name")
        .column("tax_id")
        .association(AssociationDef::has_many("employees", "employee"))
        .association(AssociationDef::has_many("images", "image"))
        .association(AssociationDef::has_one("address", "address"))
        .association(AssociationDef::has_many("vending_machines", "vending_machine"))
        .association(AssociationDef::belongs_to("owner", "person"))
        .association(AssociationDef::has_many_through("customers", "person"))
        .association(AssociationDef::has_one("draft", "business"))
}

pub fn schemas() -> Vec<EntitySchema> {
    vec![
        business_schema(),
        EntitySchema::new("employee")
            .draftable()
            .timestamps()
            .column("name")
            .association(AssociationDef::belongs_to("business", "business"))
            .association(AssociationDef::has_one("home_address", "address"))
            .association(AssociationDef::has_many(
                "confidential_browsing_activities",
                "browsing_activity",
            )),
        EntitySchema::new("address").draftable().column("city"),
        EntitySchema::new("image")
            .draftable()
            .column("url")
            .association(AssociationDef::has_and_belongs_to_many("tags", "tag")),
        EntitySchema::new("vending_machine").draftable().column("serial"),
        EntitySchema::new("browsing_activity").draftable().column("url"),
        EntitySchema::new("tag").column("label"),
        EntitySchema::new("person").column("name"),
    ]
}

pub fn make_store() -> Arc<MemoryStore> {
    init_tracing();
    Arc::new(MemoryStore::with_schemas(schemas()).unwrap())
}

pub fn make_registry(store: &Arc<MemoryStore>) -> Arc<DraftRegistry> {
    Arc::new(DraftRegistry::new(store.clone()))
}

pub fn employee(i: usize) -> Entity {
    Entity::new("employee")
        .with("name", format!("emp-{i}"))
        .with_one(
            "home_address",
            Entity::new("address").with("city", format!("city-{i}")),
        )
        .with_many(
            "confidential_browsing_activities",
            vec![Entity::new("browsing_activity").with("url", "https://example.com")],
        )
}

/// A saved business with `employees` employees, one address, one tagged
/// image and no vending machines.
pub fn live_business(store: &MemoryStore, employees: usize) -> Entity {
    let graph = Entity::new("business")
        .with("name", "Acme")
        .with("tax_id", "NO-123")
        .with_one("address", Entity::new("address").with("city", "Oslo"))
        .with_many("employees", (0..employees).map(employee).collect())
        .with_many(
            "images",
            vec![Entity::new("image").with("url", "logo.png").with_many(
                "tags",
                vec![
                    Entity::new("tag").with("label", "brand"),
                    Entity::new("tag").with("label", "logo"),
                ],
            )],
        )
        .with_many("vending_machines", Vec::new());
    store.save(&graph).unwrap()
}
