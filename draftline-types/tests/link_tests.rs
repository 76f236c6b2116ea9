use draftline_types::{EntityId, VersionLink};
use proptest::prelude::*;
use serde_json::json;

// ── Classification ────────────────────────────────────────────────

#[test]
fn null_back_reference_is_live() {
    let link = VersionLink::from_back_reference(None);
    assert_eq!(link, VersionLink::Live);
    assert!(link.is_live());
    assert!(!link.is_draft());
}

#[test]
fn back_reference_marks_a_draft() {
    let live = EntityId::new();
    let link: VersionLink = Some(live).into();
    assert_eq!(link, VersionLink::DraftOf(live));
    assert!(link.is_draft());
    assert_eq!(link.back_reference(), Some(live));
}

// ── Serialization ─────────────────────────────────────────────────

#[test]
fn serializes_with_state_tag() {
    let live = EntityId::new();
    let value = serde_json::to_value(VersionLink::DraftOf(live)).unwrap();
    assert_eq!(
        value,
        json!({"state": "draft_of", "approved_version": live.to_string()})
    );
    let value = serde_json::to_value(VersionLink::Live).unwrap();
    assert_eq!(value, json!({"state": "live"}));
}

// ── Properties ────────────────────────────────────────────────────

proptest! {
    /// Every back-reference value maps to exactly one of live / draft.
    #[test]
    fn link_is_live_xor_draft(raw in any::<Option<u128>>()) {
        let back_ref = raw.map(|n| EntityId::from_uuid(uuid::Uuid::from_u128(n)));
        let link = VersionLink::from_back_reference(back_ref);
        prop_assert!(link.is_live() ^ link.is_draft());
        prop_assert_eq!(link.back_reference(), back_ref);
    }
}
