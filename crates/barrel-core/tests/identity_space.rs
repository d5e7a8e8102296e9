use barrel_core::{BarrelError, DomainIdentitySpace, IdentityKey};

#[test]
fn slot_lookup_matches_construction_order() {
    let raw: Vec<f64> = (0..9).map(|i| i as f64 / 9.0).collect();
    let space = DomainIdentitySpace::from_raw_keys(&raw).expect("space");
    assert_eq!(space.len(), 9);
    for (slot, value) in raw.iter().enumerate() {
        assert_eq!(space.slot(IdentityKey::from_raw(*value)), Some(slot));
    }
    assert_eq!(space.slot(IdentityKey::from_raw(0.987)), None);
}

#[test]
fn duplicate_keys_are_rejected() {
    let err = DomainIdentitySpace::from_raw_keys(&[0.0, 0.25, 0.25]).expect_err("must fail");
    assert!(matches!(err, BarrelError::Schema(_)));
}

#[test]
fn quantisation_absorbs_f32_jitter() {
    // The same identity written as f32 and f64 must collapse to one key.
    let as_f32 = (3f32 / 41f32) as f64;
    let as_f64 = 3f64 / 41f64;
    assert_eq!(IdentityKey::from_raw(as_f32), IdentityKey::from_raw(as_f64));
}

#[test]
fn serde_roundtrip_preserves_lookup() {
    let space = DomainIdentitySpace::from_raw_keys(&[0.0, 0.2, 0.4, 0.6, 0.8]).expect("space");
    let json = serde_json::to_string(&space).expect("serialize");
    let restored: DomainIdentitySpace = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(space, restored);
    assert_eq!(restored.slot(IdentityKey::from_raw(0.4)), Some(2));
}
