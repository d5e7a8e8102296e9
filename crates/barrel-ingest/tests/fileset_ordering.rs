use std::fs;

use barrel_core::BarrelError;
use barrel_ingest::SnapshotFileSet;

#[test]
fn discovery_orders_by_timestep() {
    let dir = tempfile::tempdir().expect("tmp dir");
    for step in [10000u64, 0, 5000] {
        fs::write(dir.path().join(format!("dirich_{step:05}.json")), "{}").expect("touch");
    }
    // A decoy from the other family must not match.
    fs::write(dir.path().join("c_00000.json"), "{}").expect("touch");

    let set = SnapshotFileSet::discover(dir.path(), "dirich_", ".json").expect("discover");
    assert_eq!(set.len(), 3);
    assert_eq!(set.timesteps(), vec![0, 5000, 10000]);
}

#[test]
fn empty_family_is_reported() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let err = SnapshotFileSet::discover(dir.path(), "dirich_", ".json").expect_err("must fail");
    assert!(matches!(err, BarrelError::EmptySet(_)));
}

#[test]
fn non_integer_timestep_is_a_pattern_mismatch() {
    let dir = tempfile::tempdir().expect("tmp dir");
    fs::write(dir.path().join("dirich_00000.json"), "{}").expect("touch");
    fs::write(dir.path().join("dirich_final.json"), "{}").expect("touch");
    let err = SnapshotFileSet::discover(dir.path(), "dirich_", ".json").expect_err("must fail");
    assert!(matches!(err, BarrelError::PatternMismatch(_)));
}

#[test]
fn duplicate_timestep_is_reported_not_overwritten() {
    let dir = tempfile::tempdir().expect("tmp dir");
    fs::write(dir.path().join("dirich_5000.json"), "{}").expect("touch");
    fs::write(dir.path().join("dirich_05000.json"), "{}").expect("touch");
    let err = SnapshotFileSet::discover(dir.path(), "dirich_", ".json").expect_err("must fail");
    assert!(matches!(err, BarrelError::DuplicateTimestep(_)));
}

#[test]
fn single_timestep_discovery_uses_padded_encoding() {
    let dir = tempfile::tempdir().expect("tmp dir");
    for step in [0u64, 5000, 10000] {
        fs::write(dir.path().join(format!("dirich_{step:05}.json")), "{}").expect("touch");
    }
    let set =
        SnapshotFileSet::discover_at(dir.path(), "dirich_", ".json", 5000).expect("discover");
    assert_eq!(set.timesteps(), vec![5000]);

    let err = SnapshotFileSet::discover_at(dir.path(), "dirich_", ".json", 7777)
        .expect_err("absent target");
    assert!(matches!(err, BarrelError::EmptySet(_)));
}
