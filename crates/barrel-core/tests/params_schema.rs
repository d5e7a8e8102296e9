use std::fs;

use barrel_core::{BarrelError, IdentityKey, SimParams};

fn write_params(dir: &std::path::Path, body: &str) {
    fs::write(dir.join("params.json"), body).expect("write params");
}

const FOUR_CHANNELS: &str = r#"{
    "dt": 0.0001,
    "hextohex_d": 0.03,
    "D": 0.2,
    "k": 3.0,
    "tc": [
        {"name": "a1", "alpha": 3.0, "beta": 20.0, "epsilon": 150.0, "gamma": [1.0, 0.0]},
        {"name": "a2", "alpha": 3.0, "beta": 20.0, "epsilon": 150.0, "gamma": [0.5, 0.5]},
        {"name": "b1", "alpha": 4.0, "beta": 22.0, "epsilon": 150.0, "gamma": [0.0, 1.0]},
        {"name": "b2", "alpha": 4.0, "beta": 22.0, "epsilon": 150.0, "gamma": [-0.5, 0.5]}
    ]
}"#;

#[test]
fn loads_and_derives_identities() {
    let dir = tempfile::tempdir().expect("tmp dir");
    write_params(dir.path(), FOUR_CHANNELS);
    let params = SimParams::load(dir.path()).expect("load params");

    assert_eq!(params.num_channels(), 4);
    assert_eq!(params.f, 0.0);
    assert!((params.mean_alpha() - 3.5).abs() < 1e-12);
    assert!((params.mean_beta() - 21.0).abs() < 1e-12);
    assert!((params.mean_epsilon() - 150.0).abs() < 1e-12);

    let space = params.identity_space().expect("identity space");
    assert_eq!(space.len(), 4);
    for i in 0..4 {
        let key = IdentityKey::from_raw((i as f32 / 4.0f32) as f64);
        assert_eq!(space.slot(key), Some(i));
    }

    let by_name = params.identity_by_name();
    assert_eq!(by_name["a1"], params.identity_of(0));
    assert_eq!(by_name["b2"], params.identity_of(3));
}

#[test]
fn missing_file_is_typed() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let err = SimParams::load(dir.path()).expect_err("must fail");
    assert!(matches!(err, BarrelError::MissingRequiredFile(_)));
}

#[test]
fn empty_channel_table_is_rejected() {
    let dir = tempfile::tempdir().expect("tmp dir");
    write_params(
        dir.path(),
        r#"{"dt": 0.0001, "hextohex_d": 0.03, "D": 0.2, "k": 3.0, "tc": []}"#,
    );
    let err = SimParams::load(dir.path()).expect_err("must fail");
    assert!(matches!(err, BarrelError::Schema(_)));
}

#[test]
fn malformed_json_is_a_schema_error() {
    let dir = tempfile::tempdir().expect("tmp dir");
    write_params(dir.path(), "{not json");
    let err = SimParams::load(dir.path()).expect_err("must fail");
    assert!(matches!(err, BarrelError::Schema(_)));
}
