//! Fixture builders shared by the sweep integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

pub fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_vec_pretty(value).expect("encode")).expect("write fixture");
}

pub fn write_params(dir: &Path, k: f64, d: f64) {
    let tc: Vec<Value> = (0..4)
        .map(|i| {
            json!({
                "name": format!("ch{i}"),
                "alpha": 3.0,
                "beta": 20.0,
                "epsilon": 150.0,
                "gamma": [1.0, 0.0]
            })
        })
        .collect();
    write_json(
        &dir.join("params.json"),
        &json!({
            "dt": 0.0001,
            "hextohex_d": 0.03,
            "D": d,
            "k": k,
            "tc": tc
        }),
    );
}

pub fn write_positions(dir: &Path) {
    write_json(
        &dir.join("positions.json"),
        &json!({
            "x": [0.0, 0.1, 0.2, 0.3],
            "y": [0.0, 0.0, 0.1, 0.1],
            "area": [100.0]
        }),
    );
}

pub fn dirich_record(honda: f64, sos: f64) -> Value {
    let ids = [0.0, 0.25, 0.5, 0.75];
    let centroids = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
    let mut record = json!({
        "honda": honda,
        "N": 4,
        "reg_centroids_id": ids,
        "reg_centroids_x": centroids.iter().map(|c| c.0).collect::<Vec<f64>>(),
        "reg_centroids_y": centroids.iter().map(|c| c.1).collect::<Vec<f64>>(),
        "sos_distances": sos,
        "mapdiff": 0.25,
        "area_diff": 12.0
    });
    let map = record.as_object_mut().expect("object");
    for (i, (id, centroid)) in ids.iter().zip(&centroids).enumerate() {
        map.insert(
            format!("dom{i:03}"),
            json!({
                "P": [centroid.0, centroid.1],
                "area": 10.0,
                "edgedev": 0.1,
                "f": id
            }),
        );
    }
    record
}

pub fn write_dirich(dir: &Path, step: u64, record: &Value) {
    write_json(&dir.join(format!("dirich_{step:05}.json")), record);
}

/// A healthy three-timestep run directory. The step-0 snapshot records
/// zero honda and sos, as the writers do before the first detection pass.
pub fn good_run(dir: &Path, k: f64, d: f64) {
    write_params(dir, k, d);
    write_positions(dir);
    write_dirich(dir, 0, &dirich_record(0.0, 0.0));
    write_dirich(dir, 5000, &dirich_record(0.2, 3.0));
    write_dirich(dir, 10000, &dirich_record(0.1, 2.0));
}

/// Writes a field snapshot whose first channel dominates every cell with
/// ratio 0.7.
pub fn write_field(dir: &Path, step: u64) {
    let cells = 4usize;
    let mut record = serde_json::Map::new();
    for ch in 0..4 {
        let value = if ch == 0 { 0.7 } else { 0.1 };
        record.insert(format!("c{ch}"), json!(vec![value; cells]));
        record.insert(format!("a{ch}"), json!(vec![0.0; cells]));
    }
    record.insert("n".into(), json!(vec![1.0; cells]));
    write_json(
        &dir.join(format!("c_{step:05}.json")),
        &Value::Object(record),
    );
}

/// A corrupt run directory: params and positions are fine but the analysis
/// snapshot is malformed JSON.
pub fn corrupt_run(dir: &Path) {
    write_params(dir, 3.0, 0.1);
    write_positions(dir);
    fs::write(dir.join("dirich_00000.json"), b"{truncated").expect("write fixture");
}
