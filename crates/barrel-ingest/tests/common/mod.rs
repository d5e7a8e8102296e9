//! Fixture builders shared by the ingest integration tests.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

/// Step duration used by every fixture.
pub const DT: f64 = 0.0001;

/// Identity keys of the standard four-channel fixture.
pub fn standard_ids() -> Vec<f64> {
    vec![0.0, 0.25, 0.5, 0.75]
}

/// Unit-square corner centroids for the four standard identities.
pub fn standard_centroids() -> Vec<(f64, f64)> {
    vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
}

pub fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_vec_pretty(value).expect("encode")).expect("write fixture");
}

pub fn write_params(dir: &Path, channels: usize) {
    let tc: Vec<Value> = (0..channels)
        .map(|i| {
            json!({
                "name": format!("ch{i}"),
                "alpha": 3.0,
                "beta": 20.0,
                "epsilon": 150.0,
                "gamma": [1.0 - i as f64 * 0.5, i as f64 * 0.5]
            })
        })
        .collect();
    write_json(
        &dir.join("params.json"),
        &json!({
            "dt": DT,
            "hextohex_d": 0.03,
            "D": 0.2,
            "k": 3.0,
            "tc": tc
        }),
    );
}

pub fn write_positions(dir: &Path, cells: usize, total_area: f64) {
    let x: Vec<f64> = (0..cells).map(|i| i as f64 * 0.1).collect();
    let y: Vec<f64> = (0..cells).map(|i| (i % 3) as f64 * 0.1).collect();
    write_json(
        &dir.join("positions.json"),
        &json!({ "x": x, "y": y, "area": [total_area] }),
    );
}

/// Builds one domain group at the given centroid with a single boundary
/// vertex.
pub fn domain_group(f: f64, centroid: (f64, f64), area: f64, edgedev: f64) -> Value {
    json!({
        "P": [centroid.0, centroid.1],
        "area": area,
        "edgedev": edgedev,
        "f": f,
        "v0": {
            "pathto_next_first": [centroid.0, centroid.0 + 0.1],
            "pathto_next_second": [centroid.1, centroid.1 + 0.1],
            "pathto_neighbour_first": [centroid.0],
            "pathto_neighbour_second": [centroid.1]
        }
    })
}

/// Builds a full analysis record with one domain per identity.
pub fn dirich_record(ids: &[f64], centroids: &[(f64, f64)], honda: f64, sos: f64) -> Value {
    let mut record = json!({
        "honda": honda,
        "N": ids.len() as u64,
        "reg_centroids_id": ids,
        "reg_centroids_x": centroids.iter().map(|c| c.0).collect::<Vec<f64>>(),
        "reg_centroids_y": centroids.iter().map(|c| c.1).collect::<Vec<f64>>(),
        "sos_distances": sos,
        "mapdiff": 0.25,
        "area_diff": 12.0
    });
    let map = record.as_object_mut().expect("object");
    for (i, (id, centroid)) in ids.iter().zip(centroids).enumerate() {
        map.insert(
            format!("dom{i:03}"),
            domain_group(*id, *centroid, 10.0 + i as f64, 0.1 * (i + 1) as f64),
        );
    }
    record
}

pub fn write_dirich(dir: &Path, step: u64, record: &Value) {
    write_json(&dir.join(format!("dirich_{step:05}.json")), record);
}

/// Builds a field record with the winning channel varying per cell.
pub fn field_record(channels: usize, cells: usize) -> Value {
    let mut record = serde_json::Map::new();
    for ch in 0..channels {
        let c: Vec<f64> = (0..cells)
            .map(|cell| if cell % channels == ch { 0.9 } else { 0.05 })
            .collect();
        let a: Vec<f64> = (0..cells).map(|cell| 0.01 * (cell + ch) as f64).collect();
        record.insert(format!("c{ch}"), json!(c));
        record.insert(format!("a{ch}"), json!(a));
    }
    record.insert("n".into(), json!(vec![1.0; cells]));
    let dr: Vec<f64> = (0..cells)
        .map(|cell| (cell % channels) as f64 / channels as f64)
        .collect();
    record.insert("dr".into(), json!(dr));
    Value::Object(record)
}

pub fn write_field(dir: &Path, step: u64, record: &Value) {
    write_json(&dir.join(format!("c_{step:05}.json")), record);
}

/// Writes the standard three-timestep, four-identity run used by the
/// end-to-end tests: analysis and field families at steps 0, 5000, 10000.
pub fn standard_run(dir: &Path) {
    let ids = standard_ids();
    let centroids = standard_centroids();
    write_params(dir, ids.len());
    write_positions(dir, 12, 100.0);
    for (i, step) in [0u64, 5000, 10000].into_iter().enumerate() {
        let honda = 0.2 - 0.05 * i as f64;
        let sos = 3.0 - i as f64;
        write_dirich(dir, step, &dirich_record(&ids, &centroids, honda, sos));
        write_field(dir, step, &field_record(ids.len(), 12));
    }
}
