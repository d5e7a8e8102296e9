use std::collections::BTreeMap;

use barrel_core::{DomainIdentitySpace, IdentityPolicy};
use barrel_ingest::reconcile::DomainReconciler;
use barrel_ingest::schema::{AnalysisSnapshotRecord, DomainGroup};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn synthetic_record(n: usize, seed: u64) -> (Vec<f64>, AnalysisSnapshotRecord) {
    let mut rng = StdRng::seed_from_u64(seed);
    let ids: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
    let mut domains = BTreeMap::new();
    for (i, id) in ids.iter().enumerate() {
        domains.insert(
            format!("dom{i:03}"),
            DomainGroup {
                p: [rng.gen::<f64>() * 10.0, rng.gen::<f64>() * 10.0],
                area: 5.0 + rng.gen::<f64>() * 20.0,
                edgedev: rng.gen::<f64>(),
                f: *id,
                honda: None,
                vertices: BTreeMap::new(),
            },
        );
    }
    let record = AnalysisSnapshotRecord {
        honda: 0.05,
        n: n as u64,
        reg_centroids_id: ids.clone(),
        reg_centroids_x: (0..n).map(|_| rng.gen::<f64>() * 10.0).collect(),
        reg_centroids_y: (0..n).map(|_| rng.gen::<f64>() * 10.0).collect(),
        reg_centroids_id_all: None,
        sos_distances: 1.0,
        mapdiff: 0.1,
        area_diff: 2.0,
        domains,
    };
    (ids, record)
}

fn bench_reconcile(c: &mut Criterion) {
    let (ids, record) = synthetic_record(256, 0x5eed);
    let space = DomainIdentitySpace::from_raw_keys(&ids).expect("space");
    let reconciler = DomainReconciler::new(&space, IdentityPolicy::Strict);

    c.bench_function("reconcile_256_domains", |b| {
        b.iter(|| {
            let mut warnings = Vec::new();
            let out = reconciler
                .reconcile(black_box(&record), 5000, &mut warnings)
                .expect("reconcile");
            black_box(out);
        })
    });
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);
