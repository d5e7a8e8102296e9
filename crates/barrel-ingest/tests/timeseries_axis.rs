use barrel_core::errors::LoadWarning;
use barrel_ingest::TimeSeriesAccumulator;

#[test]
fn first_family_allocates_and_fills() {
    let mut acc = TimeSeriesAccumulator::new(0.0001);
    assert!(acc.create_or_verify(3, "dirich_*").is_none());
    for (index, step) in [0u64, 5000, 10000].into_iter().enumerate() {
        acc.record(index, step);
    }
    let series = acc.finish();
    assert_eq!(series.t_steps, vec![0, 5000, 10000]);
    assert_eq!(series.t, vec![0.0, 0.5, 1.0]);
    assert_eq!(series.t_steps.len(), series.t.len());
}

#[test]
fn matching_second_family_is_a_noop() {
    let mut acc = TimeSeriesAccumulator::new(0.0001);
    assert!(acc.create_or_verify(5, "dirich_*").is_none());
    assert!(acc.create_or_verify(5, "c_*").is_none());
    assert_eq!(acc.finish().len(), 5);
}

#[test]
fn mismatched_families_recreate_and_warn() {
    let mut acc = TimeSeriesAccumulator::new(0.0001);
    assert!(acc.create_or_verify(10, "dirich_*").is_none());
    let warning = acc.create_or_verify(12, "c_*").expect("warning");
    assert_eq!(
        warning,
        LoadWarning::SeriesLengthMismatch {
            existing: 10,
            incoming: 12,
            family: "c_*".to_string(),
        }
    );
    // The later family wins.
    assert_eq!(acc.finish().len(), 12);
}
