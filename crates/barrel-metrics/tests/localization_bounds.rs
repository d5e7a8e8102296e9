use barrel_ingest::schema::FieldSnapshotRecord;
use barrel_metrics::localization::{localize_snapshot, LocalizationStrategy};

fn snapshot(c: Vec<Vec<f64>>) -> FieldSnapshotRecord {
    let cells = c[0].len();
    let channels = c.len();
    FieldSnapshotRecord {
        a: vec![vec![0.0; cells]; channels],
        n: vec![1.0; cells],
        dr: None,
        c,
    }
}

#[test]
fn ratio_form_is_bounded_for_positive_sums() {
    let snapshot = snapshot(vec![
        vec![0.6, 0.1, 0.2],
        vec![0.3, 0.8, 0.2],
        vec![0.1, 0.1, 0.2],
    ]);
    let (per_cell, mean) = localize_snapshot(&snapshot, LocalizationStrategy::Ratio);

    for value in &per_cell {
        assert!(*value > 0.0 && *value <= 1.0);
    }
    // Cell 0: 0.6, cell 1: 0.8, cell 2: 1/3 (three-way tie).
    assert!((per_cell[0] - 0.6).abs() < 1e-12);
    assert!((per_cell[1] - 0.8).abs() < 1e-12);
    assert!((per_cell[2] - 1.0 / 3.0).abs() < 1e-12);
    let expected = (0.6 + 0.8 + 1.0 / 3.0) / 3.0;
    assert!((mean - expected).abs() < 1e-12);
}

#[test]
fn non_positive_sums_are_excluded_not_zeroed() {
    let snapshot = snapshot(vec![vec![0.6, 0.0, -0.1], vec![0.4, 0.0, 0.1]]);
    let (per_cell, mean) = localize_snapshot(&snapshot, LocalizationStrategy::Ratio);

    assert!((per_cell[0] - 0.6).abs() < 1e-12);
    assert!(per_cell[1].is_nan());
    assert!(per_cell[2].is_nan());
    // The mean covers only the single well-defined cell.
    assert!((mean - 0.6).abs() < 1e-12);
}

#[test]
fn subtractive_form_matches_the_longhand_formula() {
    let snapshot = snapshot(vec![vec![0.6], vec![0.3], vec![0.1]]);
    let (per_cell, mean) =
        localize_snapshot(&snapshot, LocalizationStrategy::Subtractive);

    // 3 * 0.6 / 1.0 - 0.3 / 1.0 - 0.1 / 1.0
    assert!((per_cell[0] - 1.4).abs() < 1e-12);
    assert!((mean - 1.4).abs() < 1e-12);
}

#[test]
fn subtractive_form_guards_against_trash_values() {
    let snapshot = snapshot(vec![vec![0.6], vec![-0.2], vec![0.2]]);
    let (per_cell, _) = localize_snapshot(&snapshot, LocalizationStrategy::Subtractive);

    // sum = 0.6; the -0.2 channel is outside [0, 1] and is not subtracted.
    let expected = 3.0 * 0.6 / 0.6 - 0.2 / 0.6;
    assert!((per_cell[0] - expected).abs() < 1e-12);
}

#[test]
fn strategies_differ_and_are_never_substituted() {
    let snapshot = snapshot(vec![vec![0.6], vec![0.3], vec![0.1]]);
    let (ratio, _) = localize_snapshot(&snapshot, LocalizationStrategy::Ratio);
    let (subtractive, _) = localize_snapshot(&snapshot, LocalizationStrategy::Subtractive);
    assert!((ratio[0] - 0.6).abs() < 1e-12);
    assert!((subtractive[0] - 1.4).abs() < 1e-12);
}
