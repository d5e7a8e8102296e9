//! Masking of degenerate zero values in the scalar metric series.
//!
//! Analysis snapshots written before the first detection pass record zero
//! honda and sos values; every consumer masks those timesteps out rather
//! than plotting them.

/// True for every entry that is non-zero.
pub fn nonzero_mask(series: &[f64]) -> Vec<bool> {
    series.iter().map(|value| *value != 0.0).collect()
}

/// True where both series are non-zero. The inputs must be equally long.
pub fn combined_nonzero_mask(a: &[f64], b: &[f64]) -> Vec<bool> {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| *x != 0.0 && *y != 0.0)
        .collect()
}

/// Keeps the entries selected by the mask.
pub fn apply_mask<T: Copy>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(value, _)| *value)
        .collect()
}

/// Divides every entry by the series maximum. A series whose maximum is not
/// strictly positive is returned unchanged.
pub fn normalise_by_max(values: &[f64]) -> Vec<f64> {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max > 0.0 {
        values.iter().map(|value| value / max).collect()
    } else {
        values.to_vec()
    }
}
