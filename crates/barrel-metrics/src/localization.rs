//! Per-cell localization of the competitive field.

use serde::{Deserialize, Serialize};

use barrel_ingest::schema::FieldSnapshotRecord;
use barrel_ingest::session::FieldSeries;

/// The two localization formulas in circulation.
///
/// They are distinct measures and are never substituted for one another;
/// every call site names its strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LocalizationStrategy {
    /// `max_c / sum_c` per cell. Bounded in (0, 1] wherever the channel sum
    /// is strictly positive.
    #[default]
    Ratio,
    /// `N * max_c / sum_c` minus the normalised value of every non-maximal
    /// channel lying in [0, 1]. Unbounded; used by earlier analyses.
    Subtractive,
}

/// Localization values for one load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizationSeries {
    /// Strategy the values were computed with.
    pub strategy: LocalizationStrategy,
    /// Per-cell localization, `per_cell[timestep][cell]`. Cells whose
    /// channel sum is not strictly positive hold NaN.
    pub per_cell: Vec<Vec<f64>>,
    /// Mean localization over the well-defined cells of each timestep.
    pub per_timestep: Vec<f64>,
}

/// Computes the localization of one field snapshot.
///
/// Returns the per-cell values and the mean over the cells whose channel
/// sum is strictly positive; ill-defined cells are excluded from the mean,
/// never folded in as zero.
pub fn localize_snapshot(
    snapshot: &FieldSnapshotRecord,
    strategy: LocalizationStrategy,
) -> (Vec<f64>, f64) {
    let channels = snapshot.num_channels();
    let cells = snapshot.num_cells();
    let mut per_cell = vec![f64::NAN; cells];
    let mut total = 0.0;
    let mut counted = 0usize;

    for cell in 0..cells {
        let mut max_value = f64::NEG_INFINITY;
        let mut max_channel = 0usize;
        let mut sum = 0.0;
        for (ch, field) in snapshot.c.iter().enumerate() {
            let value = field[cell];
            sum += value;
            if value > max_value {
                max_value = value;
                max_channel = ch;
            }
        }
        if sum <= 0.0 {
            continue;
        }
        let value = match strategy {
            LocalizationStrategy::Ratio => max_value / sum,
            LocalizationStrategy::Subtractive => {
                let mut score = max_value * channels as f64 / sum;
                for (ch, field) in snapshot.c.iter().enumerate() {
                    if ch == max_channel {
                        continue;
                    }
                    let other = field[cell];
                    // Guard against the odd trash value outside [0, 1].
                    if (0.0..=1.0).contains(&other) {
                        score -= other / sum;
                    }
                }
                score
            }
        };
        per_cell[cell] = value;
        total += value;
        counted += 1;
    }

    let mean = if counted == 0 {
        f64::NAN
    } else {
        total / counted as f64
    };
    (per_cell, mean)
}

/// Computes localization across every timestep of a field series.
pub fn compute_localization(
    fields: &FieldSeries,
    strategy: LocalizationStrategy,
) -> LocalizationSeries {
    let mut per_cell = Vec::with_capacity(fields.snapshots.len());
    let mut per_timestep = Vec::with_capacity(fields.snapshots.len());
    for snapshot in &fields.snapshots {
        let (cells, mean) = localize_snapshot(snapshot, strategy);
        per_cell.push(cells);
        per_timestep.push(mean);
    }
    LocalizationSeries {
        strategy,
        per_cell,
        per_timestep,
    }
}
