//! The sweep output table and its CSV export.

use std::path::Path;

use serde::{Deserialize, Serialize};

use barrel_core::errors::{BarrelError, ErrorInfo};

/// One output row: parameter columns, the timestep, and its metrics.
///
/// A failed run contributes a single all-NaN placeholder row so the
/// parameter point remains visible in the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRow {
    /// Competition exponent k.
    pub k: f64,
    /// Diffusion constant D.
    pub d: f64,
    /// Mean alpha over mean beta proxy column.
    pub alphabeta: f64,
    /// Mean alpha across channels.
    pub alpha: f64,
    /// Mean beta across channels.
    pub beta: f64,
    /// Mean epsilon across channels.
    pub epsilon: f64,
    /// Timestep, in simulation steps.
    pub t: f64,
    /// Honda delta at this timestep.
    pub hondadelta: f64,
    /// Sum-of-squared-distances at this timestep.
    pub sos_dist: f64,
    /// Area difference at this timestep (optionally max-normalised).
    pub area_diff: f64,
    /// Localization mean, when the plan asked for it.
    pub localization: Option<f64>,
}

impl SweepRow {
    /// The all-NaN placeholder emitted for a failed parameter point.
    pub fn placeholder(with_localization: bool) -> Self {
        Self {
            k: f64::NAN,
            d: f64::NAN,
            alphabeta: f64::NAN,
            alpha: f64::NAN,
            beta: f64::NAN,
            epsilon: f64::NAN,
            t: f64::NAN,
            hondadelta: f64::NAN,
            sos_dist: f64::NAN,
            area_diff: f64::NAN,
            localization: with_localization.then_some(f64::NAN),
        }
    }
}

/// The assembled sweep table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepTable {
    /// Whether rows carry the optional localization column.
    pub include_localization: bool,
    /// Output rows in run order, then ascending timestep.
    pub rows: Vec<SweepRow>,
}

/// Fixed header columns shared by every sweep table.
pub const BASE_HEADER: [&str; 10] = [
    "k",
    "D",
    "alphabeta",
    "alpha",
    "beta",
    "epsilon",
    "t",
    "hondadelta",
    "sos_dist",
    "area_diff",
];

fn export_error(path: &Path, err: impl ToString) -> BarrelError {
    BarrelError::Io(
        ErrorInfo::new("table.export", err.to_string())
            .with_context("path", path.display().to_string()),
    )
}

impl SweepTable {
    /// The header row for this table.
    pub fn header(&self) -> Vec<&'static str> {
        let mut header = BASE_HEADER.to_vec();
        if self.include_localization {
            header.push("localization");
        }
        header
    }

    /// Writes the table as CSV with its fixed header row.
    pub fn write_csv(&self, path: &Path) -> Result<(), BarrelError> {
        let mut writer = csv::Writer::from_path(path).map_err(|err| export_error(path, err))?;
        writer
            .write_record(self.header())
            .map_err(|err| export_error(path, err))?;
        for row in &self.rows {
            let mut record = vec![
                row.k.to_string(),
                row.d.to_string(),
                row.alphabeta.to_string(),
                row.alpha.to_string(),
                row.beta.to_string(),
                row.epsilon.to_string(),
                row.t.to_string(),
                row.hondadelta.to_string(),
                row.sos_dist.to_string(),
                row.area_diff.to_string(),
            ];
            if self.include_localization {
                record.push(row.localization.unwrap_or(f64::NAN).to_string());
            }
            writer
                .write_record(&record)
                .map_err(|err| export_error(path, err))?;
        }
        writer.flush().map_err(|err| export_error(path, err))
    }
}

/// Serializable summary of a table, NaN-free for inclusion in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    /// Total number of rows.
    pub rows: usize,
    /// Number of all-NaN placeholder rows.
    pub placeholder_rows: usize,
}

impl TableSummary {
    /// Summarises a table.
    pub fn of(table: &SweepTable) -> Self {
        let placeholder_rows = table.rows.iter().filter(|row| row.k.is_nan()).count();
        Self {
            rows: table.rows.len(),
            placeholder_rows,
        }
    }
}
