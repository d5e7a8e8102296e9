//! Serializable sweep reports.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use barrel_core::canon::{stable_hash_string, to_canonical_json_bytes};
use barrel_core::errors::{BarrelError, ErrorInfo, LoadWarning};

use crate::table::TableSummary;

/// Terminal state of one parameter point within a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    /// The load session completed and contributed data rows.
    Complete,
    /// The load session failed; a placeholder row was emitted instead.
    Failed,
}

/// Report entry for one run directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRunReport {
    /// The run directory, as given by the plan.
    pub directory: String,
    /// Terminal state of the session.
    pub state: RunState,
    /// Error message captured when the session failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Warnings recorded by the session.
    pub warnings: Vec<LoadWarning>,
    /// Number of table rows this run contributed.
    pub rows_emitted: usize,
    /// Content fingerprint of the loaded run, absent on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl SweepRunReport {
    /// Entry for a completed session.
    pub fn complete(
        directory: String,
        warnings: Vec<LoadWarning>,
        rows_emitted: usize,
        content_hash: String,
    ) -> Self {
        Self {
            directory,
            state: RunState::Complete,
            error: None,
            warnings,
            rows_emitted,
            content_hash: Some(content_hash),
        }
    }

    /// Entry for a failed session. Failures are data, not log lines.
    pub fn failed(directory: String, error: &BarrelError) -> Self {
        Self {
            directory,
            state: RunState::Failed,
            error: Some(error.to_string()),
            warnings: Vec::new(),
            rows_emitted: 1,
            content_hash: None,
        }
    }
}

/// Aggregate report for one sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Per-run entries, in plan order.
    pub runs: Vec<SweepRunReport>,
    /// NaN-free table summary.
    pub table: TableSummary,
    /// Stable hash over the run entries and summary.
    pub report_hash: String,
}

impl SweepReport {
    /// Assembles a report and stamps its hash.
    pub fn new(runs: Vec<SweepRunReport>, table: TableSummary) -> Result<Self, BarrelError> {
        let report_hash = stable_hash_string(&(&runs, &table))?;
        Ok(Self {
            runs,
            table,
            report_hash,
        })
    }

    /// Writes the report as canonical JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), BarrelError> {
        let bytes = to_canonical_json_bytes(self)?;
        fs::write(path, bytes).map_err(|err| {
            BarrelError::Io(
                ErrorInfo::new("report.write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}
