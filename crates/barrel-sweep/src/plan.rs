//! Sweep plan schema and run-directory resolution.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use barrel_core::canon::from_json_slice;
use barrel_core::config::LoadOptions;
use barrel_core::errors::{BarrelError, ErrorInfo};
use barrel_metrics::localization::LocalizationStrategy;

fn io_error(code: &str, err: impl ToString) -> BarrelError {
    BarrelError::Io(ErrorInfo::new(code, err.to_string()))
}

/// Where the sweep finds its run directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RunSource {
    /// An explicit list of run directories, processed in the given order.
    Directories {
        /// The run directories.
        directories: Vec<PathBuf>,
    },
    /// Every immediate subdirectory of a base directory, in name order.
    BaseDirectory {
        /// The directory holding one subdirectory per parameter point.
        base: PathBuf,
    },
}

/// Plan describing one batch sweep over parameter-point directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Run-directory source.
    pub runs: RunSource,
    /// Load options applied to every session.
    #[serde(default = "default_load")]
    pub load: LoadOptions,
    /// Mask out timesteps whose honda or sos value is zero.
    #[serde(default = "default_true")]
    pub mask_degenerate: bool,
    /// Divide each run's area_diff series by its maximum.
    #[serde(default = "default_true")]
    pub normalise_area_diff: bool,
    /// Emit a localization column computed with this strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localization: Option<LocalizationStrategy>,
}

fn default_true() -> bool {
    true
}

fn default_load() -> LoadOptions {
    LoadOptions::analysis_only()
}

impl SweepPlan {
    /// A plan over an explicit directory list with analysis-only loads.
    pub fn over_directories(directories: Vec<PathBuf>) -> Self {
        Self {
            runs: RunSource::Directories { directories },
            load: default_load(),
            mask_degenerate: true,
            normalise_area_diff: true,
            localization: None,
        }
    }

    /// Resolves the run directories in deterministic order.
    pub fn resolve_runs(&self) -> Result<Vec<PathBuf>, BarrelError> {
        match &self.runs {
            RunSource::Directories { directories } => Ok(directories.clone()),
            RunSource::BaseDirectory { base } => {
                let entries = fs::read_dir(base)
                    .map_err(|err| io_error("plan.base_dir", format!("{}: {err}", base.display())))?;
                let mut dirs = Vec::new();
                for entry in entries {
                    let entry = entry.map_err(|err| io_error("plan.base_dir", err))?;
                    let path = entry.path();
                    if path.is_dir() {
                        dirs.push(path);
                    }
                }
                dirs.sort();
                Ok(dirs)
            }
        }
    }
}

/// Loads a sweep plan from a JSON file.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<SweepPlan, BarrelError> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .map_err(|err| io_error("plan.read", format!("{}: {err}", path.display())))?;
    from_json_slice(&bytes)
}
