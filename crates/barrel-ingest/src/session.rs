//! One logical load of a log directory.

use std::path::Path;

use serde::{Deserialize, Serialize};

use barrel_core::canon::stable_hash_string;
use barrel_core::config::LoadOptions;
use barrel_core::errors::{BarrelError, ErrorInfo, LoadWarning};
use barrel_core::identity::DomainIdentitySpace;
use barrel_core::params::SimParams;

use crate::boundary::BoundaryArena;
use crate::fileset::SnapshotFileSet;
use crate::reconcile::{DomainReconciler, ReconciledTimestep};
use crate::schema::{
    AnalysisSnapshotRecord, FieldSnapshotRecord, GuidanceRecord, PositionsRecord,
};
use crate::timeseries::{TimeSeries, TimeSeriesAccumulator};

/// Per-timestep scalar metrics read from the analysis family.
///
/// Computed once per load and immutable thereafter; all downstream
/// consumers see read-only views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MetricSeries {
    /// Honda delta per timestep.
    pub honda: Vec<f64>,
    /// Sum of squared centroid distances against the reference pattern.
    pub sos_dist: Vec<f64>,
    /// Proportion of cells differing from the reference identity map.
    pub mapdiff: Vec<f64>,
    /// Summed absolute per-domain area difference against the reference.
    pub area_diff: Vec<f64>,
    /// Mean boundary edge deviation per timestep.
    pub edgedev_mean: Vec<f64>,
    /// Number of reconciled domains per timestep.
    pub numdoms: Vec<f64>,
    /// Total detected-domain area per timestep.
    pub domarea: Vec<f64>,
}

/// Everything derived from the analysis snapshot family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSeries {
    /// The identity space fixed by the first snapshot of the series.
    pub identity_space: DomainIdentitySpace,
    /// Identity-resolved arrays, one per timestep in ascending order.
    pub timesteps: Vec<ReconciledTimestep>,
    /// Scalar metric series across all timesteps.
    pub metrics: MetricSeries,
    /// Boundary path arenas, one per timestep, when the load opted in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundaries: Option<Vec<BoundaryArena>>,
}

/// The field snapshot family: one record per timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSeries {
    /// Timestep of each snapshot, ascending.
    pub timesteps: Vec<u64>,
    /// Field snapshots in ascending timestep order.
    pub snapshots: Vec<FieldSnapshotRecord>,
    /// Competitive channel count, fixed by the first snapshot.
    pub num_channels: usize,
    /// Spatial cell count, fixed by the first snapshot.
    pub num_cells: usize,
}

/// The immutable result of one load session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedRun {
    /// Simulation parameters from `params.json`.
    pub params: SimParams,
    /// Cell positions and total grid area.
    pub positions: PositionsRecord,
    /// Guidance fields, when the load opted in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<GuidanceRecord>,
    /// The shared time axis.
    pub time: TimeSeries,
    /// Analysis-family results, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisSeries>,
    /// Field-family results, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldSeries>,
    /// Recoverable conditions recorded during the load.
    pub warnings: Vec<LoadWarning>,
    /// Stable fingerprint of the load (params, axis, identities, metrics,
    /// warnings). Two loads of the same immutable directory produce the
    /// same fingerprint.
    pub content_hash: String,
}

/// Orchestrates one load of a log directory.
///
/// A session owns its accumulators exclusively; nothing is shared across
/// concurrent sessions, so independent directories may be loaded from
/// parallel threads freely.
#[derive(Debug)]
pub struct LoadSession<'a> {
    logdir: &'a Path,
    options: LoadOptions,
    warnings: Vec<LoadWarning>,
}

impl<'a> LoadSession<'a> {
    /// Creates a session for the given directory and options.
    pub fn new(logdir: &'a Path, options: LoadOptions) -> Self {
        Self {
            logdir,
            options,
            warnings: Vec::new(),
        }
    }

    /// Loads the directory according to the session options.
    ///
    /// Files are processed strictly in ascending timestep order; all errors
    /// other than the recoverable warning conditions abandon the session.
    pub fn load(mut self) -> Result<LoadedRun, BarrelError> {
        let params = SimParams::load(self.logdir)?;
        let positions = PositionsRecord::read(self.logdir)?;
        let guidance = if self.options.load_guidance {
            let record = GuidanceRecord::read(self.logdir)?;
            if record.expt_barrel_id.len() != positions.num_cells() {
                return Err(BarrelError::Schema(
                    ErrorInfo::new(
                        "session.guidance_cells",
                        format!(
                            "guidance covers {} cells, positions {}",
                            record.expt_barrel_id.len(),
                            positions.num_cells()
                        ),
                    )
                    .with_context("logdir", self.logdir.display().to_string()),
                ));
            }
            Some(record)
        } else {
            None
        };

        let mut acc = TimeSeriesAccumulator::new(params.dt);

        let analysis = if self.options.load_analysis_data {
            Some(self.load_analysis(&mut acc)?)
        } else {
            None
        };
        let fields = if self.options.load_field_data {
            Some(self.load_fields(&mut acc, &positions)?)
        } else {
            None
        };

        let time = acc.finish();
        let content_hash = stable_hash_string(&(
            &params,
            &time,
            analysis.as_ref().map(|a| a.identity_space.keys()),
            analysis.as_ref().map(|a| &a.metrics),
            &self.warnings,
        ))?;

        Ok(LoadedRun {
            params,
            positions,
            guidance,
            time,
            analysis,
            fields,
            warnings: self.warnings,
            content_hash,
        })
    }

    fn discover(&self, prefix: &str, suffix: &str) -> Result<SnapshotFileSet, BarrelError> {
        match self.options.target_timestep {
            Some(step) => SnapshotFileSet::discover_at(self.logdir, prefix, suffix, step),
            None => SnapshotFileSet::discover(self.logdir, prefix, suffix),
        }
    }

    fn load_analysis(
        &mut self,
        acc: &mut TimeSeriesAccumulator,
    ) -> Result<AnalysisSeries, BarrelError> {
        let fileset = self.discover("dirich_", ".json")?;
        if let Some(warning) = acc.create_or_verify(fileset.len(), fileset.pattern()) {
            self.warnings.push(warning);
        }

        let mut identity_space: Option<DomainIdentitySpace> = None;
        let mut timesteps = Vec::with_capacity(fileset.len());
        let mut metrics = MetricSeries::default();
        let mut boundaries = self.options.load_boundaries.then(Vec::new);

        for (index, file) in fileset.iter().enumerate() {
            let record = AnalysisSnapshotRecord::read(&file.path)?;
            acc.record(index, file.timestep);

            match &identity_space {
                Some(space) if record.n as usize != space.len() => {
                    return Err(BarrelError::Schema(
                        ErrorInfo::new(
                            "session.n_drift",
                            format!(
                                "snapshot declares N={} but the series fixed N={}",
                                record.n,
                                space.len()
                            ),
                        )
                        .with_context("timestep", file.timestep.to_string()),
                    ));
                }
                Some(_) => {}
                None => {
                    // The identity space is established once, from the
                    // centroid listing of the first snapshot.
                    identity_space =
                        Some(DomainIdentitySpace::from_raw_keys(&record.reg_centroids_id)?);
                }
            }
            let space = identity_space.as_ref().ok_or_else(|| {
                BarrelError::Schema(ErrorInfo::new(
                    "session.identity_space",
                    "identity space unavailable after first snapshot",
                ))
            })?;

            let reconciler = DomainReconciler::new(space, self.options.identity_policy);
            let reconciled = reconciler.reconcile(&record, file.timestep, &mut self.warnings)?;

            metrics.honda.push(record.honda);
            metrics.sos_dist.push(record.sos_distances);
            metrics.mapdiff.push(record.mapdiff);
            metrics.area_diff.push(record.area_diff);
            metrics.edgedev_mean.push(reconciled.edgedev_mean);
            metrics.numdoms.push(reconciled.domain_count as f64);
            metrics.domarea.push(reconciled.domarea);

            if let Some(arenas) = &mut boundaries {
                arenas.push(BoundaryArena::aggregate(
                    &record,
                    space,
                    self.options.identity_policy,
                    file.timestep,
                )?);
            }

            timesteps.push(reconciled);
        }

        let identity_space = identity_space.ok_or_else(|| {
            BarrelError::EmptySet(ErrorInfo::new(
                "session.no_analysis",
                "analysis family produced no snapshots",
            ))
        })?;

        Ok(AnalysisSeries {
            identity_space,
            timesteps,
            metrics,
            boundaries,
        })
    }

    fn load_fields(
        &mut self,
        acc: &mut TimeSeriesAccumulator,
        positions: &PositionsRecord,
    ) -> Result<FieldSeries, BarrelError> {
        let fileset = self.discover("c_", ".json")?;
        if let Some(warning) = acc.create_or_verify(fileset.len(), fileset.pattern()) {
            self.warnings.push(warning);
        }

        let mut snapshots = Vec::with_capacity(fileset.len());
        let mut timesteps = Vec::with_capacity(fileset.len());
        let mut shape: Option<(usize, usize)> = None;
        for (index, file) in fileset.iter().enumerate() {
            let record = FieldSnapshotRecord::read(&file.path)?;
            acc.record(index, file.timestep);

            let this = (record.num_channels(), record.num_cells());
            match shape {
                None => {
                    if this.1 != positions.num_cells() {
                        return Err(BarrelError::Schema(
                            ErrorInfo::new(
                                "session.field_cells",
                                format!(
                                    "field snapshots cover {} cells, positions {}",
                                    this.1,
                                    positions.num_cells()
                                ),
                            )
                            .with_context("timestep", file.timestep.to_string()),
                        ));
                    }
                    shape = Some(this);
                }
                Some(expected) if expected != this => {
                    return Err(BarrelError::Schema(
                        ErrorInfo::new(
                            "session.field_drift",
                            format!(
                                "field snapshot shape {}x{} differs from the series shape {}x{}",
                                this.0, this.1, expected.0, expected.1
                            ),
                        )
                        .with_context("timestep", file.timestep.to_string()),
                    ));
                }
                Some(_) => {}
            }
            timesteps.push(file.timestep);
            snapshots.push(record);
        }

        let (num_channels, num_cells) = shape.unwrap_or((0, 0));
        Ok(FieldSeries {
            timesteps,
            snapshots,
            num_channels,
            num_cells,
        })
    }
}

/// Convenience wrapper: loads `logdir` with the given options.
pub fn load_run(logdir: &Path, options: &LoadOptions) -> Result<LoadedRun, BarrelError> {
    LoadSession::new(logdir, options.clone()).load()
}
