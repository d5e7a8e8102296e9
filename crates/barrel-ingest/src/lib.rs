#![deny(missing_docs)]
#![doc = "Snapshot discovery, time-series assembly and domain reconciliation for barrel pattern runs."]

pub mod boundary;
pub mod fileset;
pub mod reconcile;
pub mod schema;
pub mod session;
pub mod timeseries;

pub use boundary::{BoundaryArena, PathEntry, PathKind, PathSegment};
pub use fileset::{SnapshotFile, SnapshotFileSet};
pub use reconcile::{DomainReconciler, ReconciledTimestep};
pub use schema::{
    AnalysisSnapshotRecord, DomainGroup, FieldSnapshotRecord, GuidanceRecord, PositionsRecord,
    VertexGroup,
};
pub use session::{load_run, AnalysisSeries, FieldSeries, LoadSession, LoadedRun, MetricSeries};
pub use timeseries::{TimeSeries, TimeSeriesAccumulator};
