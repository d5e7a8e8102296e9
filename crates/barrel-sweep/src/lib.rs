#![deny(missing_docs)]
#![doc = "Batch parameter-sweep driver for barrel pattern runs."]

pub mod driver;
pub mod plan;
pub mod report;
pub mod table;

pub use driver::{run_sweep, SweepOpts, SweepOutcome};
pub use plan::{load_plan, RunSource, SweepPlan};
pub use report::{RunState, SweepReport, SweepRunReport};
pub use table::{SweepRow, SweepTable, TableSummary, BASE_HEADER};
