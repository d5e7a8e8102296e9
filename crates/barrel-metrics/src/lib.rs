#![deny(missing_docs)]
#![doc = "Derived geometric and statistical metrics over reconciled barrel runs."]

pub mod adjacency;
pub mod gridfit;
pub mod localization;
pub mod mask;

pub use adjacency::{
    compute_adjacency, compute_adjacency_series, AdjacencyMeasure, ReferenceAdjacency,
    ReferencePair,
};
pub use gridfit::{analyze, analyze_series, GridFit, Orientation};
pub use localization::{
    compute_localization, localize_snapshot, LocalizationSeries, LocalizationStrategy,
};
pub use mask::{apply_mask, combined_nonzero_mask, nonzero_mask, normalise_by_max};
