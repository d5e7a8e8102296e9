//! Sweep execution: one isolated load session per parameter point.

use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;

use barrel_core::errors::{BarrelError, ErrorInfo, LoadWarning};
use barrel_ingest::session::{load_run, LoadedRun};
use barrel_metrics::localization::compute_localization;
use barrel_metrics::mask::combined_nonzero_mask;

use crate::plan::SweepPlan;
use crate::report::{SweepReport, SweepRunReport};
use crate::table::{SweepRow, SweepTable, TableSummary};

/// Options governing sweep execution.
#[derive(Debug, Clone)]
pub struct SweepOpts {
    /// Number of run directories to load in parallel. Sessions share no
    /// mutable state, so this is safe at any value.
    pub concurrency: usize,
}

impl Default for SweepOpts {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// The assembled results of one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    /// Per-run states, warnings and fingerprints.
    pub report: SweepReport,
    /// The output table, one row per (parameter point, unmasked timestep).
    pub table: SweepTable,
}

/// Executes the sweep described by the plan.
///
/// A failed session never aborts the sweep: its parameter point becomes a
/// placeholder row and a `Failed` report entry. Only plan-level problems
/// (unresolvable run source, a plan that skips analysis data entirely)
/// fail the call.
pub fn run_sweep(plan: &SweepPlan, opts: &SweepOpts) -> Result<SweepOutcome, BarrelError> {
    if !plan.load.load_analysis_data {
        return Err(BarrelError::Schema(ErrorInfo::new(
            "sweep.no_analysis",
            "sweep rows derive from analysis data; the plan must load it",
        )));
    }
    if plan.localization.is_some() && !plan.load.load_field_data {
        return Err(BarrelError::Schema(
            ErrorInfo::new(
                "sweep.no_field_data",
                "localization columns need the field family loaded",
            )
            .with_hint("set load.load_field_data in the plan"),
        ));
    }

    let dirs = plan.resolve_runs()?;
    let include_localization = plan.localization.is_some();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.concurrency.max(1))
        .build()
        .map_err(|err| BarrelError::Io(ErrorInfo::new("sweep.thread_pool", err.to_string())))?;

    let mut results: Vec<(usize, SweepRunReport, Vec<SweepRow>)> = pool.install(|| {
        dirs.par_iter()
            .enumerate()
            .map(|(index, dir)| {
                let directory = dir.display().to_string();
                match process_run(dir, plan) {
                    Ok((rows, warnings, content_hash)) => {
                        let report = SweepRunReport::complete(
                            directory,
                            warnings,
                            rows.len(),
                            content_hash,
                        );
                        (index, report, rows)
                    }
                    Err(err) => {
                        let report = SweepRunReport::failed(directory, &err);
                        (index, report, vec![SweepRow::placeholder(include_localization)])
                    }
                }
            })
            .collect()
    });
    results.sort_by_key(|(index, _, _)| *index);

    let mut runs = Vec::with_capacity(results.len());
    let mut table = SweepTable {
        include_localization,
        rows: Vec::new(),
    };
    for (_, report, rows) in results {
        runs.push(report);
        table.rows.extend(rows);
    }

    let report = SweepReport::new(runs, TableSummary::of(&table))?;
    Ok(SweepOutcome { report, table })
}

fn process_run(
    dir: &Path,
    plan: &SweepPlan,
) -> Result<(Vec<SweepRow>, Vec<LoadWarning>, String), BarrelError> {
    let run = load_run(dir, &plan.load)?;
    let rows = extract_rows(&run, plan)?;
    Ok((rows, run.warnings, run.content_hash))
}

fn extract_rows(run: &LoadedRun, plan: &SweepPlan) -> Result<Vec<SweepRow>, BarrelError> {
    let analysis = run.analysis.as_ref().ok_or_else(|| {
        BarrelError::Schema(ErrorInfo::new(
            "sweep.missing_analysis",
            "loaded run carries no analysis series",
        ))
    })?;
    let metrics = &analysis.metrics;

    let mask = if plan.mask_degenerate {
        combined_nonzero_mask(&metrics.honda, &metrics.sos_dist)
    } else {
        vec![true; metrics.honda.len()]
    };
    // The area_diff maximum is taken over the surviving timesteps only.
    let kept_area: Vec<f64> = metrics
        .area_diff
        .iter()
        .zip(&mask)
        .filter(|(_, keep)| **keep)
        .map(|(value, _)| *value)
        .collect();
    let area_scale = if plan.normalise_area_diff {
        let max = kept_area.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if max > 0.0 {
            max
        } else {
            1.0
        }
    } else {
        1.0
    };

    // Localization means keyed by timestep, since the field family may not
    // cover the same steps as the analysis family.
    let localization_by_step: BTreeMap<u64, f64> = match (plan.localization, &run.fields) {
        (Some(strategy), Some(fields)) => {
            let series = compute_localization(fields, strategy);
            fields
                .timesteps
                .iter()
                .copied()
                .zip(series.per_timestep)
                .collect()
        }
        _ => BTreeMap::new(),
    };

    let params = &run.params;
    let mean_alpha = params.mean_alpha();
    let mut rows = Vec::new();
    for (index, reconciled) in analysis.timesteps.iter().enumerate() {
        if !mask[index] {
            continue;
        }
        let localization = plan.localization.map(|_| {
            localization_by_step
                .get(&reconciled.timestep)
                .copied()
                .unwrap_or(f64::NAN)
        });
        rows.push(SweepRow {
            k: params.k,
            d: params.d,
            alphabeta: mean_alpha / 20.0,
            alpha: mean_alpha,
            beta: params.mean_beta(),
            epsilon: params.mean_epsilon(),
            t: reconciled.timestep as f64,
            hondadelta: metrics.honda[index],
            sos_dist: metrics.sos_dist[index],
            area_diff: metrics.area_diff[index] / area_scale,
            localization,
        });
    }
    Ok(rows)
}
