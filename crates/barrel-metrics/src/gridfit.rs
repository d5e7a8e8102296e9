//! Linear-fit measures of how grid-like a centroid layout is.

use serde::{Deserialize, Serialize};

use barrel_core::errors::{BarrelError, ErrorInfo};
use barrel_ingest::reconcile::ReconciledTimestep;

/// Which family of centroid groups the fits run over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Fit the `n` consecutive slot groups, with x and y swapped so a
    /// perfectly vertical line comes out with slope zero.
    Vertical,
    /// Fit the `n` strided slot groups `i, i+n, ...`.
    Horizontal,
}

/// Alignment summary for one timestep. Both values shrink towards zero as
/// the layout approaches a regular rectangular grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridFit {
    /// Sum over groups of the squared fitted slope.
    pub sum_squared_gradient: f64,
    /// Sum over groups of the squared fit residuals.
    pub sum_residual: f64,
}

/// Analyzes one timestep's centroid layout.
///
/// The centroid count must be a perfect square `n * n`; anything else is
/// `NonSquareDomainCount`. A fit group whose independent variable has zero
/// variance is `DegenerateFit` rather than a silent pass into the solver.
pub fn analyze(centroids: &[[f64; 2]], orientation: Orientation) -> Result<GridFit, BarrelError> {
    let total = centroids.len();
    let side = integer_square_root(total).ok_or_else(|| {
        BarrelError::NonSquareDomainCount(
            ErrorInfo::new(
                "gridfit.non_square",
                format!("{total} centroids cannot form an n-by-n grid"),
            )
            .with_hint("grid alignment is defined for square domain layouts only"),
        )
    })?;

    let mut sum_squared_gradient = 0.0;
    let mut sum_residual = 0.0;
    for group in 0..side {
        let mut xs = Vec::with_capacity(side);
        let mut ys = Vec::with_capacity(side);
        match orientation {
            Orientation::Vertical => {
                for slot in group * side..(group + 1) * side {
                    xs.push(centroids[slot][1]);
                    ys.push(centroids[slot][0]);
                }
            }
            Orientation::Horizontal => {
                for row in 0..side {
                    let slot = group + row * side;
                    xs.push(centroids[slot][0]);
                    ys.push(centroids[slot][1]);
                }
            }
        }
        let (gradient, residual) = fit_line(&xs, &ys)?;
        sum_squared_gradient += gradient * gradient;
        sum_residual += residual;
    }

    Ok(GridFit {
        sum_squared_gradient,
        sum_residual,
    })
}

/// Analyzes the registered centroid layout of every timestep in a series.
pub fn analyze_series(
    timesteps: &[ReconciledTimestep],
    orientation: Orientation,
) -> Result<Vec<GridFit>, BarrelError> {
    timesteps
        .iter()
        .map(|step| analyze(&step.reg_centroids, orientation))
        .collect()
}

/// Ordinary least squares fit of `y = m x + c`, returning the slope and the
/// summed squared residuals.
fn fit_line(xs: &[f64], ys: &[f64]) -> Result<(f64, f64), BarrelError> {
    let count = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / count;
    let mean_y = ys.iter().sum::<f64>() / count;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        covariance += (x - mean_x) * (y - mean_y);
        variance += (x - mean_x) * (x - mean_x);
    }
    if variance == 0.0 {
        return Err(BarrelError::DegenerateFit(
            ErrorInfo::new(
                "gridfit.zero_variance",
                "independent variable is constant across the fit group",
            )
            .with_context("group_size", xs.len().to_string()),
        ));
    }

    let slope = covariance / variance;
    let intercept = mean_y - slope * mean_x;
    let residual = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| {
            let predicted = slope * x + intercept;
            (y - predicted) * (y - predicted)
        })
        .sum();
    Ok((slope, residual))
}

fn integer_square_root(total: usize) -> Option<usize> {
    if total == 0 {
        return None;
    }
    let side = (total as f64).sqrt().round() as usize;
    (side * side == total).then_some(side)
}
