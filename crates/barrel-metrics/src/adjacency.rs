//! Comparison of reconciled domain adjacency against a reference pattern.

use serde::{Deserialize, Serialize};

use barrel_core::errors::{BarrelError, ErrorInfo};
use barrel_core::identity::{DomainIdentitySpace, IdentityKey};
use barrel_ingest::reconcile::ReconciledTimestep;
use barrel_ingest::schema::{GuidanceRecord, PositionsRecord};

/// Two domains count as neighbours when their gap is within this factor of
/// the smaller of their nearest-neighbour gaps. Below sqrt(2) so square-grid
/// diagonals stay outside the shell.
const SHELL_FACTOR: f64 = 1.3;

/// One adjacency relationship of the reference pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePair {
    /// Identity slot of the first domain.
    pub a: usize,
    /// Identity slot of the second domain.
    pub b: usize,
    /// Centroid gap observed in the reference pattern.
    pub gap: f64,
}

/// The reference (experimentally observed) adjacency pattern.
///
/// Carries the identity keys it was built against so that a comparison with
/// data from a different identity space fails instead of silently matching
/// slots across unrelated spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceAdjacency {
    /// Identity keys, in slot order, the pairs refer to.
    pub identity_keys: Vec<IdentityKey>,
    /// Adjacent slot pairs with their reference gaps.
    pub pairs: Vec<ReferencePair>,
}

impl ReferenceAdjacency {
    /// Builds the reference pattern from the experimentally drawn identity
    /// map: per-identity centroids over the guidance cells, then the
    /// nearest-neighbour-shell criterion over those centroids.
    pub fn from_guidance(
        guidance: &GuidanceRecord,
        positions: &PositionsRecord,
        space: &DomainIdentitySpace,
    ) -> Result<Self, BarrelError> {
        if guidance.expt_barrel_id.len() != positions.num_cells() {
            return Err(BarrelError::Schema(ErrorInfo::new(
                "adjacency.cell_count",
                format!(
                    "guidance covers {} cells, positions {}",
                    guidance.expt_barrel_id.len(),
                    positions.num_cells()
                ),
            )));
        }

        let slots = space.len();
        let mut sums = vec![[0.0f64; 2]; slots];
        let mut counts = vec![0usize; slots];
        for (cell, raw_id) in guidance.expt_barrel_id.iter().enumerate() {
            if let Some(slot) = space.slot(IdentityKey::from_raw(*raw_id)) {
                sums[slot][0] += positions.x[cell];
                sums[slot][1] += positions.y[cell];
                counts[slot] += 1;
            }
        }

        let mut centroids = vec![[f64::NAN; 2]; slots];
        let mut present = vec![false; slots];
        for slot in 0..slots {
            if counts[slot] > 0 {
                centroids[slot] = [
                    sums[slot][0] / counts[slot] as f64,
                    sums[slot][1] / counts[slot] as f64,
                ];
                present[slot] = true;
            }
        }

        let pairs = shell_pairs(&centroids, &present);
        Ok(Self {
            identity_keys: space.keys().to_vec(),
            pairs,
        })
    }

    /// Builds a reference directly from slot pairs, for synthetic patterns.
    pub fn from_pairs(space: &DomainIdentitySpace, pairs: Vec<ReferencePair>) -> Self {
        Self {
            identity_keys: space.keys().to_vec(),
            pairs,
        }
    }
}

/// Arrangement and magnitude scalars for one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyMeasure {
    /// Fraction of reference adjacency relationships structurally present
    /// in the reconciled layout.
    pub arrangement: f64,
    /// Mean absolute gap difference across the reference pairs whose
    /// domains were both detected.
    pub difference_magnitude: f64,
}

/// Compares the reconciled layout of one timestep against the reference.
///
/// The identity space of the reconciled data must be the one the reference
/// was built against.
pub fn compute_adjacency(
    timestep: &ReconciledTimestep,
    space: &DomainIdentitySpace,
    reference: &ReferenceAdjacency,
) -> Result<AdjacencyMeasure, BarrelError> {
    if reference.identity_keys != space.keys() || timestep.num_slots() != space.len() {
        return Err(BarrelError::IdentitySpaceMismatch(
            ErrorInfo::new(
                "adjacency.space_mismatch",
                "reference adjacency was built against a different identity space",
            )
            .with_context("reference_slots", reference.identity_keys.len().to_string())
            .with_context("reconciled_slots", timestep.num_slots().to_string()),
        ));
    }

    let sim_pairs = shell_pairs(&timestep.dirich_centroids, &timestep.present);
    let mut arranged = 0usize;
    let mut gap_difference = 0.0;
    let mut comparable = 0usize;
    for pair in &reference.pairs {
        let both_present = timestep.present[pair.a] && timestep.present[pair.b];
        if !both_present {
            continue;
        }
        comparable += 1;
        if sim_pairs
            .iter()
            .any(|sim| sim.a == pair.a && sim.b == pair.b)
        {
            arranged += 1;
        }
        let gap = distance(
            timestep.dirich_centroids[pair.a],
            timestep.dirich_centroids[pair.b],
        );
        gap_difference += (gap - pair.gap).abs();
    }

    let arrangement = if reference.pairs.is_empty() {
        f64::NAN
    } else {
        arranged as f64 / reference.pairs.len() as f64
    };
    let difference_magnitude = if comparable == 0 {
        f64::NAN
    } else {
        gap_difference / comparable as f64
    };
    Ok(AdjacencyMeasure {
        arrangement,
        difference_magnitude,
    })
}

/// Compares every timestep of a series against the reference.
pub fn compute_adjacency_series(
    timesteps: &[ReconciledTimestep],
    space: &DomainIdentitySpace,
    reference: &ReferenceAdjacency,
) -> Result<Vec<AdjacencyMeasure>, BarrelError> {
    timesteps
        .iter()
        .map(|step| compute_adjacency(step, space, reference))
        .collect()
}

/// All slot pairs inside each other's nearest-neighbour shell, `a < b`.
fn shell_pairs(centroids: &[[f64; 2]], present: &[bool]) -> Vec<ReferencePair> {
    let slots = centroids.len();
    let mut nearest = vec![f64::INFINITY; slots];
    for a in 0..slots {
        if !present[a] {
            continue;
        }
        for b in 0..slots {
            if a == b || !present[b] {
                continue;
            }
            let gap = distance(centroids[a], centroids[b]);
            if gap < nearest[a] {
                nearest[a] = gap;
            }
        }
    }

    let mut pairs = Vec::new();
    for a in 0..slots {
        if !present[a] {
            continue;
        }
        for b in (a + 1)..slots {
            if !present[b] {
                continue;
            }
            let gap = distance(centroids[a], centroids[b]);
            if gap <= SHELL_FACTOR * nearest[a].min(nearest[b]) {
                pairs.push(ReferencePair { a, b, gap });
            }
        }
    }
    pairs
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}
