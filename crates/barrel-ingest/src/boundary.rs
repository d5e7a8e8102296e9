//! Arena aggregation of the ragged per-domain boundary paths.

use serde::{Deserialize, Serialize};

use barrel_core::config::IdentityPolicy;
use barrel_core::errors::{BarrelError, ErrorInfo};
use barrel_core::identity::DomainIdentitySpace;

use crate::schema::{AnalysisSnapshotRecord, VertexGroup};

/// Which of the two recorded path families a segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathKind {
    /// Walked path towards the next vertex of the same domain.
    ToNext,
    /// Walked path towards the neighbouring domain.
    ToNeighbour,
}

/// Index entry locating one path inside the point arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    /// Identity slot of the owning domain.
    pub slot: usize,
    /// Vertex ordinal within the domain. Enumeration order only; callers
    /// must not rely on any geometric ordering.
    pub vertex: usize,
    /// Path family.
    pub kind: PathKind,
    /// Offset of the first point in the arena.
    pub offset: usize,
    /// Number of points in the path.
    pub len: usize,
}

/// One resolved path segment borrowed from the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment<'a> {
    /// Identity slot of the owning domain.
    pub slot: usize,
    /// Vertex ordinal within the domain.
    pub vertex: usize,
    /// Path family.
    pub kind: PathKind,
    /// The path's points.
    pub points: &'a [[f64; 2]],
}

/// All boundary paths of one timestep, flattened into a single point arena
/// with an offset/length index per `(slot, vertex, kind)`.
///
/// Aggregation is expensive (domain count times average vertex count) and
/// is only performed when a load opts in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundaryArena {
    points: Vec<[f64; 2]>,
    index: Vec<PathEntry>,
}

impl BoundaryArena {
    /// Aggregates the boundary paths of one analysis snapshot.
    ///
    /// Domains whose identity cannot be resolved follow the same policy as
    /// reconciliation: strict fails, lenient skips. The skip is silent here
    /// because reconciliation of the same record has already recorded the
    /// warning.
    pub fn aggregate(
        record: &AnalysisSnapshotRecord,
        space: &DomainIdentitySpace,
        policy: IdentityPolicy,
        timestep: u64,
    ) -> Result<Self, BarrelError> {
        let mut arena = Self::default();
        for dom in record.domains.values() {
            let slot = match space.slot(dom.identity()) {
                Some(slot) => slot,
                None => match policy {
                    IdentityPolicy::Strict => {
                        return Err(BarrelError::UnknownDomainIdentity(
                            ErrorInfo::new(
                                "boundary.unknown_identity",
                                format!(
                                    "identity key {} is absent from the identity space",
                                    dom.identity()
                                ),
                            )
                            .with_context("timestep", timestep.to_string()),
                        ))
                    }
                    IdentityPolicy::Lenient => continue,
                },
            };
            for (vertex, group) in dom.vertices.values().enumerate() {
                arena.push_path(slot, vertex, PathKind::ToNext, group);
                arena.push_path(slot, vertex, PathKind::ToNeighbour, group);
            }
        }
        Ok(arena)
    }

    fn push_path(&mut self, slot: usize, vertex: usize, kind: PathKind, group: &VertexGroup) {
        let (xs, ys) = match kind {
            PathKind::ToNext => (&group.pathto_next_first, &group.pathto_next_second),
            PathKind::ToNeighbour => (
                &group.pathto_neighbour_first,
                &group.pathto_neighbour_second,
            ),
        };
        let offset = self.points.len();
        self.points
            .extend(xs.iter().zip(ys).map(|(x, y)| [*x, *y]));
        self.index.push(PathEntry {
            slot,
            vertex,
            kind,
            offset,
            len: xs.len(),
        });
    }

    /// Number of indexed paths.
    pub fn num_paths(&self) -> usize {
        self.index.len()
    }

    /// Total number of points in the arena.
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Iterates every path segment. The iterator borrows the arena and can
    /// be restarted at will.
    pub fn segments(&self) -> impl Iterator<Item = PathSegment<'_>> {
        self.index.iter().map(move |entry| PathSegment {
            slot: entry.slot,
            vertex: entry.vertex,
            kind: entry.kind,
            points: &self.points[entry.offset..entry.offset + entry.len],
        })
    }

    /// Iterates the path segments belonging to one identity slot.
    pub fn segments_for(&self, slot: usize) -> impl Iterator<Item = PathSegment<'_>> {
        self.segments().filter(move |segment| segment.slot == slot)
    }

    /// The raw index entries, primarily for integrity checks.
    pub fn entries(&self) -> &[PathEntry] {
        &self.index
    }
}
