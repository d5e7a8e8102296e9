//! Typed schemas for the snapshot record kinds.
//!
//! Field names are the external contract shared with the simulation writers
//! and are preserved verbatim. Every record is validated on read; a missing
//! or malformed field is a typed error, never a silent default.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use barrel_core::errors::{BarrelError, ErrorInfo};
use barrel_core::identity::IdentityKey;

fn read_error(code: &str, path: &Path, err: impl ToString) -> BarrelError {
    BarrelError::Io(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

fn schema_error(code: &str, path: &Path, message: impl Into<String>) -> BarrelError {
    BarrelError::Schema(
        ErrorInfo::new(code, message).with_context("path", path.display().to_string()),
    )
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, BarrelError> {
    let bytes = fs::read(path).map_err(|err| read_error("schema.read", path, err))?;
    serde_json::from_slice(&bytes).map_err(|err| schema_error("schema.parse", path, err.to_string()))
}

/// The two path families recorded per boundary vertex.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VertexGroup {
    /// X coordinates of the walked path towards the next vertex.
    pub pathto_next_first: Vec<f64>,
    /// Y coordinates of the walked path towards the next vertex.
    pub pathto_next_second: Vec<f64>,
    /// X coordinates of the walked path towards the neighbouring domain.
    pub pathto_neighbour_first: Vec<f64>,
    /// Y coordinates of the walked path towards the neighbouring domain.
    pub pathto_neighbour_second: Vec<f64>,
}

/// One detected spatial domain within an analysis snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DomainGroup {
    /// Putative domain centre (Honda's method).
    #[serde(rename = "P")]
    pub p: [f64; 2],
    /// Domain area in hexes.
    pub area: f64,
    /// Boundary deviation from the straight lines joining the vertices.
    pub edgedev: f64,
    /// Raw identity key of the domain.
    pub f: f64,
    /// Per-domain Honda contribution, recorded by some writer versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub honda: Option<f64>,
    /// Boundary vertex groups, keyed by vertex name. Iteration order is not
    /// meaningful.
    #[serde(flatten)]
    pub vertices: BTreeMap<String, VertexGroup>,
}

impl DomainGroup {
    /// The quantised identity key of this domain.
    pub fn identity(&self) -> IdentityKey {
        IdentityKey::from_raw(self.f)
    }
}

/// One `dirich_NNNNN` analysis snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisSnapshotRecord {
    /// Honda delta for the whole pattern.
    pub honda: f64,
    /// Declared trackable-domain count.
    #[serde(rename = "N")]
    pub n: u64,
    /// Identity keys of the registered centroid listing, in slot order.
    pub reg_centroids_id: Vec<f64>,
    /// X coordinates of the registered centroids.
    pub reg_centroids_x: Vec<f64>,
    /// Y coordinates of the registered centroids.
    pub reg_centroids_y: Vec<f64>,
    /// Extended identity listing written by some writer versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_centroids_id_all: Option<Vec<f64>>,
    /// Sum of squared distances to the reference centroids.
    pub sos_distances: f64,
    /// Proportion of cells whose identity differs from the reference map.
    pub mapdiff: f64,
    /// Summed absolute per-domain area difference against the reference.
    pub area_diff: f64,
    /// Detected domain groups, keyed by their group name.
    #[serde(flatten)]
    pub domains: BTreeMap<String, DomainGroup>,
}

impl AnalysisSnapshotRecord {
    /// Reads and validates one analysis snapshot.
    pub fn read(path: &Path) -> Result<Self, BarrelError> {
        let record: Self = parse_json(path)?;
        record.validate(path)?;
        Ok(record)
    }

    fn validate(&self, path: &Path) -> Result<(), BarrelError> {
        let n = self.n as usize;
        if self.reg_centroids_id.len() != n
            || self.reg_centroids_x.len() != n
            || self.reg_centroids_y.len() != n
        {
            return Err(schema_error(
                "analysis.centroid_shape",
                path,
                format!(
                    "reg_centroids arrays must all have length N={n}, got id={}, x={}, y={}",
                    self.reg_centroids_id.len(),
                    self.reg_centroids_x.len(),
                    self.reg_centroids_y.len()
                ),
            ));
        }
        for (dom_name, dom) in &self.domains {
            for (vertex_name, vertex) in &dom.vertices {
                let next_ok = vertex.pathto_next_first.len() == vertex.pathto_next_second.len();
                let neigh_ok =
                    vertex.pathto_neighbour_first.len() == vertex.pathto_neighbour_second.len();
                if !next_ok || !neigh_ok {
                    return Err(schema_error(
                        "analysis.path_shape",
                        path,
                        format!("{dom_name}/{vertex_name}: path coordinate arrays differ in length"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// The registered centroid listing as `(identity, x, y)` triples in
    /// file order.
    pub fn reg_centroids(&self) -> impl Iterator<Item = (IdentityKey, f64, f64)> + '_ {
        self.reg_centroids_id
            .iter()
            .zip(&self.reg_centroids_x)
            .zip(&self.reg_centroids_y)
            .map(|((id, x), y)| (IdentityKey::from_raw(*id), *x, *y))
    }
}

/// One `c_NNNNN` field snapshot: per-cell values for every competitive
/// channel plus the shared substrate field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshotRecord {
    /// Connection density per channel per cell, `c[channel][cell]`.
    pub c: Vec<Vec<f64>>,
    /// Axon branching per channel per cell, `a[channel][cell]`.
    pub a: Vec<Vec<f64>>,
    /// Substrate field per cell.
    pub n: Vec<f64>,
    /// Winning identity per cell, absent in older runs.
    #[serde(default)]
    pub dr: Option<Vec<f64>>,
}

impl FieldSnapshotRecord {
    /// Reads and validates one field snapshot.
    ///
    /// The record on disk is a flat map whose keys carry the channel index
    /// (`c0`, `c1`, ..., `a0`, ..., `n`, `dr*`); an unrecognised key or a
    /// gap in the channel numbering is a schema error.
    pub fn read(path: &Path) -> Result<Self, BarrelError> {
        let raw: BTreeMap<String, Value> = parse_json(path)?;
        let mut c: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        let mut a: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        let mut n: Option<Vec<f64>> = None;
        let mut dr: Option<Vec<f64>> = None;

        for (key, value) in raw {
            if let Some(digits) = key.strip_prefix('c') {
                c.insert(channel_index(&key, digits, path)?, float_array(&key, value, path)?);
            } else if let Some(digits) = key.strip_prefix('a') {
                a.insert(channel_index(&key, digits, path)?, float_array(&key, value, path)?);
            } else if key == "n" {
                n = Some(float_array(&key, value, path)?);
            } else if key.starts_with("dr") {
                let values = float_array(&key, value, path)?;
                // Writers emit an empty winner array before the first
                // analysis pass has run.
                if !values.is_empty() {
                    dr = Some(values);
                }
            } else {
                return Err(schema_error(
                    "field.unknown_key",
                    path,
                    format!("unrecognised dataset key {key:?}"),
                ));
            }
        }

        let record = Self {
            c: dense_channels("c", c, path)?,
            a: dense_channels("a", a, path)?,
            n: n.ok_or_else(|| schema_error("field.missing_n", path, "dataset n is missing"))?,
            dr,
        };
        record.validate(path)?;
        Ok(record)
    }

    fn validate(&self, path: &Path) -> Result<(), BarrelError> {
        if self.c.is_empty() {
            return Err(schema_error(
                "field.no_channels",
                path,
                "no c channels present",
            ));
        }
        if self.a.len() != self.c.len() {
            return Err(schema_error(
                "field.channel_count",
                path,
                format!("{} a channels against {} c channels", self.a.len(), self.c.len()),
            ));
        }
        let cells = self.c[0].len();
        let uniform = self.c.iter().chain(self.a.iter()).all(|ch| ch.len() == cells)
            && self.n.len() == cells
            && self.dr.as_ref().map_or(true, |dr| dr.len() == cells);
        if !uniform {
            return Err(schema_error(
                "field.cell_count",
                path,
                "datasets disagree on the number of cells",
            ));
        }
        Ok(())
    }

    /// Number of competitive channels.
    pub fn num_channels(&self) -> usize {
        self.c.len()
    }

    /// Number of spatial cells.
    pub fn num_cells(&self) -> usize {
        self.c.first().map_or(0, Vec::len)
    }
}

fn channel_index(key: &str, digits: &str, path: &Path) -> Result<usize, BarrelError> {
    digits.parse::<usize>().map_err(|_| {
        schema_error(
            "field.bad_channel",
            path,
            format!("key {key:?} carries no channel index"),
        )
    })
}

fn float_array(key: &str, value: Value, path: &Path) -> Result<Vec<f64>, BarrelError> {
    serde_json::from_value(value).map_err(|err| {
        schema_error(
            "field.bad_array",
            path,
            format!("dataset {key:?} is not a numeric array: {err}"),
        )
    })
}

fn dense_channels(
    prefix: &str,
    channels: BTreeMap<usize, Vec<f64>>,
    path: &Path,
) -> Result<Vec<Vec<f64>>, BarrelError> {
    let count = channels.len();
    if let Some((&highest, _)) = channels.iter().next_back() {
        if highest != count - 1 {
            return Err(schema_error(
                "field.channel_gap",
                path,
                format!("{prefix} channels are not densely numbered 0..{count}"),
            ));
        }
    }
    Ok(channels.into_values().collect())
}

/// The singleton `positions` record: cell coordinates and total grid area.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PositionsRecord {
    /// X coordinate per cell.
    pub x: Vec<f64>,
    /// Y coordinate per cell.
    pub y: Vec<f64>,
    /// Total grid area, recorded as a one-element dataset.
    pub area: Vec<f64>,
}

impl PositionsRecord {
    /// Reads and validates `positions.json` from a log directory.
    pub fn read(logdir: &Path) -> Result<Self, BarrelError> {
        let path = logdir.join("positions.json");
        if !path.exists() {
            return Err(BarrelError::MissingRequiredFile(
                ErrorInfo::new("positions.missing", "positions.json not found")
                    .with_context("logdir", logdir.display().to_string()),
            ));
        }
        let record: Self = parse_json(&path)?;
        if record.x.len() != record.y.len() {
            return Err(schema_error(
                "positions.shape",
                &path,
                format!("x has {} cells, y has {}", record.x.len(), record.y.len()),
            ));
        }
        if record.area.is_empty() {
            return Err(schema_error(
                "positions.area",
                &path,
                "area dataset is empty",
            ));
        }
        Ok(record)
    }

    /// Number of spatial cells.
    pub fn num_cells(&self) -> usize {
        self.x.len()
    }

    /// Total area of the grid.
    pub fn total_area(&self) -> f64 {
        self.area[0]
    }

    /// Index of the cell closest to the target coordinate.
    pub fn nearest_index(&self, target: (f64, f64)) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, (x, y)) in self.x.iter().zip(&self.y).enumerate() {
            let r = (x - target.0).powi(2) + (y - target.1).powi(2);
            if best.map_or(true, |(_, r_min)| r < r_min) {
                best = Some((idx, r));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

/// The singleton `guidance` record: guidance molecule fields and the
/// experimentally drawn identity of every cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceRecord {
    /// Guidance field per gradient per cell, `rh[gradient][cell]`.
    pub rh: Vec<Vec<f64>>,
    /// Experimentally observed identity per cell.
    pub expt_barrel_id: Vec<f64>,
}

impl GuidanceRecord {
    /// Reads and validates `guidance.json` from a log directory.
    pub fn read(logdir: &Path) -> Result<Self, BarrelError> {
        let path = logdir.join("guidance.json");
        if !path.exists() {
            return Err(BarrelError::MissingRequiredFile(
                ErrorInfo::new("guidance.missing", "guidance.json not found")
                    .with_context("logdir", logdir.display().to_string()),
            ));
        }
        let raw: BTreeMap<String, Value> = parse_json(&path)?;
        let mut rh: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        let mut expt_barrel_id: Option<Vec<f64>> = None;
        for (key, value) in raw {
            if let Some(digits) = key.strip_prefix("rh") {
                rh.insert(channel_index(&key, digits, &path)?, float_array(&key, value, &path)?);
            } else if key == "expt_barrel_id" {
                expt_barrel_id = Some(float_array(&key, value, &path)?);
            } else {
                return Err(schema_error(
                    "guidance.unknown_key",
                    &path,
                    format!("unrecognised dataset key {key:?}"),
                ));
            }
        }
        let record = Self {
            rh: dense_channels("rh", rh, &path)?,
            expt_barrel_id: expt_barrel_id.ok_or_else(|| {
                schema_error("guidance.missing_ids", &path, "expt_barrel_id is missing")
            })?,
        };
        let cells = record.expt_barrel_id.len();
        if record.rh.iter().any(|field| field.len() != cells) {
            return Err(schema_error(
                "guidance.cell_count",
                &path,
                "datasets disagree on the number of cells",
            ));
        }
        Ok(record)
    }

    /// Number of guidance gradients M.
    pub fn num_gradients(&self) -> usize {
        self.rh.len()
    }
}
