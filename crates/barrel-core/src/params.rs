//! Schema for the `params.json` file recorded in every log directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{BarrelError, ErrorInfo};
use crate::identity::{DomainIdentitySpace, IdentityKey};

/// One thalamocortical channel entry from the `tc` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Externally meaningful channel name (e.g. a whisker label).
    pub name: String,
    /// Growth parameter alpha.
    pub alpha: f64,
    /// Decay parameter beta.
    pub beta: f64,
    /// Interaction strength epsilon. Absent in older runs.
    #[serde(default)]
    pub epsilon: f64,
    /// Guidance interaction coefficients.
    pub gamma: Vec<f64>,
}

/// Scalar simulation parameters plus the per-channel table.
///
/// Field names mirror the file contract; `D` keeps its upper-case spelling
/// on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Simulation time per step.
    pub dt: f64,
    /// Hex to hex distance of the spatial grid.
    pub hextohex_d: f64,
    /// Diffusion constant.
    #[serde(rename = "D")]
    pub d: f64,
    /// Flux parameter. Absent in older runs.
    #[serde(default, rename = "F")]
    pub f: f64,
    /// Competition exponent.
    pub k: f64,
    /// Per-channel parameter table; its length fixes the channel count N.
    pub tc: Vec<ChannelSpec>,
}

impl SimParams {
    /// Loads and validates `params.json` from a log directory.
    pub fn load(logdir: &Path) -> Result<Self, BarrelError> {
        let path = logdir.join("params.json");
        if !path.exists() {
            return Err(BarrelError::MissingRequiredFile(
                ErrorInfo::new("params.missing", "params.json not found")
                    .with_context("logdir", logdir.display().to_string()),
            ));
        }
        let bytes = fs::read(&path).map_err(|err| {
            BarrelError::Io(
                ErrorInfo::new("params.read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let params: SimParams = serde_json::from_slice(&bytes).map_err(|err| {
            BarrelError::Schema(
                ErrorInfo::new("params.parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), BarrelError> {
        if self.tc.is_empty() {
            return Err(BarrelError::Schema(ErrorInfo::new(
                "params.empty_tc",
                "tc channel table is empty; channel count would be zero",
            )));
        }
        if self.dt <= 0.0 {
            return Err(BarrelError::Schema(
                ErrorInfo::new("params.bad_dt", "dt must be strictly positive")
                    .with_context("dt", self.dt.to_string()),
            ));
        }
        Ok(())
    }

    /// The channel count N.
    pub fn num_channels(&self) -> usize {
        self.tc.len()
    }

    /// Identity key of channel `i`, encoded as the writers encode it: the
    /// f32 quotient `i / N`.
    pub fn identity_of(&self, i: usize) -> IdentityKey {
        IdentityKey::from_raw((i as f32 / self.tc.len() as f32) as f64)
    }

    /// The identity space implied by the channel table, in channel order.
    pub fn identity_space(&self) -> Result<DomainIdentitySpace, BarrelError> {
        DomainIdentitySpace::from_keys((0..self.tc.len()).map(|i| self.identity_of(i)))
    }

    /// Channel-name to identity-key map.
    pub fn identity_by_name(&self) -> BTreeMap<String, IdentityKey> {
        self.tc
            .iter()
            .enumerate()
            .map(|(i, ch)| (ch.name.clone(), self.identity_of(i)))
            .collect()
    }

    /// Identity-key to gamma-vector map.
    pub fn gamma_by_identity(&self) -> BTreeMap<IdentityKey, Vec<f64>> {
        self.tc
            .iter()
            .enumerate()
            .map(|(i, ch)| (self.identity_of(i), ch.gamma.clone()))
            .collect()
    }

    /// Mean alpha across channels.
    pub fn mean_alpha(&self) -> f64 {
        self.tc.iter().map(|ch| ch.alpha).sum::<f64>() / self.tc.len() as f64
    }

    /// Mean beta across channels.
    pub fn mean_beta(&self) -> f64 {
        self.tc.iter().map(|ch| ch.beta).sum::<f64>() / self.tc.len() as f64
    }

    /// Mean epsilon across channels.
    pub fn mean_epsilon(&self) -> f64 {
        self.tc.iter().map(|ch| ch.epsilon).sum::<f64>() / self.tc.len() as f64
    }
}
