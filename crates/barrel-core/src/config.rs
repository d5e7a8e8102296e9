use serde::{Deserialize, Serialize};

/// Policy applied when a domain record's identity key cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityPolicy {
    /// Fail the load session with `UnknownDomainIdentity`.
    #[default]
    Strict,
    /// Skip the record, leave the domain count untouched, and record a
    /// warning. Used by batch sweeps to tolerate occasional malformed runs.
    Lenient,
}

/// Immutable per-load configuration.
///
/// Replaces the mutable attribute toggles of the historical loader: the
/// options are fixed before the session starts and every recognised switch
/// is enumerated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Load the field snapshot family (`c_*`).
    #[serde(default = "default_true")]
    pub load_field_data: bool,
    /// Load the analysis snapshot family (`dirich_*`).
    #[serde(default = "default_true")]
    pub load_analysis_data: bool,
    /// Aggregate the ragged per-domain boundary paths. Expensive; off by
    /// default.
    #[serde(default)]
    pub load_boundaries: bool,
    /// Load the guidance fields and the experimental identity map.
    #[serde(default)]
    pub load_guidance: bool,
    /// Restrict discovery to the single snapshot at this timestep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_timestep: Option<u64>,
    /// Identity resolution policy for domain reconciliation.
    #[serde(default)]
    pub identity_policy: IdentityPolicy,
}

fn default_true() -> bool {
    true
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            load_field_data: true,
            load_analysis_data: true,
            load_boundaries: false,
            load_guidance: false,
            target_timestep: None,
            identity_policy: IdentityPolicy::Strict,
        }
    }
}

impl LoadOptions {
    /// Options for an analysis-only load (no field arrays).
    pub fn analysis_only() -> Self {
        Self {
            load_field_data: false,
            ..Self::default()
        }
    }

    /// Returns a copy with boundary aggregation enabled.
    pub fn with_boundaries(mut self) -> Self {
        self.load_boundaries = true;
        self
    }

    /// Returns a copy with guidance loading enabled.
    pub fn with_guidance(mut self) -> Self {
        self.load_guidance = true;
        self
    }

    /// Returns a copy restricted to a single timestep.
    pub fn at_timestep(mut self, step: u64) -> Self {
        self.target_timestep = Some(step);
        self
    }

    /// Returns a copy using the provided identity policy.
    pub fn with_identity_policy(mut self, policy: IdentityPolicy) -> Self {
        self.identity_policy = policy;
        self
    }
}
