//! Mapping of per-timestep domain detections onto the stable identity space.

use serde::{Deserialize, Serialize};

use barrel_core::config::IdentityPolicy;
use barrel_core::errors::{BarrelError, ErrorInfo, LoadWarning};
use barrel_core::identity::DomainIdentitySpace;

use crate::schema::AnalysisSnapshotRecord;

/// Identity-slot-indexed arrays for one timestep.
///
/// Absent slots hold NaN centroids and zero area; `present` marks the slots
/// a detection was reconciled into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledTimestep {
    /// Simulation step this snapshot belongs to.
    pub timestep: u64,
    /// Registered centroid per identity slot (centroid method).
    pub reg_centroids: Vec<[f64; 2]>,
    /// Putative domain centre per identity slot (Honda's method).
    pub dirich_centroids: Vec<[f64; 2]>,
    /// Which identity slots received a detection.
    pub present: Vec<bool>,
    /// Domain area per identity slot.
    pub areas: Vec<f64>,
    /// Summed edge deviation across reconciled domains.
    pub edgedev_sum: f64,
    /// Mean edge deviation across reconciled domains.
    pub edgedev_mean: f64,
    /// Number of domain records reconciled into this timestep. Records
    /// skipped under the lenient policy are not counted.
    pub domain_count: usize,
    /// Total area covered by reconciled domains.
    pub domarea: f64,
}

impl ReconciledTimestep {
    /// Number of identity slots.
    pub fn num_slots(&self) -> usize {
        self.present.len()
    }
}

/// Maps the unordered, variably named domain records of an analysis
/// snapshot onto identity slots.
#[derive(Debug, Clone, Copy)]
pub struct DomainReconciler<'a> {
    space: &'a DomainIdentitySpace,
    policy: IdentityPolicy,
}

impl<'a> DomainReconciler<'a> {
    /// Creates a reconciler over the given identity space.
    pub fn new(space: &'a DomainIdentitySpace, policy: IdentityPolicy) -> Self {
        Self { space, policy }
    }

    /// Reconciles one snapshot into slot-indexed arrays.
    ///
    /// An empty domain set is `NoDomainsDetected`: the mean edge deviation
    /// would be undefined and must never silently become NaN. An identity
    /// key absent from the space is `UnknownDomainIdentity` under the
    /// strict policy; the lenient policy skips the record, records a
    /// warning, and leaves `domain_count` untouched.
    pub fn reconcile(
        &self,
        record: &AnalysisSnapshotRecord,
        timestep: u64,
        warnings: &mut Vec<LoadWarning>,
    ) -> Result<ReconciledTimestep, BarrelError> {
        let slots = self.space.len();
        let mut out = ReconciledTimestep {
            timestep,
            reg_centroids: vec![[f64::NAN; 2]; slots],
            dirich_centroids: vec![[f64::NAN; 2]; slots],
            present: vec![false; slots],
            areas: vec![0.0; slots],
            edgedev_sum: 0.0,
            edgedev_mean: 0.0,
            domain_count: 0,
            domarea: 0.0,
        };

        // The registered centroid listing is slotted by identity lookup,
        // never by file order.
        for (key, x, y) in record.reg_centroids() {
            match self.space.slot(key) {
                Some(slot) => out.reg_centroids[slot] = [x, y],
                None => match self.policy {
                    IdentityPolicy::Strict => {
                        return Err(self.unknown_identity(key.to_string(), timestep, "listing"))
                    }
                    IdentityPolicy::Lenient => warnings.push(LoadWarning::UnknownIdentitySkipped {
                        timestep,
                        identity: key.to_string(),
                    }),
                },
            }
        }

        if record.domains.is_empty() {
            return Err(BarrelError::NoDomainsDetected(
                ErrorInfo::new("reconcile.no_domains", "snapshot holds no domain records")
                    .with_context("timestep", timestep.to_string()),
            ));
        }

        for (name, dom) in &record.domains {
            let key = dom.identity();
            let slot = match self.space.slot(key) {
                Some(slot) => slot,
                None => match self.policy {
                    IdentityPolicy::Strict => {
                        return Err(self.unknown_identity(key.to_string(), timestep, name))
                    }
                    IdentityPolicy::Lenient => {
                        warnings.push(LoadWarning::UnknownIdentitySkipped {
                            timestep,
                            identity: key.to_string(),
                        });
                        continue;
                    }
                },
            };
            if out.present[slot] {
                return Err(BarrelError::Schema(
                    ErrorInfo::new(
                        "reconcile.duplicate_domain",
                        format!("identity {key} detected twice in one snapshot"),
                    )
                    .with_context("timestep", timestep.to_string())
                    .with_context("group", name.clone()),
                ));
            }
            out.present[slot] = true;
            out.dirich_centroids[slot] = dom.p;
            out.areas[slot] = dom.area;
            out.edgedev_sum += dom.edgedev;
            out.domarea += dom.area;
            out.domain_count += 1;
        }

        if out.domain_count == 0 {
            // Lenient skipping consumed every record.
            return Err(BarrelError::NoDomainsDetected(
                ErrorInfo::new(
                    "reconcile.all_skipped",
                    "no domain record could be reconciled into the identity space",
                )
                .with_context("timestep", timestep.to_string()),
            ));
        }
        out.edgedev_mean = out.edgedev_sum / out.domain_count as f64;
        Ok(out)
    }

    fn unknown_identity(&self, key: String, timestep: u64, source: &str) -> BarrelError {
        BarrelError::UnknownDomainIdentity(
            ErrorInfo::new(
                "reconcile.unknown_identity",
                format!("identity key {key} is absent from the identity space"),
            )
            .with_context("timestep", timestep.to_string())
            .with_context("source", source.to_string())
            .with_hint("the identity space is fixed by the first snapshot of the series"),
        )
    }
}
