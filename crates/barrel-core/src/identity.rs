use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{BarrelError, ErrorInfo};

/// Quantisation factor for identity keys. Neighbouring identities differ by
/// `1/N` with N well below a thousand, so one-in-a-million resolution
/// absorbs any f32/f64 representation jitter between writers.
const KEY_SCALE: f64 = 1e6;

/// A domain identity key.
///
/// Snapshot writers encode the identity of channel `i` as the f32 value
/// `i / N`. The raw float is unusable as a map key, so it is quantised once
/// on construction and compared in quantised form everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityKey(i64);

impl IdentityKey {
    /// Quantises a raw identity value read from a snapshot.
    pub fn from_raw(raw: f64) -> Self {
        Self((raw * KEY_SCALE).round() as i64)
    }

    /// Returns the de-quantised identity value.
    pub fn as_raw(&self) -> f64 {
        self.0 as f64 / KEY_SCALE
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.as_raw())
    }
}

/// The fixed, ordered set of trackable domain identities for one load.
///
/// Established once from the centroid-listing fields of the first analysis
/// snapshot; every subsequent per-timestep domain record is mapped onto a
/// slot through [`DomainIdentitySpace::slot`]. Lookup goes through a hash
/// map built at construction, not a linear scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<IdentityKey>", into = "Vec<IdentityKey>")]
pub struct DomainIdentitySpace {
    keys: Vec<IdentityKey>,
    index: HashMap<IdentityKey, usize>,
}

impl DomainIdentitySpace {
    /// Builds an identity space from raw key values in slot order.
    ///
    /// A repeated key is a data error: two slots would be indistinguishable
    /// during reconciliation.
    pub fn from_raw_keys(raw: &[f64]) -> Result<Self, BarrelError> {
        Self::from_keys(raw.iter().map(|value| IdentityKey::from_raw(*value)))
    }

    /// Builds an identity space from already-quantised keys in slot order.
    pub fn from_keys(iter: impl IntoIterator<Item = IdentityKey>) -> Result<Self, BarrelError> {
        let keys: Vec<IdentityKey> = iter.into_iter().collect();
        let mut index = HashMap::with_capacity(keys.len());
        for (slot, key) in keys.iter().enumerate() {
            if index.insert(*key, slot).is_some() {
                return Err(BarrelError::Schema(
                    ErrorInfo::new(
                        "identity.duplicate_key",
                        format!("identity key {key} appears more than once"),
                    )
                    .with_context("slot", slot.to_string()),
                ));
            }
        }
        Ok(Self { keys, index })
    }

    /// Number of identity slots.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when the space holds no identities.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolves a key to its slot index, if the key belongs to this space.
    pub fn slot(&self, key: IdentityKey) -> Option<usize> {
        self.index.get(&key).copied()
    }

    /// The ordered identity keys.
    pub fn keys(&self) -> &[IdentityKey] {
        &self.keys
    }

    /// True when both spaces list the same keys in the same slot order.
    pub fn matches(&self, other: &DomainIdentitySpace) -> bool {
        self.keys == other.keys
    }
}

impl PartialEq for DomainIdentitySpace {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl TryFrom<Vec<IdentityKey>> for DomainIdentitySpace {
    type Error = BarrelError;

    fn try_from(keys: Vec<IdentityKey>) -> Result<Self, Self::Error> {
        Self::from_keys(keys)
    }
}

impl From<DomainIdentitySpace> for Vec<IdentityKey> {
    fn from(space: DomainIdentitySpace) -> Self {
        space.keys
    }
}
