#![deny(missing_docs)]
#![doc = "Core types for the barrel pattern ingestion and reconciliation engine."]

/// Canonical JSON and stable hashing helpers.
pub mod canon;
/// Immutable load configuration.
pub mod config;
pub mod errors;
/// Domain identity keys and the per-load identity space.
pub mod identity;
pub mod params;

pub use canon::{from_json_slice, stable_hash_string, to_canonical_json_bytes};
pub use config::{IdentityPolicy, LoadOptions};
pub use errors::{BarrelError, ErrorInfo, LoadWarning};
pub use identity::{DomainIdentitySpace, IdentityKey};
pub use params::{ChannelSpec, SimParams};
