//! Structured error types shared across the barrel crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`BarrelError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, timesteps, identity keys, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the ingestion and metrics engine.
///
/// Every variant corresponds to one failure condition a load session or
/// metric computation can surface. `SeriesLengthMismatch` is deliberately
/// absent: a length mismatch between snapshot families is recoverable and
/// travels as a [`crate::LoadWarning`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", content = "detail")]
pub enum BarrelError {
    /// A filename matched the discovery glob but carried no parseable
    /// integer timestep in the wildcard position.
    #[error("pattern mismatch: {0}")]
    PatternMismatch(ErrorInfo),
    /// No files matched the discovery glob.
    #[error("empty snapshot set: {0}")]
    EmptySet(ErrorInfo),
    /// Two snapshot files in one family decode to the same timestep.
    #[error("duplicate timestep: {0}")]
    DuplicateTimestep(ErrorInfo),
    /// A domain record's identity key is absent from the identity space.
    #[error("unknown domain identity: {0}")]
    UnknownDomainIdentity(ErrorInfo),
    /// An analysis snapshot contained no domain records.
    #[error("no domains detected: {0}")]
    NoDomainsDetected(ErrorInfo),
    /// Grid alignment requires a perfect-square domain count.
    #[error("non-square domain count: {0}")]
    NonSquareDomainCount(ErrorInfo),
    /// A least-squares group had a zero-variance independent variable.
    #[error("degenerate fit: {0}")]
    DegenerateFit(ErrorInfo),
    /// Reconciled data and a reference adjacency use different identity
    /// spaces.
    #[error("identity space mismatch: {0}")]
    IdentitySpaceMismatch(ErrorInfo),
    /// A mandatory singleton file (params.json, positions.json, ...) is
    /// missing from the log directory.
    #[error("missing required file: {0}")]
    MissingRequiredFile(ErrorInfo),
    /// A record failed schema validation (missing field, wrong shape,
    /// malformed JSON).
    #[error("schema error: {0}")]
    Schema(ErrorInfo),
    /// Filesystem I/O failure.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl BarrelError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            BarrelError::PatternMismatch(info)
            | BarrelError::EmptySet(info)
            | BarrelError::DuplicateTimestep(info)
            | BarrelError::UnknownDomainIdentity(info)
            | BarrelError::NoDomainsDetected(info)
            | BarrelError::NonSquareDomainCount(info)
            | BarrelError::DegenerateFit(info)
            | BarrelError::IdentitySpaceMismatch(info)
            | BarrelError::MissingRequiredFile(info)
            | BarrelError::Schema(info)
            | BarrelError::Io(info) => info,
        }
    }
}

/// Recoverable condition recorded during a load session.
///
/// Warnings are data, not side effects: the session accumulates them and the
/// sweep report persists them alongside the rows they affected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LoadWarning {
    /// Two independently discovered snapshot families disagreed on the
    /// number of timesteps; the time axis was recreated and the later
    /// family's length won.
    SeriesLengthMismatch {
        /// Length the time axis had before the conflicting family arrived.
        existing: usize,
        /// Length reported by the conflicting family (the one that wins).
        incoming: usize,
        /// Discovery pattern of the family that triggered the recreation.
        family: String,
    },
    /// A domain record was skipped under the lenient identity policy.
    UnknownIdentitySkipped {
        /// Timestep of the snapshot holding the skipped record.
        timestep: u64,
        /// The unresolvable identity key, rendered as its raw value.
        identity: String,
    },
}
