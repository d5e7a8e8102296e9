//! Discovery and time-ordering of per-timestep snapshot files.

use std::path::{Path, PathBuf};

use barrel_core::errors::{BarrelError, ErrorInfo};

/// One snapshot file together with the integer timestep encoded in its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    /// Full path to the snapshot.
    pub path: PathBuf,
    /// Timestep decoded from the filename's wildcard position.
    pub timestep: u64,
}

/// The ordered files of one snapshot family within a log directory.
///
/// Invariant: files are sorted by strictly ascending timestep; a duplicate
/// timestep is a data-corruption condition and is reported at discovery,
/// never silently overwritten.
#[derive(Debug, Clone)]
pub struct SnapshotFileSet {
    pattern: String,
    files: Vec<SnapshotFile>,
}

impl SnapshotFileSet {
    /// Discovers every file in `dir` matching `prefix*suffix` and orders the
    /// set by the integer timestep parsed from the wildcard position.
    ///
    /// Fails with `EmptySet` when nothing matches, `PatternMismatch` when a
    /// matching name has no parseable integer, and `DuplicateTimestep` when
    /// two files decode to the same step.
    pub fn discover(dir: &Path, prefix: &str, suffix: &str) -> Result<Self, BarrelError> {
        let globstr = format!("{}{}*{}", glob_dir(dir), prefix, suffix);
        Self::from_glob(&globstr, prefix, suffix)
    }

    /// Discovers the single snapshot at `step`, using the five-digit
    /// zero-padded timestep encoding of the writers.
    ///
    /// Fails with `EmptySet` when the file is absent, so callers treat a
    /// missing target exactly like an empty family.
    pub fn discover_at(
        dir: &Path,
        prefix: &str,
        suffix: &str,
        step: u64,
    ) -> Result<Self, BarrelError> {
        let globstr = format!("{}{}{:05}{}", glob_dir(dir), prefix, step, suffix);
        Self::from_glob(&globstr, prefix, suffix)
    }

    fn from_glob(globstr: &str, prefix: &str, suffix: &str) -> Result<Self, BarrelError> {
        let entries = glob::glob(globstr).map_err(|err| {
            BarrelError::Schema(
                ErrorInfo::new("fileset.bad_pattern", err.to_string())
                    .with_context("pattern", globstr),
            )
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| {
                BarrelError::Io(
                    ErrorInfo::new("fileset.walk", err.to_string())
                        .with_context("pattern", globstr),
                )
            })?;
            let timestep = parse_timestep(&path, prefix, suffix)?;
            files.push(SnapshotFile { path, timestep });
        }

        if files.is_empty() {
            return Err(BarrelError::EmptySet(
                ErrorInfo::new("fileset.empty", "no snapshot files matched")
                    .with_context("pattern", globstr),
            ));
        }

        files.sort_by_key(|file| file.timestep);
        for pair in files.windows(2) {
            if pair[0].timestep == pair[1].timestep {
                return Err(BarrelError::DuplicateTimestep(
                    ErrorInfo::new(
                        "fileset.duplicate",
                        format!("timestep {} appears in two files", pair[0].timestep),
                    )
                    .with_context("first", pair[0].path.display().to_string())
                    .with_context("second", pair[1].path.display().to_string()),
                ));
            }
        }

        Ok(Self {
            pattern: format!("{prefix}*{suffix}"),
            files,
        })
    }

    /// The discovery pattern, used in warnings and reports.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Number of files in the family.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when the family holds no files. Unreachable for sets produced
    /// by `discover`, which fails with `EmptySet` instead.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates the files in ascending timestep order.
    pub fn iter(&self) -> impl Iterator<Item = &SnapshotFile> {
        self.files.iter()
    }

    /// The ordered timesteps of the family.
    pub fn timesteps(&self) -> Vec<u64> {
        self.files.iter().map(|file| file.timestep).collect()
    }
}

fn glob_dir(dir: &Path) -> String {
    let mut rendered = dir.display().to_string();
    if !rendered.ends_with(std::path::MAIN_SEPARATOR) {
        rendered.push(std::path::MAIN_SEPARATOR);
    }
    rendered
}

fn parse_timestep(path: &Path, prefix: &str, suffix: &str) -> Result<u64, BarrelError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let mismatch = || {
        BarrelError::PatternMismatch(
            ErrorInfo::new(
                "fileset.no_timestep",
                "filename carries no integer timestep in the wildcard position",
            )
            .with_context("file", name.to_string())
            .with_context("expected", format!("{prefix}<int>{suffix}")),
        )
    };
    let digits = name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(suffix))
        .ok_or_else(mismatch)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(mismatch());
    }
    digits.parse::<u64>().map_err(|_| mismatch())
}
