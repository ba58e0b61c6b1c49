//! Source discovery and file signatures used as the dataset cache key.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

use crate::data::error::IngestError;

pub const DEFAULT_SOURCE_PATTERN: &str = "*.csv.zip";

/// Where archives come from: an explicit ordered list, or a glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Fixed(Vec<PathBuf>),
    Pattern(String),
}

/// `(basename, byte size, mtime in whole seconds)`. A missing file yields `(basename, 0, 0)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSignature {
    pub name: String,
    pub size: u64,
    pub mtime: i64,
}

/// Immutable snapshot of the ordered source paths and their signatures, taken before loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    entries: Vec<(PathBuf, SourceSignature)>,
}

impl SourceKey {
    /// Stat every path now. The key never re-reads file metadata later.
    pub fn snapshot(paths: &[PathBuf]) -> Self {
        let entries = paths
            .iter()
            .map(|path| (path.clone(), signature(path)))
            .collect();
        Self { entries }
    }

    pub fn from_parts(entries: Vec<(PathBuf, SourceSignature)>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|(path, _)| path.as_path())
    }

    pub fn signatures(&self) -> impl Iterator<Item = &SourceSignature> {
        self.entries.iter().map(|(_, sig)| sig)
    }

    pub fn entries(&self) -> &[(PathBuf, SourceSignature)] {
        &self.entries
    }
}

/// Resolve the configured sources against `base_dir`.
///
/// A non-empty fixed list wins: its existing members are returned in configured order. Otherwise the
/// pattern is globbed and regular files come back in lexicographic order. No match is not an error.
pub fn discover_sources(spec: &SourceSpec, base_dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    match spec {
        SourceSpec::Fixed(paths) if !paths.is_empty() => Ok(paths
            .iter()
            .map(|path| resolve(base_dir, path))
            .filter(|path| path.exists())
            .collect()),
        SourceSpec::Fixed(_) => discover_by_pattern(DEFAULT_SOURCE_PATTERN, base_dir),
        SourceSpec::Pattern(pattern) => discover_by_pattern(pattern, base_dir),
    }
}

fn discover_by_pattern(pattern: &str, base_dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let full = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let base = glob::Pattern::escape(&base_dir.to_string_lossy());
        format!("{}/{}", base.trim_end_matches('/'), pattern)
    };
    let entries = glob::glob(&full).map_err(|source| IngestError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut found: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!("skipping unreadable glob match: {err}");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    found.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    Ok(found)
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Signature for cache invalidation. Never fails: a missing or unreadable file gets the zero sentinel.
pub fn signature(path: &Path) -> SourceSignature {
    let name = basename(path);
    let Ok(meta) = fs::metadata(path) else {
        return SourceSignature {
            name,
            size: 0,
            mtime: 0,
        };
    };
    let mtime = meta
        .modified()
        .ok()
        .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0);
    SourceSignature {
        name,
        size: meta.len(),
        mtime,
    }
}

pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
