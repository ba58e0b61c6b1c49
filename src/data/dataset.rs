//! Merged dataset and its signature-keyed cache.
//! Built once per distinct source snapshot, then shared via Arc with every query until a file changes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::error::IngestError;
use crate::data::extract::{extract, DEFAULT_ENTRY_EXTENSION};
use crate::data::normalize::{map_headers, normalize_with};
use crate::data::record::CanonicalRecord;
use crate::data::source::{basename, discover_sources, SourceKey, SourceSignature, SourceSpec};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// What one archive contributed to a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub path: PathBuf,
    pub signature: SourceSignature,
    pub entry_name: String,
    pub rows: usize,
    /// Raw headers that were not mapped to any canonical field.
    pub dropped_headers: Vec<String>,
}

/// Immutable merged roster. Records keep source order, then row order within each source.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<CanonicalRecord>,
    key: SourceKey,
    generation: u64,
    loaded_at: DateTime<Utc>,
    sources: Vec<SourceSummary>,
}

impl Dataset {
    /// Build a dataset from records already in canonical shape (tests, benches, other backends).
    pub fn from_records(records: Vec<CanonicalRecord>) -> Self {
        Self {
            records,
            key: SourceKey::from_parts(Vec::new()),
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            loaded_at: Utc::now(),
            sources: Vec::new(),
        }
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn key(&self) -> &SourceKey {
        &self.key
    }

    /// Process-unique id of this build; query caches key on it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn sources(&self) -> &[SourceSummary] {
        &self.sources
    }
}

/// Memo table from source snapshot to merged dataset.
///
/// Only the most recent snapshot is kept: once a file changes, the superseded dataset lives on only
/// while callers still hold its `Arc`. Lookups and inserts take the lock; rebuilds run outside it, so
/// two callers racing on a new key may both build. Either result is equivalent and the last insert wins.
#[derive(Debug)]
pub struct DatasetAssembler {
    entry_extension: String,
    cache: Mutex<HashMap<SourceKey, Arc<Dataset>>>,
}

impl Default for DatasetAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRY_EXTENSION)
    }
}

impl DatasetAssembler {
    pub fn new(entry_extension: impl Into<String>) -> Self {
        Self {
            entry_extension: entry_extension.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached dataset for `key`, or rebuild it from every source in order.
    pub fn load(&self, key: &SourceKey) -> Result<Arc<Dataset>, IngestError> {
        if key.is_empty() {
            return Err(IngestError::NoSources);
        }
        if let Some(hit) = self.lookup(key) {
            tracing::debug!(generation = hit.generation(), "dataset cache hit");
            return Ok(hit);
        }

        let dataset = Arc::new(self.build(key)?);
        tracing::info!(
            sources = key.len(),
            records = dataset.len(),
            generation = dataset.generation(),
            "dataset rebuilt"
        );
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
            cache.insert(key.clone(), Arc::clone(&dataset));
        }
        Ok(dataset)
    }

    /// Discover, snapshot signatures, then load.
    pub fn load_current(
        &self,
        spec: &SourceSpec,
        base_dir: &Path,
    ) -> Result<Arc<Dataset>, IngestError> {
        let paths = discover_sources(spec, base_dir)?;
        if paths.is_empty() {
            tracing::warn!(?spec, base_dir = %base_dir.display(), "no source archives discovered");
            return Err(IngestError::NoSources);
        }
        self.load(&SourceKey::snapshot(&paths))
    }

    /// Number of distinct snapshots currently memoized.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    fn lookup(&self, key: &SourceKey) -> Option<Arc<Dataset>> {
        let cache = self.cache.lock().ok()?;
        cache.get(key).cloned()
    }

    fn build(&self, key: &SourceKey) -> Result<Dataset, IngestError> {
        let mut records = Vec::new();
        let mut sources = Vec::with_capacity(key.len());

        for (path, signature) in key.entries() {
            let table = extract(path, &self.entry_extension).map_err(|source| {
                tracing::error!(path = %path.display(), "source failed: {source}");
                IngestError::MalformedSource {
                    path: path.clone(),
                    source,
                }
            })?;
            let mapping = map_headers(&table.headers);
            let source_file = basename(path);
            let mut rows = normalize_with(&table, &mapping);
            for row in &mut rows {
                row.source_file = Some(source_file.clone());
            }

            sources.push(SourceSummary {
                path: path.clone(),
                signature: signature.clone(),
                entry_name: table.entry_name,
                rows: rows.len(),
                dropped_headers: mapping.dropped,
            });
            records.extend(rows);
        }

        Ok(Dataset {
            records,
            key: key.clone(),
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            loaded_at: Utc::now(),
            sources,
        })
    }
}
