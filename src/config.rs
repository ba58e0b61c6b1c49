//! Runtime configuration: defaults, then an optional YAML file, then `BID_*` environment overrides.
//!
//! Config file: `$BID_CONFIG`, or `bid_roster.yaml` in the working directory when present.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::data::extract::DEFAULT_ENTRY_EXTENSION;
use crate::data::source::{SourceSpec, DEFAULT_SOURCE_PATTERN};
use crate::data::sqlite::DEFAULT_SQLITE_TABLE;
use crate::query::cache::DEFAULT_QUERY_CACHE_CAPACITY;
use crate::query::QueryInputError;

pub const DEFAULT_CONFIG_FILE: &str = "bid_roster.yaml";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Allowed result limits for search. Mirrors the operator slider: 50..=1000, default 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LimitRange {
    pub min: usize,
    pub max: usize,
    pub default: usize,
}

impl Default for LimitRange {
    fn default() -> Self {
        Self {
            min: 50,
            max: 1000,
            default: 200,
        }
    }
}

impl LimitRange {
    /// Caller-side range check; the query engine itself trusts whatever it is given.
    pub fn validate(&self, limit: Option<usize>) -> Result<usize, QueryInputError> {
        let limit = limit.unwrap_or(self.default);
        if (self.min..=self.max).contains(&limit) {
            Ok(limit)
        } else {
            Err(QueryInputError::LimitOutOfRange {
                limit,
                min: self.min,
                max: self.max,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fixed ordered list of archives. When non-empty, `pattern` is ignored.
    pub sources: Vec<PathBuf>,
    pub pattern: String,
    /// Directory that relative sources and the pattern are resolved against.
    pub base_dir: PathBuf,
    /// Suffix of the tabular entry inside each archive.
    pub entry_extension: String,
    /// When set, queries go to this SQLite file instead of the archives.
    pub sqlite_path: Option<PathBuf>,
    pub sqlite_table: String,
    pub bind_addr: String,
    pub limits: LimitRange,
    pub query_cache_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            pattern: DEFAULT_SOURCE_PATTERN.to_string(),
            base_dir: PathBuf::from("."),
            entry_extension: DEFAULT_ENTRY_EXTENSION.to_string(),
            sqlite_path: None,
            sqlite_table: DEFAULT_SQLITE_TABLE.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            limits: LimitRange::default(),
            query_cache_capacity: DEFAULT_QUERY_CACHE_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Resolve from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Resolve with an injectable variable lookup (tests pass a map instead of the real environment).
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let file = match lookup("BID_CONFIG") {
            Some(path) => Some(PathBuf::from(path)),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
        };
        let mut config = match file {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(list) = lookup("BID_SOURCES") {
            self.sources = list
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(PathBuf::from)
                .collect();
        }
        if let Some(pattern) = lookup("BID_PATTERN") {
            self.pattern = pattern;
        }
        if let Some(dir) = lookup("BID_BASE_DIR") {
            self.base_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("BID_SQLITE") {
            self.sqlite_path = Some(PathBuf::from(path)).filter(|p| !p.as_os_str().is_empty());
        }
        if let Some(table) = lookup("BID_SQLITE_TABLE") {
            self.sqlite_table = table;
        }
        if let Some(bind) = lookup("BID_BIND") {
            self.bind_addr = bind;
        }
        if let Some(raw) = lookup("BID_QUERY_CACHE") {
            self.query_cache_capacity =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        name: "BID_QUERY_CACHE",
                        value: raw.clone(),
                    })?;
        }
        Ok(())
    }

    pub fn source_spec(&self) -> SourceSpec {
        if self.sources.is_empty() {
            SourceSpec::Pattern(self.pattern.clone())
        } else {
            SourceSpec::Fixed(self.sources.clone())
        }
    }
}
