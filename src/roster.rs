//! The roster as seen by callers: picks the archive pipeline or the SQLite table from config and
//! answers the three queries through one interface.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::data::dataset::{Dataset, DatasetAssembler, SourceSummary};
use crate::data::error::IngestError;
use crate::data::source::SourceSpec;
use crate::data::sqlite::{SqliteError, SqliteRoster};
use crate::query::{player_profiles, PlayerProfile, QueryCache, RosterRow};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Sqlite(#[from] SqliteError),
    #[error("roster backend lock poisoned")]
    Poisoned,
}

#[derive(Debug)]
enum Backend {
    Archives {
        assembler: DatasetAssembler,
        spec: SourceSpec,
        base_dir: PathBuf,
    },
    Sqlite(Mutex<SqliteRoster>),
}

/// Where the current data came from, for status output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum SourcesReport {
    Archives {
        generation: u64,
        loaded_at: String,
        records: usize,
        sources: Vec<SourceSummary>,
    },
    Sqlite {
        table: String,
        records: usize,
    },
}

#[derive(Debug)]
pub struct RosterService {
    backend: Backend,
    cache: QueryCache,
}

impl RosterService {
    pub fn from_config(config: &AppConfig) -> Result<Self, RosterError> {
        let backend = match &config.sqlite_path {
            Some(path) => {
                tracing::info!(path = %path.display(), table = %config.sqlite_table, "using sqlite roster");
                Backend::Sqlite(Mutex::new(SqliteRoster::open(path, &config.sqlite_table)?))
            }
            None => Backend::Archives {
                assembler: DatasetAssembler::new(config.entry_extension.clone()),
                spec: config.source_spec(),
                base_dir: config.base_dir.clone(),
            },
        };
        Ok(Self {
            backend,
            cache: QueryCache::with_capacity(config.query_cache_capacity),
        })
    }

    pub fn from_sqlite(roster: SqliteRoster) -> Self {
        Self {
            backend: Backend::Sqlite(Mutex::new(roster)),
            cache: QueryCache::with_capacity(0),
        }
    }

    /// Current merged dataset, rebuilt only when a source signature changed.
    /// `None` for the SQLite backend, which has no in-memory dataset.
    pub fn dataset(&self) -> Result<Option<Arc<Dataset>>, RosterError> {
        match &self.backend {
            Backend::Archives {
                assembler,
                spec,
                base_dir,
            } => Ok(Some(assembler.load_current(spec, base_dir)?)),
            Backend::Sqlite(_) => Ok(None),
        }
    }

    /// Load (or verify) the data once so ingestion failures surface before any query.
    pub fn preload(&self) -> Result<SourcesReport, RosterError> {
        self.sources()
    }

    pub fn teams(&self) -> Result<Arc<[String]>, RosterError> {
        match &self.backend {
            Backend::Sqlite(roster) => Ok(self.with_sqlite(roster, |r| r.distinct_teams())?.into()),
            Backend::Archives { .. } => {
                let dataset = self.require_dataset()?;
                Ok(self.cache.teams(&dataset))
            }
        }
    }

    pub fn search(
        &self,
        name_query: &str,
        team_filter: Option<&str>,
        limit: usize,
    ) -> Result<Arc<[RosterRow]>, RosterError> {
        match &self.backend {
            Backend::Sqlite(roster) => Ok(self
                .with_sqlite(roster, |r| r.search(name_query, team_filter, limit))?
                .into()),
            Backend::Archives { .. } => {
                let dataset = self.require_dataset()?;
                Ok(self.cache.search(&dataset, name_query, team_filter, limit))
            }
        }
    }

    pub fn player_details(&self, name_fragment: &str) -> Result<Arc<[RosterRow]>, RosterError> {
        match &self.backend {
            Backend::Sqlite(roster) => Ok(self
                .with_sqlite(roster, |r| r.player_details(name_fragment))?
                .into()),
            Backend::Archives { .. } => {
                let dataset = self.require_dataset()?;
                Ok(self.cache.player_details(&dataset, name_fragment))
            }
        }
    }

    pub fn player_profiles(&self, name_fragment: &str) -> Result<Vec<PlayerProfile>, RosterError> {
        Ok(player_profiles(&self.player_details(name_fragment)?))
    }

    /// Profile for one exact full name, if the fragment lookup finds it.
    pub fn player_profile(&self, full_name: &str) -> Result<Option<PlayerProfile>, RosterError> {
        let full_name = full_name.trim();
        Ok(self
            .player_profiles(full_name)?
            .into_iter()
            .find(|profile| profile.full_name == full_name))
    }

    pub fn sources(&self) -> Result<SourcesReport, RosterError> {
        match &self.backend {
            Backend::Sqlite(roster) => {
                let (table, records) =
                    self.with_sqlite(roster, |r| Ok((r.table().to_string(), r.count()?)))?;
                Ok(SourcesReport::Sqlite { table, records })
            }
            Backend::Archives { .. } => {
                let dataset = self.require_dataset()?;
                Ok(SourcesReport::Archives {
                    generation: dataset.generation(),
                    loaded_at: dataset.loaded_at().to_rfc3339(),
                    records: dataset.len(),
                    sources: dataset.sources().to_vec(),
                })
            }
        }
    }

    fn require_dataset(&self) -> Result<Arc<Dataset>, RosterError> {
        self.dataset()?.ok_or(RosterError::Ingest(IngestError::NoSources))
    }

    fn with_sqlite<T>(
        &self,
        roster: &Mutex<SqliteRoster>,
        f: impl FnOnce(&SqliteRoster) -> Result<T, SqliteError>,
    ) -> Result<T, RosterError> {
        let guard = roster.lock().map_err(|_| RosterError::Poisoned)?;
        Ok(f(&guard)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_teams_without_sources_report_no_sources() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            base_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        let roster = RosterService::from_config(&config).expect("roster");

        let err = roster.teams().expect_err("empty directory has no teams");
        assert!(matches!(err, RosterError::Ingest(IngestError::NoSources)));
        assert!(roster.dataset().is_err());
    }
}
