//! Local HTTP API over the roster: JSON queries plus CSV downloads.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{AppConfig, LimitRange};
use crate::roster::{RosterError, RosterService, SourcesReport};

pub mod api;
pub mod routes;

/// Shared by every handler for the process lifetime; holds the dataset and query caches.
#[derive(Debug)]
pub struct AppState {
    pub roster: RosterService,
    pub limits: LimitRange,
}

impl AppState {
    pub fn new(roster: RosterService, limits: LimitRange) -> Arc<Self> {
        Arc::new(Self { roster, limits })
    }
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("cannot start without data: {0}")]
    Roster(#[from] RosterError),
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load the roster once (refusing to start if ingestion fails), then serve until shutdown.
pub async fn run_server(config: AppConfig) -> Result<(), ServeError> {
    let roster = RosterService::from_config(&config)?;
    match roster.preload()? {
        SourcesReport::Archives {
            records, sources, ..
        } => tracing::info!(records, sources = sources.len(), "roster loaded from archives"),
        SourcesReport::Sqlite { table, records } => {
            tracing::info!(records, %table, "roster loaded from sqlite")
        }
    }

    let state = AppState::new(roster, config.limits);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("bid roster server listening on http://{}", config.bind_addr);
    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
