use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::export_csv::{
    history_file_name, to_semicolon_csv, ExportError, SEARCH_EXPORT_FILE_NAME,
};
use crate::query::{validate_detail_name, PlayerProfile, QueryInputError, RosterRow, ALL_TEAMS};
use crate::roster::{RosterError, SourcesReport};
use crate::server::AppState;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Input(#[from] QueryInputError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to serialize response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no records for player '{0}'")]
    PlayerNotFound(String),
    #[error("request worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// HTTP status for the error. Ingestion problems mean the service has no data, not a bad request.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Input(_) => 400,
            Self::PlayerNotFound(_) => 404,
            Self::Roster(RosterError::Ingest(_)) => 503,
            Self::Roster(_) | Self::Export(_) | Self::Json(_) | Self::Join(_) => 500,
        }
    }

    /// Input problems are operator-correctable warnings rather than faults.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Input(_) => "warning",
            _ => "error",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerParams {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TeamsResponse<'a> {
    pub all_teams: &'static str,
    pub teams: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct SearchResponse<'a> {
    pub count: usize,
    pub limit: usize,
    pub rows: &'a [RosterRow],
}

#[derive(Debug, Serialize)]
pub struct PlayersResponse {
    pub count: usize,
    pub players: Vec<PlayerProfile>,
}

/// File body plus suggested download name.
#[derive(Debug, Clone)]
pub struct CsvDownload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "bid-roster-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn sources_payload(state: &AppState) -> Result<String, ApiError> {
    let report: SourcesReport = state.roster.sources()?;
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn teams_payload(state: &AppState) -> Result<String, ApiError> {
    let teams = state.roster.teams()?;
    Ok(serde_json::to_string_pretty(&TeamsResponse {
        all_teams: ALL_TEAMS,
        teams: &teams,
    })?)
}

pub fn search_payload(state: &AppState, params: &SearchParams) -> Result<String, ApiError> {
    let limit = state.limits.validate(params.limit)?;
    let rows = state.roster.search(
        params.name.as_deref().unwrap_or(""),
        params.team.as_deref(),
        limit,
    )?;
    Ok(serde_json::to_string_pretty(&SearchResponse {
        count: rows.len(),
        limit,
        rows: &rows,
    })?)
}

pub fn search_csv(state: &AppState, params: &SearchParams) -> Result<CsvDownload, ApiError> {
    let limit = state.limits.validate(params.limit)?;
    let rows = state.roster.search(
        params.name.as_deref().unwrap_or(""),
        params.team.as_deref(),
        limit,
    )?;
    Ok(CsvDownload {
        file_name: SEARCH_EXPORT_FILE_NAME.to_string(),
        bytes: to_semicolon_csv(&rows[..])?,
    })
}

pub fn players_payload(state: &AppState, params: &PlayerParams) -> Result<String, ApiError> {
    let name = validate_detail_name(params.name.as_deref().unwrap_or(""))?;
    let players = state.roster.player_profiles(name)?;
    Ok(serde_json::to_string_pretty(&PlayersResponse {
        count: players.len(),
        players,
    })?)
}

/// History export for one exact full name.
pub fn player_history_csv(state: &AppState, params: &PlayerParams) -> Result<CsvDownload, ApiError> {
    let name = validate_detail_name(params.name.as_deref().unwrap_or(""))?;
    let profile = state
        .roster
        .player_profile(name)?
        .ok_or_else(|| ApiError::PlayerNotFound(name.to_string()))?;
    Ok(CsvDownload {
        file_name: history_file_name(&profile.full_name),
        bytes: to_semicolon_csv(&profile.history)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panicked_worker_is_an_internal_error() {
        let join_err = tokio::spawn(async { panic!("worker died") })
            .await
            .expect_err("task should panic");
        let err = ApiError::from(join_err);
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.status_label(), "error");
    }

    #[test]
    fn input_problems_are_warnings() {
        let err = ApiError::from(QueryInputError::EmptyName);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.status_label(), "warning");
    }
}
