use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::server::api::{self, ApiError, CsvDownload, PlayerParams, SearchParams};
use crate::server::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/sources", get(sources))
        .route("/api/teams", get(teams))
        .route("/api/search", get(search))
        .route("/api/search.csv", get(search_csv))
        .route("/api/players", get(players))
        .route("/api/players/history.csv", get(player_history_csv))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Response {
    match api::health_payload() {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "error", &err.to_string()),
    }
}

async fn sources(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let body = off_runtime(move || api::sources_payload(&state)).await?;
    Ok(json_response(StatusCode::OK, body))
}

async fn teams(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let body = off_runtime(move || api::teams_payload(&state)).await?;
    Ok(json_response(StatusCode::OK, body))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let body = off_runtime(move || api::search_payload(&state, &params)).await?;
    Ok(json_response(StatusCode::OK, body))
}

async fn search_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let download = off_runtime(move || api::search_csv(&state, &params)).await?;
    Ok(csv_response(download))
}

async fn players(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlayerParams>,
) -> Result<Response, ApiError> {
    let body = off_runtime(move || api::players_payload(&state, &params)).await?;
    Ok(json_response(StatusCode::OK, body))
}

async fn player_history_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlayerParams>,
) -> Result<Response, ApiError> {
    let download = off_runtime(move || api::player_history_csv(&state, &params)).await?;
    Ok(csv_response(download))
}

/// Roster calls stat files and may rebuild the dataset, so they run on the blocking pool.
async fn off_runtime<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "error", "Route not found")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        error_response(status, self.status_label(), &self.to_string())
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn error_response(status: StatusCode, label: &str, message: &str) -> Response {
    let body = serde_json::json!({ "status": label, "message": message });
    let body = serde_json::to_string_pretty(&body)
        .unwrap_or_else(|_| "{\"status\":\"error\"}".to_string());
    json_response(status, body)
}

fn csv_response(download: CsvDownload) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        ascii_file_name(&download.file_name)
    );
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response()
}

/// Header values must be visible ASCII; anything else (accents, quotes) becomes '_'.
fn ascii_file_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_graphic() && ch != '"' && ch != '\\' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
