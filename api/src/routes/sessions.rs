use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use sagepilot_core::error::ApiError;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/upcoming-sessions", get(upcoming_sessions))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpcomingSessionsResponse {
    pub success: bool,
    pub count: usize,
    /// Platform session documents, passed through unchanged
    #[schema(value_type = Vec<Object>)]
    pub sessions: Vec<Value>,
}

/// The institute's next scheduled sessions, straight from the platform
/// (`status=FUTURE`, first page of 5). No store involvement.
#[utoipa::path(
    get,
    path = "/api/upcoming-sessions",
    responses(
        (status = 200, description = "Next sessions", body = UpcomingSessionsResponse),
        (status = 500, description = "Platform failure", body = ApiError)
    ),
    tag = "sessions"
)]
pub async fn upcoming_sessions(
    State(state): State<AppState>,
) -> Result<Json<UpcomingSessionsResponse>, AppError> {
    let sessions = state
        .wise
        .upcoming_sessions()
        .await
        .map_err(|err| AppError::upstream("Failed to fetch upcoming sessions", err))?;

    Ok(Json(UpcomingSessionsResponse {
        success: true,
        count: sessions.len(),
        sessions,
    }))
}
