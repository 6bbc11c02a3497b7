use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sagepilot_core::error::ApiError;

use crate::airtable::AirtableRecord;
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/airtable-students/search", post(search_students))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AirtableSearchRequest {
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AirtableSearchResponse {
    pub success: bool,
    pub count: usize,
    pub students: Vec<AirtableRecord>,
}

/// Search the sheet provider directly for records matching a contact
/// number exactly. Unlike the store-backed search this sees the live
/// sheet, including rows the mirror has not picked up yet.
#[utoipa::path(
    post,
    path = "/api/airtable-students/search",
    request_body = AirtableSearchRequest,
    responses(
        (status = 200, description = "Matching sheet records (possibly none)", body = AirtableSearchResponse),
        (status = 400, description = "phone missing", body = ApiError),
        (status = 500, description = "Sheet provider failure", body = ApiError)
    ),
    tag = "students"
)]
pub async fn search_students(
    State(state): State<AppState>,
    Json(req): Json<AirtableSearchRequest>,
) -> Result<Json<AirtableSearchResponse>, AppError> {
    let phone = req
        .phone
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation("phone is required"))?;

    let students = state
        .airtable
        .search_by_phone(phone)
        .await
        .map_err(|err| AppError::upstream("Failed to search the sheet", err))?;

    Ok(Json(AirtableSearchResponse {
        success: true,
        count: students.len(),
        students,
    }))
}
