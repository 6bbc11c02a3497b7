use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sagepilot_core::error::ApiError;

use crate::error::AppError;
use crate::state::AppState;
use crate::wise::AvailabilitySlot;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/availability", get(teacher_availability))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(rename = "teacherId", default)]
    pub teacher_id: Option<String>,
    #[serde(rename = "startTime", default)]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub teacher_id: String,
    pub available_slots: Vec<AvailabilitySlot>,
}

/// A teacher's availability window, proxied from the platform and trimmed
/// to the first five slots.
#[utoipa::path(
    get,
    path = "/api/availability",
    responses(
        (status = 200, description = "Available slots", body = AvailabilityResponse),
        (status = 400, description = "Required query params missing", body = ApiError),
        (status = 500, description = "Platform failure", body = ApiError)
    ),
    tag = "availability"
)]
pub async fn teacher_availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let (Some(teacher_id), Some(start_time), Some(end_time)) =
        (params.teacher_id, params.start_time, params.end_time)
    else {
        return Err(AppError::validation(
            "teacherId, startTime and endTime are required",
        ));
    };

    let available_slots = state
        .wise
        .teacher_availability(&teacher_id, &start_time, &end_time)
        .await
        .map_err(|err| AppError::upstream("Failed to fetch availability", err))?;

    Ok(Json(AvailabilityResponse {
        teacher_id,
        available_slots,
    }))
}
