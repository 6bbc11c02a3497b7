use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use sagepilot_core::error::ApiError;
use sagepilot_core::schedule::page_number;

use crate::error::AppError;
use crate::identity::{StudentAccount, find_students_by_phone};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/students/by-phone", post(students_by_phone))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StudentsByPhoneRequest {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub page: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentsByPhoneResponse {
    pub success: bool,
    pub count: usize,
    pub students: Vec<StudentAccount>,
}

/// Student lookup in the operational identity collection.
///
/// The match is exact on the stored string; the store mirrors phone
/// numbers verbatim, so the caller must send the same formatting.
#[utoipa::path(
    post,
    path = "/api/students/by-phone",
    request_body = StudentsByPhoneRequest,
    responses(
        (status = 200, description = "Matching students (possibly none)", body = StudentsByPhoneResponse),
        (status = 400, description = "phone missing", body = ApiError),
        (status = 500, description = "Store failure", body = ApiError)
    ),
    tag = "students"
)]
pub async fn students_by_phone(
    State(state): State<AppState>,
    Json(req): Json<StudentsByPhoneRequest>,
) -> Result<Json<StudentsByPhoneResponse>, AppError> {
    let phone = req
        .phone
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation("phone is required"))?;

    let page = page_number(req.page.as_ref());
    let students = find_students_by_phone(&state.db, phone, page).await?;

    Ok(Json(StudentsByPhoneResponse {
        success: true,
        count: students.len(),
        students,
    }))
}
