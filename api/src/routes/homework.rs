use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sagepilot_core::content::TestLink;
use sagepilot_core::error::ApiError;
use sagepilot_core::identity::find_student_by_phone;

use crate::error::AppError;
use crate::fanout::discover_active_tests;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/homework/by-phone", post(homework_by_phone))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HomeworkByPhoneRequest {
    #[serde(default)]
    pub phone: Option<String>,
}

/// The resolved student echoed back with the discovered tests.
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentSummary {
    pub id: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeworkByPhoneResponse {
    pub success: bool,
    pub student: StudentSummary,
    pub count: usize,
    pub tests: Vec<TestLink>,
}

/// Resolve a student against the platform listing, then fan out across
/// their classes for currently-active tests, newest first. A class whose
/// fetch fails is skipped, not fatal.
#[utoipa::path(
    post,
    path = "/api/homework/by-phone",
    request_body = HomeworkByPhoneRequest,
    responses(
        (status = 200, description = "Active tests across the student's classes", body = HomeworkByPhoneResponse),
        (status = 400, description = "phone missing", body = ApiError),
        (status = 404, description = "No student with that phone", body = ApiError),
        (status = 500, description = "Platform failure on the student listing", body = ApiError)
    ),
    tag = "homework"
)]
pub async fn homework_by_phone(
    State(state): State<AppState>,
    Json(req): Json<HomeworkByPhoneRequest>,
) -> Result<Json<HomeworkByPhoneResponse>, AppError> {
    let phone = req
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation("phone is required"))?;

    let students = state
        .wise
        .list_students()
        .await
        .map_err(|err| AppError::upstream("Failed to fetch students from the platform", err))?;

    let Some(student) = find_student_by_phone(&students, phone) else {
        return Err(AppError::not_found("Student not found"));
    };

    let tests = discover_active_tests(&state.wise, &student.classes).await;

    Ok(Json(HomeworkByPhoneResponse {
        success: true,
        student: StudentSummary {
            id: student.id.clone(),
            name: student.name().map(str::to_string),
            phone: student.phone_number().map(str::to_string),
        },
        count: tests.len(),
        tests,
    }))
}
