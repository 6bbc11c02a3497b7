//! The unified "what's scheduled next" listings: upcoming sessions from
//! the store plus a page of normalized sheet rows, in three variants
//! (raw identifier, phone-resolved teacher, unfiltered).

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use sagepilot_core::error::ApiError;
use sagepilot_core::identity::Identity;
use sagepilot_core::schedule::{
    DEMO_SCHEDULED, MEETING_LINKS, ScheduledRecord, page_number, page_number_str,
};
use sagepilot_core::sessions::{Session, UNFILTERED_PAGE_SIZE};

use crate::error::AppError;
use crate::identity::resolve_teacher_by_phone;
use crate::schedule::{SCOPED_SHEET_PAGE_SIZE, UNFILTERED_SHEET_PAGE_SIZE, scheduled_records};
use crate::sessions::{SessionFilter, sessions_for};
use crate::state::{AppState, ScheduleIdMode};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/all-schedules", get(schedules_by_id))
        .route("/api/all-schedules/by-phone", post(schedules_by_phone))
        .route("/api/all-schedules/all", get(all_schedules))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleCounts {
    pub sessions: usize,
    pub demo_scheduled: usize,
}

/// The resolved teacher echoed back on the phone-resolved variant.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub id: String,
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

impl From<Identity> for TeacherSummary {
    fn from(identity: Identity) -> Self {
        TeacherSummary {
            id: identity.id,
            name: identity.name,
            phone_number: identity.phone_number,
        }
    }
}

fn empty_sessions_note(sessions: &[Session]) -> Option<String> {
    sessions
        .is_empty()
        .then(|| "No upcoming sessions in the window".to_string())
}

#[derive(Debug, Deserialize)]
pub struct SchedulesByIdQuery {
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SchedulesByIdResponse {
    pub success: bool,
    pub teacher_id: String,
    /// Present only when the session window came back empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub counts: ScheduleCounts,
    pub sessions: Vec<Session>,
    pub demo_scheduled: Vec<ScheduledRecord>,
}

/// Sessions plus sheet rows for a raw teacher/user identifier.
///
/// Whether `teacher_id` selects sessions by user id or by class id is
/// deployment configuration (`SAGEPILOT_SCHEDULE_ID_MODE`); front ends
/// have historically sent both.
#[utoipa::path(
    get,
    path = "/api/all-schedules",
    responses(
        (status = 200, description = "Sessions and sheet rows", body = SchedulesByIdResponse),
        (status = 400, description = "teacher_id missing", body = ApiError),
        (status = 500, description = "Store failure", body = ApiError)
    ),
    tag = "schedules"
)]
pub async fn schedules_by_id(
    State(state): State<AppState>,
    Query(params): Query<SchedulesByIdQuery>,
) -> Result<Json<SchedulesByIdResponse>, AppError> {
    let teacher_id = params
        .teacher_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::validation("teacher_id is required"))?;

    let now = Utc::now();
    let filter = match state.schedule_id_mode {
        ScheduleIdMode::User => SessionFilter::User(teacher_id.clone()),
        ScheduleIdMode::Class => SessionFilter::Class(teacher_id.clone()),
    };
    let sessions = sessions_for(&state.db, &filter, now, 1).await?;

    let page = page_number_str(params.page.as_deref());
    let demo_scheduled =
        scheduled_records(&state.db, &DEMO_SCHEDULED, page, SCOPED_SHEET_PAGE_SIZE).await?;

    Ok(Json(SchedulesByIdResponse {
        success: true,
        teacher_id,
        message: empty_sessions_note(&sessions),
        counts: ScheduleCounts {
            sessions: sessions.len(),
            demo_scheduled: demo_scheduled.len(),
        },
        sessions,
        demo_scheduled,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchedulesByPhoneRequest {
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Callers send this as a JSON number or a string
    #[serde(default)]
    #[schema(value_type = Object)]
    pub page: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SchedulesByPhoneResponse {
    pub success: bool,
    pub teacher: TeacherSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub counts: ScheduleCounts,
    pub sessions: Vec<Session>,
    pub demo_scheduled: Vec<ScheduledRecord>,
}

/// Resolve a teacher by phone, then list their sessions plus the full
/// sheet projection.
#[utoipa::path(
    post,
    path = "/api/all-schedules/by-phone",
    request_body = SchedulesByPhoneRequest,
    responses(
        (status = 200, description = "Sessions and sheet rows for the resolved teacher", body = SchedulesByPhoneResponse),
        (status = 400, description = "phoneNumber missing", body = ApiError),
        (status = 404, description = "No accepted teacher with that phone", body = ApiError),
        (status = 500, description = "Store failure", body = ApiError)
    ),
    tag = "schedules"
)]
pub async fn schedules_by_phone(
    State(state): State<AppState>,
    Json(req): Json<SchedulesByPhoneRequest>,
) -> Result<Json<SchedulesByPhoneResponse>, AppError> {
    let phone = req
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation("phoneNumber is required"))?;

    let teacher = resolve_teacher_by_phone(&state.db, phone).await?;

    let now = Utc::now();
    let sessions = sessions_for(
        &state.db,
        &SessionFilter::User(teacher.id.clone()),
        now,
        1,
    )
    .await?;

    let page = page_number(req.page.as_ref());
    let demo_scheduled =
        scheduled_records(&state.db, &MEETING_LINKS, page, SCOPED_SHEET_PAGE_SIZE).await?;

    Ok(Json(SchedulesByPhoneResponse {
        success: true,
        teacher: TeacherSummary::from(teacher),
        message: empty_sessions_note(&sessions),
        counts: ScheduleCounts {
            sessions: sessions.len(),
            demo_scheduled: demo_scheduled.len(),
        },
        sessions,
        demo_scheduled,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AllSchedulesQuery {
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AllSchedulesResponse {
    pub success: bool,
    pub page: i64,
    pub limit: i64,
    pub counts: ScheduleCounts,
    pub sessions: Vec<Session>,
    pub demo_scheduled: Vec<ScheduledRecord>,
}

/// Everything, no identity: most recently created sessions plus sheet
/// rows, both paginated at 20.
#[utoipa::path(
    get,
    path = "/api/all-schedules/all",
    responses(
        (status = 200, description = "Unfiltered sessions and sheet rows", body = AllSchedulesResponse),
        (status = 500, description = "Store failure", body = ApiError)
    ),
    tag = "schedules"
)]
pub async fn all_schedules(
    State(state): State<AppState>,
    Query(params): Query<AllSchedulesQuery>,
) -> Result<Json<AllSchedulesResponse>, AppError> {
    let page = page_number_str(params.page.as_deref());

    let now = Utc::now();
    let sessions = sessions_for(&state.db, &SessionFilter::Unfiltered, now, page).await?;
    let demo_scheduled =
        scheduled_records(&state.db, &DEMO_SCHEDULED, page, UNFILTERED_SHEET_PAGE_SIZE).await?;

    Ok(Json(AllSchedulesResponse {
        success: true,
        page,
        limit: UNFILTERED_PAGE_SIZE,
        counts: ScheduleCounts {
            sessions: sessions.len(),
            demo_scheduled: demo_scheduled.len(),
        },
        sessions,
        demo_scheduled,
    }))
}
