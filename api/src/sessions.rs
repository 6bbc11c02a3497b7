//! Session queries against the operational store.

use chrono::{DateTime, Utc};
use sagepilot_core::schedule::page_offset;
use sagepilot_core::sessions::{SCOPED_PAGE_SIZE, STATUS_UPCOMING, Session, UNFILTERED_PAGE_SIZE};
use sqlx::PgPool;

use crate::error::AppError;

/// Which sessions a caller is asking about. Upstream identifiers are not
/// uniformly typed, so all three selection modes are first-class.
#[derive(Debug, Clone)]
pub enum SessionFilter {
    User(String),
    Class(String),
    Unfiltered,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    class_id: Option<String>,
    user_id: Option<String>,
    meeting_status: String,
    scheduled_start_time: Option<DateTime<Utc>>,
    meeting_link: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            class_id: row.class_id,
            user_id: row.user_id,
            meeting_status: row.meeting_status,
            scheduled_start_time: row.scheduled_start_time,
            meeting_link: row.meeting_link,
            created_at: row.created_at,
        }
    }
}

const SESSION_COLUMNS: &str =
    "id, class_id, user_id, meeting_status, scheduled_start_time, meeting_link, created_at";

/// Next upcoming sessions for an identity scope, soonest first, capped at
/// [`SCOPED_PAGE_SIZE`]. Upcoming means `meetingStatus = UPCOMING` and a
/// start time at or after `now`; callers capture `now` once per request
/// so one response is internally consistent.
///
/// [`SessionFilter::Unfiltered`] has no meaningful "soonest"; it returns
/// the most recently created sessions instead, paginated at
/// [`UNFILTERED_PAGE_SIZE`].
pub async fn sessions_for(
    db: &PgPool,
    filter: &SessionFilter,
    now: DateTime<Utc>,
    page: i64,
) -> Result<Vec<Session>, AppError> {
    let rows = match filter {
        SessionFilter::User(user_id) => {
            sqlx::query_as::<_, SessionRow>(&format!(
                r#"
                SELECT {SESSION_COLUMNS}
                FROM sessions
                WHERE meeting_status = $1 AND user_id = $2 AND scheduled_start_time >= $3
                ORDER BY scheduled_start_time ASC
                LIMIT $4
                "#
            ))
            .bind(STATUS_UPCOMING)
            .bind(user_id)
            .bind(now)
            .bind(SCOPED_PAGE_SIZE)
            .fetch_all(db)
            .await?
        }
        SessionFilter::Class(class_id) => {
            sqlx::query_as::<_, SessionRow>(&format!(
                r#"
                SELECT {SESSION_COLUMNS}
                FROM sessions
                WHERE meeting_status = $1 AND class_id = $2 AND scheduled_start_time >= $3
                ORDER BY scheduled_start_time ASC
                LIMIT $4
                "#
            ))
            .bind(STATUS_UPCOMING)
            .bind(class_id)
            .bind(now)
            .bind(SCOPED_PAGE_SIZE)
            .fetch_all(db)
            .await?
        }
        SessionFilter::Unfiltered => {
            sqlx::query_as::<_, SessionRow>(&format!(
                r#"
                SELECT {SESSION_COLUMNS}
                FROM sessions
                ORDER BY created_at DESC
                OFFSET $1 LIMIT $2
                "#
            ))
            .bind(page_offset(page, UNFILTERED_PAGE_SIZE))
            .bind(UNFILTERED_PAGE_SIZE)
            .fetch_all(db)
            .await?
        }
    };

    Ok(rows.into_iter().map(Session::from).collect())
}
