use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Meeting status a session must carry to count as upcoming.
pub const STATUS_UPCOMING: &str = "UPCOMING";

/// Page size for identity-scoped session queries.
pub const SCOPED_PAGE_SIZE: i64 = 5;
/// Page size for the unfiltered session listing.
pub const UNFILTERED_PAGE_SIZE: i64 = 20;

/// A scheduled meeting, as mirrored from the operational store.
/// Serialized camelCase to match the upstream session documents.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub class_id: Option<String>,
    pub user_id: Option<String>,
    pub meeting_status: String,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
}
