use sqlx::PgPool;

use crate::airtable::AirtableClient;
use crate::wise::WiseClient;

/// What the raw `teacher_id` parameter on the schedule listing means.
/// Deployments disagree: some front ends send a user id, some a class id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduleIdMode {
    User,
    Class,
}

impl ScheduleIdMode {
    pub fn from_env() -> Self {
        match std::env::var("SAGEPILOT_SCHEDULE_ID_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "class" => Self::Class,
            _ => Self::User,
        }
    }
}

/// Shared read-only handles, built once at startup and injected into every
/// handler. No component reaches for a module-level connection.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub wise: WiseClient,
    pub airtable: AirtableClient,
    pub schedule_id_mode: ScheduleIdMode,
}
