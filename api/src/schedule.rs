//! Paginated reads over the sheet-backed scheduling collections, fed
//! through the profile normalizer.

use chrono::{DateTime, Utc};
use sagepilot_core::schedule::{ScheduledRecord, SheetProfile, SheetRowRaw, page_offset};
use sqlx::PgPool;

use crate::error::AppError;

/// Sheet page size on identity-scoped schedule listings.
pub const SCOPED_SHEET_PAGE_SIZE: i64 = 5;
/// Sheet page size on the unfiltered listing.
pub const UNFILTERED_SHEET_PAGE_SIZE: i64 = 20;

#[derive(sqlx::FromRow)]
struct SheetRowDb {
    id: String,
    airtable_id: Option<String>,
    fields: serde_json::Value,
    created_time: Option<DateTime<Utc>>,
}

impl From<SheetRowDb> for SheetRowRaw {
    fn from(row: SheetRowDb) -> Self {
        SheetRowRaw {
            id: row.id,
            airtable_id: row.airtable_id,
            created_time: row.created_time,
            fields: row.fields,
        }
    }
}

/// One page of a profile's backing collection, newest rows first,
/// normalized into the profile's fixed shape.
pub async fn scheduled_records(
    db: &PgPool,
    profile: &SheetProfile,
    page: i64,
    page_size: i64,
) -> Result<Vec<ScheduledRecord>, AppError> {
    // The collection name comes from a compile-time profile constant,
    // never from the request.
    let sql = format!(
        r#"
        SELECT id, airtable_id, fields, created_time
        FROM {}
        ORDER BY created_time DESC
        OFFSET $1 LIMIT $2
        "#,
        profile.collection
    );

    let rows = sqlx::query_as::<_, SheetRowDb>(&sql)
        .bind(page_offset(page, page_size))
        .bind(page_size)
        .fetch_all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| profile.normalize(&row.into()))
        .collect())
}
