//! Identity resolution against the operational store.
//!
//! Resolution against the platform's student listing lives in
//! [`sagepilot_core::identity::find_student_by_phone`]; this module owns
//! the store-backed lookups.

use sagepilot_core::identity::{
    self, Identity, RELATION_STUDENT, RELATION_TEACHER, Role, STATUS_ACCEPTED,
};
use sagepilot_core::schedule::page_offset;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::error::AppError;

/// Page size for the store-backed student search.
const STUDENT_PAGE_SIZE: i64 = 5;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: Option<String>,
    phone_number: Option<String>,
    email: Option<String>,
    status: String,
    institute_id: Option<String>,
}

/// A student row projected for the by-phone search response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentAccount {
    pub student_id: String,
    pub name: Option<String>,
    pub phone_number: String,
    pub email: Option<String>,
    pub country_code: Option<String>,
    pub institute_id: Option<String>,
    pub status: String,
}

fn project_student(row: UserRow) -> StudentAccount {
    let phone_number = row.phone_number.unwrap_or_default();
    let country_code = identity::country_code(&phone_number);
    StudentAccount {
        student_id: row.id,
        name: row.name,
        phone_number,
        email: row.email,
        country_code,
        institute_id: row.institute_id,
        status: row.status,
    }
}

/// Resolve a teacher from a phone number.
///
/// Candidates must already satisfy `relation = TEACHER` and
/// `status = ACCEPTED`; a record failing either predicate is simply not
/// found, never "found but inactive". One store query fetches the
/// candidate set and the whitespace-insensitive match runs over it here,
/// mirroring how the platform-backed student resolution scans its listing.
pub async fn resolve_teacher_by_phone(db: &PgPool, phone: &str) -> Result<Identity, AppError> {
    let candidates = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, phone_number, email, status, institute_id
        FROM users
        WHERE relation = $1 AND status = $2
        "#,
    )
    .bind(RELATION_TEACHER)
    .bind(STATUS_ACCEPTED)
    .fetch_all(db)
    .await?;

    candidates
        .into_iter()
        .find(|row| {
            row.phone_number
                .as_deref()
                .is_some_and(|stored| identity::phone_matches(stored, phone))
        })
        .map(|row| Identity {
            id: row.id,
            name: row.name,
            phone_number: row.phone_number,
            role: Role::Teacher,
            status: Some(row.status),
        })
        .ok_or_else(|| AppError::not_found("Teacher not found"))
}

/// Exact-match student lookup in the identity collection, page size 5.
/// Unlike teacher resolution this matches the stored string verbatim;
/// the store mirrors phones exactly as the front end captured them.
pub async fn find_students_by_phone(
    db: &PgPool,
    phone: &str,
    page: i64,
) -> Result<Vec<StudentAccount>, AppError> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, phone_number, email, status, institute_id
        FROM users
        WHERE relation = $1 AND phone_number = $2
        ORDER BY id
        OFFSET $3 LIMIT $4
        "#,
    )
    .bind(RELATION_STUDENT)
    .bind(phone)
    .bind(page_offset(page, STUDENT_PAGE_SIZE))
    .bind(STUDENT_PAGE_SIZE)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(project_student).collect())
}

#[cfg(test)]
mod tests {
    use super::{UserRow, project_student};

    fn row(phone: Option<&str>) -> UserRow {
        UserRow {
            id: "u1".to_string(),
            name: Some("Asha Rao".to_string()),
            phone_number: phone.map(str::to_string),
            email: Some("asha@example.com".to_string()),
            status: "ACCEPTED".to_string(),
            institute_id: Some("inst1".to_string()),
        }
    }

    #[test]
    fn project_student_derives_country_code_from_plus_prefix() {
        let account = project_student(row(Some("+91 98765 43210")));
        assert_eq!(account.student_id, "u1");
        assert_eq!(account.phone_number, "+91 98765 43210");
        assert_eq!(account.country_code.as_deref(), Some("91"));
    }

    #[test]
    fn project_student_defaults_missing_phone_to_empty() {
        let account = project_student(row(None));
        assert_eq!(account.phone_number, "");
        assert_eq!(account.country_code, None);
    }
}
