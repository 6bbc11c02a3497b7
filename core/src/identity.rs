use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Relation value a store record must carry to resolve as a teacher.
pub const RELATION_TEACHER: &str = "TEACHER";
/// Relation value for student records in the identity collection.
pub const RELATION_STUDENT: &str = "STUDENT";
/// Status an identity record must carry to be eligible for resolution.
pub const STATUS_ACCEPTED: &str = "ACCEPTED";

/// A resolved teacher or student. Read-only view of a store record;
/// this service never writes identities back.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub role: Role,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Teacher,
    Student,
}

/// Strip every whitespace character from a phone number.
///
/// This is the whole normalization contract: country-code prefixes,
/// leading zeros and punctuation are left untouched.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Whitespace-insensitive exact phone comparison.
pub fn phone_matches(stored: &str, input: &str) -> bool {
    normalize_phone(stored) == normalize_phone(input)
}

/// Derive a two-digit country code from a stored phone number.
///
/// Only numbers with an explicit `+` prefix carry one; everything else
/// yields `None`.
pub fn country_code(phone: &str) -> Option<String> {
    if !phone.starts_with('+') {
        return None;
    }
    let digits: String = phone.chars().filter(char::is_ascii_digit).take(2).collect();
    if digits.is_empty() { None } else { Some(digits) }
}

/// A student as listed by the platform's institute-wide student endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WiseStudent {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "userId", default)]
    pub user: Option<WiseUser>,
    #[serde(default)]
    pub classes: Vec<ClassRef>,
    #[serde(default)]
    pub status: Option<String>,
}

impl WiseStudent {
    pub fn name(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.name.as_deref())
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.phone_number.as_deref())
    }
}

/// The nested user document the platform embeds in each student.
#[derive(Debug, Clone, Deserialize)]
pub struct WiseUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One class a student is enrolled in, per the platform listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

/// Scan a platform student listing for a whitespace-insensitive exact
/// phone match. The listing is fetched once per resolution attempt; this
/// scan is the only matching step.
pub fn find_student_by_phone<'a>(
    students: &'a [WiseStudent],
    phone: &str,
) -> Option<&'a WiseStudent> {
    let wanted = normalize_phone(phone);
    students
        .iter()
        .find(|s| s.phone_number().is_some_and(|p| normalize_phone(p) == wanted))
}

#[cfg(test)]
mod tests {
    use super::{country_code, find_student_by_phone, normalize_phone, phone_matches};
    use super::{WiseStudent, WiseUser};

    fn student(id: &str, phone: Option<&str>) -> WiseStudent {
        WiseStudent {
            id: id.to_string(),
            user: Some(WiseUser {
                name: Some("Asha".to_string()),
                phone_number: phone.map(str::to_string),
                email: None,
            }),
            classes: Vec::new(),
            status: Some("ACCEPTED".to_string()),
        }
    }

    #[test]
    fn normalize_phone_strips_all_whitespace_and_nothing_else() {
        assert_eq!(normalize_phone("+1 555 0100"), "+15550100");
        assert_eq!(normalize_phone(" +44\t20 7946\u{a0}0958 "), "+442079460958");
        assert_eq!(normalize_phone("+1-555-0100"), "+1-555-0100");
    }

    #[test]
    fn phone_matches_is_whitespace_insensitive_exact_equality() {
        assert!(phone_matches("+1 555 0100", "+15550100"));
        assert!(!phone_matches("+1 555 0101", "+1 555 0102"));
        // No country-code reconciliation: these are different strings.
        assert!(!phone_matches("015550100", "+15550100"));
    }

    #[test]
    fn country_code_requires_plus_prefix() {
        assert_eq!(country_code("+91 98765 43210"), Some("91".to_string()));
        assert_eq!(country_code("+1 555 0100"), Some("15".to_string()));
        assert_eq!(country_code("9876543210"), None);
        assert_eq!(country_code("+"), None);
    }

    #[test]
    fn find_student_by_phone_matches_stripped_forms() {
        let students = vec![
            student("s1", Some("+1 555 0101")),
            student("s2", Some("+1 555 0100")),
        ];
        let found = find_student_by_phone(&students, "+15550100")
            .expect("stored phone with spaces should match stripped input");
        assert_eq!(found.id, "s2");
    }

    #[test]
    fn find_student_by_phone_misses_on_different_numbers() {
        let students = vec![student("s1", Some("+1 555 0101")), student("s2", None)];
        assert!(find_student_by_phone(&students, "+1 555 0102").is_none());
    }
}
