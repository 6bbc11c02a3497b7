//! Sheet-row normalization.
//!
//! The sheet-backed scheduling collections carry free-form, human-readable
//! column labels that gain and lose columns over time. Each backing
//! collection gets an explicit, versioned mapping table from label to
//! output field; lookups are literal, case-sensitive, exact. Every output
//! field is present on every normalized row: an absent column maps to
//! JSON `null`, never to a missing key, so callers see one stable shape
//! regardless of which columns a given row happened to have.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;

/// One output field and the sheet labels that feed it, in preference
/// order: the first label present on the row wins.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub output: &'static str,
    pub labels: &'static [&'static str],
}

/// A versioned mapping profile tied to one backing collection.
#[derive(Debug, Clone, Copy)]
pub struct SheetProfile {
    pub name: &'static str,
    pub collection: &'static str,
    pub version: u32,
    pub fields: &'static [FieldMapping],
}

/// Minimal projection backing the raw-id and unfiltered schedule lists.
pub const DEMO_SCHEDULED: SheetProfile = SheetProfile {
    name: "demo_scheduled",
    collection: "demo_scheduled",
    version: 1,
    fields: &[
        FieldMapping { output: "auto_id", labels: &["Auto ID"] },
        FieldMapping { output: "student_name", labels: &["Student Name (from Student ID)"] },
        FieldMapping { output: "teacher_name", labels: &["Demo Teacher Name"] },
        FieldMapping { output: "meeting_link", labels: &["Meeting link"] },
    ],
};

/// Full projection backing the phone-resolved schedule list.
///
/// `meeting_link` prefers the `"New link"` column over `"Link"` when a row
/// carries both; the original `"Link"` column stays visible as `link`.
pub const MEETING_LINKS: SheetProfile = SheetProfile {
    name: "meeting_links",
    collection: "meeting_links",
    version: 2,
    fields: &[
        // Student group
        FieldMapping { output: "auto_id", labels: &["Auto ID"] },
        FieldMapping { output: "student_id", labels: &["Student ID"] },
        FieldMapping { output: "student_name", labels: &["Student Name (from Student ID)"] },
        FieldMapping { output: "student_contact", labels: &["Student Contact Number (from Student ID)"] },
        FieldMapping { output: "student_email", labels: &["Student Email (from Student ID)"] },
        FieldMapping { output: "grade", labels: &["Grade (from Student ID)"] },
        FieldMapping { output: "curriculum", labels: &["Curriculum (from Student ID)"] },
        FieldMapping { output: "subject", labels: &["Subject"] },
        // Guardian group
        FieldMapping { output: "parent_name", labels: &["Parent Name"] },
        FieldMapping { output: "parent_contact", labels: &["Parent Contact Number"] },
        FieldMapping { output: "parent_email", labels: &["Parent Email"] },
        // Teacher group
        FieldMapping { output: "teacher_id", labels: &["Demo Teacher ID"] },
        FieldMapping { output: "teacher_name", labels: &["Demo Teacher Name"] },
        FieldMapping { output: "teacher_contact", labels: &["Demo Teacher Contact"] },
        // Demo group
        FieldMapping { output: "demo_date", labels: &["Demo Date"] },
        FieldMapping { output: "demo_time", labels: &["Demo Time (IST)"] },
        FieldMapping { output: "time_zone", labels: &["Time Zone"] },
        FieldMapping { output: "meeting_link", labels: &["New link", "Link"] },
        FieldMapping { output: "link", labels: &["Link"] },
        FieldMapping { output: "demo_status", labels: &["Demo Status"] },
        FieldMapping { output: "reschedule_date", labels: &["Reschedule Date"] },
        // Status group
        FieldMapping { output: "status", labels: &["Status"] },
        FieldMapping { output: "payment_status", labels: &["Payment Status"] },
        FieldMapping { output: "follow_up_date", labels: &["Follow-up Date"] },
        // Communication log group
        FieldMapping { output: "comments", labels: &["Comments"] },
        FieldMapping { output: "last_contacted", labels: &["Last Contacted"] },
        FieldMapping { output: "call_status", labels: &["Call Status"] },
        FieldMapping { output: "whatsapp_sent", labels: &["WhatsApp Sent"] },
        FieldMapping { output: "email_sent", labels: &["Email Sent"] },
    ],
};

/// Output keys the envelope reserves on every normalized row.
const ENVELOPE_KEYS: &[&str] = &["id", "airtable_id", "created_time"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile {profile} v{version}: duplicate output field `{field}`")]
    DuplicateOutput {
        profile: &'static str,
        version: u32,
        field: &'static str,
    },
    #[error("profile {profile} v{version}: output field `{field}` has no source labels")]
    EmptyLabels {
        profile: &'static str,
        version: u32,
        field: &'static str,
    },
}

/// A raw sheet row as read from the store: arbitrary labeled fields plus
/// the envelope columns every mirrored collection shares.
#[derive(Debug, Clone)]
pub struct SheetRowRaw {
    pub id: String,
    pub airtable_id: Option<String>,
    pub created_time: Option<DateTime<Utc>>,
    pub fields: Value,
}

/// The stable projection of one sheet row. Key set is fixed by the
/// profile that produced it.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct ScheduledRecord(pub Map<String, Value>);

impl SheetProfile {
    /// Check the mapping table for duplicated outputs, label-less fields,
    /// and collisions with the envelope keys. Runs at startup so mapping
    /// drift fails the deploy instead of nulling fields silently.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut seen: Vec<&str> = ENVELOPE_KEYS.to_vec();
        for field in self.fields {
            if field.labels.is_empty() {
                return Err(ProfileError::EmptyLabels {
                    profile: self.name,
                    version: self.version,
                    field: field.output,
                });
            }
            if seen.contains(&field.output) {
                return Err(ProfileError::DuplicateOutput {
                    profile: self.name,
                    version: self.version,
                    field: field.output,
                });
            }
            seen.push(field.output);
        }
        Ok(())
    }

    /// Project a raw row into the profile's fixed shape.
    pub fn normalize(&self, row: &SheetRowRaw) -> ScheduledRecord {
        let mut out = Map::new();
        out.insert("id".to_string(), Value::String(row.id.clone()));
        out.insert(
            "airtable_id".to_string(),
            row.airtable_id.clone().map_or(Value::Null, Value::String),
        );
        out.insert(
            "created_time".to_string(),
            row.created_time
                .map_or(Value::Null, |t| Value::String(t.to_rfc3339())),
        );

        let labeled = row.fields.as_object();
        for field in self.fields {
            let value = labeled
                .and_then(|fields| {
                    field
                        .labels
                        .iter()
                        .find_map(|label| fields.get(*label))
                })
                .cloned()
                .unwrap_or(Value::Null);
            out.insert(field.output.to_string(), value);
        }

        ScheduledRecord(out)
    }
}

/// Parse a caller-supplied page parameter. Callers send it as a JSON
/// number or a string; anything missing, non-numeric, or below 1 means
/// page 1.
pub fn page_number(raw: Option<&Value>) -> i64 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.filter(|p| *p >= 1).unwrap_or(1)
}

/// Same defaulting contract for a query-string page parameter.
pub fn page_number_str(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

/// Classic offset pagination: pages are 1-based.
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    (page - 1) * page_size
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};

    use super::{
        DEMO_SCHEDULED, MEETING_LINKS, SheetProfile, SheetRowRaw, page_number, page_number_str,
        page_offset,
    };

    fn row(fields: Value) -> SheetRowRaw {
        SheetRowRaw {
            id: "rec1".to_string(),
            airtable_id: Some("recAirtable1".to_string()),
            created_time: Some(Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()),
            fields,
        }
    }

    #[test]
    fn builtin_profiles_validate() {
        DEMO_SCHEDULED.validate().expect("demo_scheduled profile");
        MEETING_LINKS.validate().expect("meeting_links profile");
    }

    #[test]
    fn validate_rejects_duplicate_outputs() {
        use super::FieldMapping;
        const BROKEN: SheetProfile = SheetProfile {
            name: "broken",
            collection: "broken",
            version: 1,
            fields: &[
                FieldMapping { output: "student_name", labels: &["Student Name"] },
                FieldMapping { output: "student_name", labels: &["Name"] },
            ],
        };
        BROKEN
            .validate()
            .expect_err("duplicate output field must fail validation");
    }

    #[test]
    fn normalize_keeps_key_set_identical_across_rows() {
        let full = DEMO_SCHEDULED.normalize(&row(json!({
            "Auto ID": 42,
            "Student Name (from Student ID)": "Asha Rao",
            "Demo Teacher Name": "Mr. Iyer",
            "Meeting link": "https://meet.example/abc",
        })));
        let sparse = DEMO_SCHEDULED.normalize(&row(json!({})));

        let full_keys: Vec<&String> = full.0.keys().collect();
        let sparse_keys: Vec<&String> = sparse.0.keys().collect();
        assert_eq!(full_keys, sparse_keys);
        assert_eq!(sparse.0["student_name"], Value::Null);
        assert_eq!(full.0["student_name"], json!("Asha Rao"));
    }

    #[test]
    fn normalize_is_case_sensitive_about_labels() {
        let record = DEMO_SCHEDULED.normalize(&row(json!({
            "meeting link": "https://meet.example/lowercase",
        })));
        assert_eq!(record.0["meeting_link"], Value::Null);
    }

    #[test]
    fn meeting_links_prefers_new_link_but_exposes_original() {
        let record = MEETING_LINKS.normalize(&row(json!({
            "New link": "https://meet.example/new",
            "Link": "https://meet.example/old",
        })));
        assert_eq!(record.0["meeting_link"], json!("https://meet.example/new"));
        assert_eq!(record.0["link"], json!("https://meet.example/old"));

        let only_old = MEETING_LINKS.normalize(&row(json!({
            "Link": "https://meet.example/old",
        })));
        assert_eq!(only_old.0["meeting_link"], json!("https://meet.example/old"));
    }

    #[test]
    fn normalize_tolerates_non_object_fields_payload() {
        let record = DEMO_SCHEDULED.normalize(&row(Value::Null));
        assert_eq!(record.0["meeting_link"], Value::Null);
        assert_eq!(record.0["id"], json!("rec1"));
    }

    #[test]
    fn page_number_defaults_to_one() {
        assert_eq!(page_number(None), 1);
        assert_eq!(page_number(Some(&json!("banana"))), 1);
        assert_eq!(page_number(Some(&json!(0))), 1);
        assert_eq!(page_number(Some(&json!(-3))), 1);
        assert_eq!(page_number(Some(&json!(null))), 1);
    }

    #[test]
    fn page_number_accepts_numbers_and_numeric_strings() {
        assert_eq!(page_number(Some(&json!(4))), 4);
        assert_eq!(page_number(Some(&json!("2"))), 2);
        assert_eq!(page_number(Some(&json!(" 3 "))), 3);
    }

    #[test]
    fn page_number_str_mirrors_the_defaulting_rules() {
        assert_eq!(page_number_str(None), 1);
        assert_eq!(page_number_str(Some("2")), 2);
        assert_eq!(page_number_str(Some("zero")), 1);
        assert_eq!(page_number_str(Some("-1")), 1);
    }

    #[test]
    fn page_offset_is_one_based() {
        assert_eq!(page_offset(1, 5), 0);
        assert_eq!(page_offset(3, 5), 10);
        assert_eq!(page_offset(2, 20), 20);
    }
}
