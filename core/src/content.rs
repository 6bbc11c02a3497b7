//! Active-test extraction from platform content timelines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::identity::ClassRef;

pub const ENTITY_TYPE_TEST: &str = "test";
pub const ENTITY_STATUS_ACTIVE: &str = "ACTIVE";

/// One section of a class content timeline, as returned by the platform.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineSection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub entities: Vec<TimelineEntity>,
}

/// A content entity inside a timeline section. Only `entityType == "test"`
/// entities in `ACTIVE` status are of interest here; everything else
/// (videos, notes, live classes) passes through unharvested.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineEntity {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "entityType", default)]
    pub entity_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(rename = "maxMarks", default)]
    pub max_marks: Option<i64>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A discovered test with its derived access link.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestLink {
    pub test_id: String,
    pub class_id: String,
    pub test_name: Option<String>,
    pub subject: Option<String>,
    pub class_name: Option<String>,
    pub duration: Option<i64>,
    pub max_marks: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub test_link: String,
}

/// Last 8 characters of a class id; shorter ids pass through whole.
pub fn class_link_suffix(class_id: &str) -> &str {
    match class_id.char_indices().rev().nth(7) {
        Some((idx, _)) => &class_id[idx..],
        None => class_id,
    }
}

/// Derive the access link for a test.
///
/// The format (base prefix, test id, class-id suffix, concatenated with
/// no separator) is a contract with the platform's link-resolution front
/// end and must not change.
pub fn test_access_link(base: &str, test_id: &str, class_id: &str) -> String {
    format!("{base}{test_id}{}", class_link_suffix(class_id))
}

/// Walk one class's timeline and collect its currently-active tests.
pub fn extract_active_tests(
    link_base: &str,
    class: &ClassRef,
    timeline: &[TimelineSection],
) -> Vec<TestLink> {
    let mut tests = Vec::new();
    for section in timeline {
        for entity in &section.entities {
            if entity.entity_type != ENTITY_TYPE_TEST || entity.status != ENTITY_STATUS_ACTIVE {
                continue;
            }
            tests.push(TestLink {
                test_id: entity.id.clone(),
                class_id: class.id.clone(),
                test_name: entity.name.clone(),
                subject: class.subject.clone(),
                class_name: class.name.clone(),
                duration: entity.duration,
                max_marks: entity.max_marks,
                created_at: entity.created_at,
                test_link: test_access_link(link_base, &entity.id, &class.id),
            });
        }
    }
    tests
}

/// Merge per-class results (in class discovery order) into one list,
/// newest first. The sort is stable, so entities sharing a timestamp keep
/// their relative discovery order; entities without a timestamp sink to
/// the end.
pub fn merge_newest_first(per_class: Vec<Vec<TestLink>>) -> Vec<TestLink> {
    let mut merged: Vec<TestLink> = per_class.into_iter().flatten().collect();
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::{
        TestLink, TimelineSection, class_link_suffix, extract_active_tests, merge_newest_first,
        test_access_link,
    };
    use crate::identity::ClassRef;

    const LINK_BASE: &str = "https://supersheldon.wise.live/tests/";

    fn maths_class() -> ClassRef {
        ClassRef {
            id: "64f1c2aabcdefgh1234".to_string(),
            name: Some("Grade 8 Maths".to_string()),
            subject: Some("Maths".to_string()),
        }
    }

    fn timeline_fixture() -> Vec<TimelineSection> {
        serde_json::from_value(json!([
            {
                "name": "Algebra",
                "entities": [
                    {
                        "_id": "T123",
                        "entityType": "test",
                        "status": "ACTIVE",
                        "name": "Linear equations",
                        "duration": 30,
                        "maxMarks": 20,
                        "createdAt": "2026-03-01T10:00:00Z"
                    },
                    {
                        "_id": "T124",
                        "entityType": "test",
                        "status": "DRAFT",
                        "name": "Unpublished quiz"
                    },
                    {
                        "_id": "V9",
                        "entityType": "video",
                        "status": "ACTIVE",
                        "name": "Lecture recording"
                    }
                ]
            },
            { "name": "Empty section" }
        ]))
        .expect("timeline fixture should deserialize")
    }

    #[test]
    fn class_link_suffix_takes_last_eight_chars() {
        assert_eq!(class_link_suffix("abcdefgh1234"), "efgh1234");
        assert_eq!(class_link_suffix("1234"), "1234");
        assert_eq!(class_link_suffix(""), "");
    }

    #[test]
    fn test_access_link_concatenates_without_separator() {
        assert_eq!(
            test_access_link(LINK_BASE, "T123", "abcdefgh1234"),
            "https://supersheldon.wise.live/tests/T123efgh1234"
        );
    }

    #[test]
    fn extract_active_tests_keeps_only_active_test_entities() {
        let class = maths_class();
        let tests = extract_active_tests(LINK_BASE, &class, &timeline_fixture());

        assert_eq!(tests.len(), 1);
        let test = &tests[0];
        assert_eq!(test.test_id, "T123");
        assert_eq!(test.test_name.as_deref(), Some("Linear equations"));
        assert_eq!(test.subject.as_deref(), Some("Maths"));
        assert_eq!(test.class_name.as_deref(), Some("Grade 8 Maths"));
        assert_eq!(test.duration, Some(30));
        assert_eq!(test.max_marks, Some(20));
        assert_eq!(
            test.test_link,
            format!("{LINK_BASE}T123{}", class_link_suffix(&class.id))
        );
    }

    fn link_at(test_id: &str, class_id: &str, hour: Option<u32>) -> TestLink {
        TestLink {
            test_id: test_id.to_string(),
            class_id: class_id.to_string(),
            test_name: None,
            subject: None,
            class_name: None,
            duration: None,
            max_marks: None,
            created_at: hour.map(|h| Utc.with_ymd_and_hms(2026, 3, 1, h, 0, 0).unwrap()),
            test_link: test_access_link(LINK_BASE, test_id, class_id),
        }
    }

    #[test]
    fn merge_newest_first_sorts_descending_across_classes() {
        let merged = merge_newest_first(vec![
            vec![link_at("T1", "class-a-1", Some(9))],
            vec![link_at("T2", "class-b-1", Some(11)), link_at("T3", "class-b-1", Some(10))],
        ]);
        let order: Vec<&str> = merged.iter().map(|t| t.test_id.as_str()).collect();
        assert_eq!(order, ["T2", "T3", "T1"]);
    }

    #[test]
    fn merge_newest_first_breaks_ties_by_discovery_order() {
        let merged = merge_newest_first(vec![
            vec![link_at("T1", "class-a-1", Some(9))],
            vec![link_at("T2", "class-b-1", Some(9))],
            vec![link_at("T4", "class-c-1", None)],
        ]);
        let order: Vec<&str> = merged.iter().map(|t| t.test_id.as_str()).collect();
        assert_eq!(order, ["T1", "T2", "T4"]);
    }
}
