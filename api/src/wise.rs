//! HTTP client for the Wise learning-management platform.
//!
//! Carries the fixed institute credentials and exposes a thin `get` layer
//! returning parsed JSON, plus typed wrappers for the endpoints this
//! service consumes. Built once at startup and injected through
//! [`crate::state::AppState`].

use sagepilot_core::content::TimelineSection;
use sagepilot_core::identity::WiseStudent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use utoipa::ToSchema;

use crate::error::UpstreamError;

const SERVICE: &str = "wise";
const DEFAULT_BASE_URL: &str = "https://api.wiseapp.live";
const DEFAULT_TEST_LINK_BASE: &str = "https://supersheldon.wise.live/tests/";
const USER_AGENT: &str = "SagePilot/1.0";

/// Number of availability slots returned to callers.
const AVAILABILITY_SLOT_LIMIT: usize = 5;

#[derive(Clone)]
pub struct WiseClient {
    http: reqwest::Client,
    base_url: String,
    institute_id: String,
    api_key: String,
    namespace: String,
    auth_header: String,
    test_link_base: String,
}

/// One availability window, passed through from the platform unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailabilitySlot {
    #[serde(rename = "startTime")]
    #[schema(value_type = Object)]
    pub start_time: Option<Value>,
    #[serde(rename = "endTime")]
    #[schema(value_type = Object)]
    pub end_time: Option<Value>,
}

impl WiseClient {
    /// Read credentials and endpoints from the environment. Panics on a
    /// missing credential; the service cannot run without them.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("WISE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Url::parse(&base_url).expect("WISE_BASE_URL must be a valid URL");

        let test_link_base = std::env::var("WISE_TEST_LINK_BASE")
            .unwrap_or_else(|_| DEFAULT_TEST_LINK_BASE.to_string());

        Self {
            http: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("reqwest client must build"),
            base_url,
            institute_id: required_env("WISE_INSTITUTE_ID"),
            api_key: required_env("WISE_API_KEY"),
            namespace: required_env("WISE_NAMESPACE"),
            auth_header: required_env("WISE_AUTH_HEADER"),
            test_link_base,
        }
    }

    /// Prefix for derived test access links.
    pub fn test_link_base(&self) -> &str {
        &self.test_link_base
    }

    /// GET a platform path (with optional query pairs) and parse the body
    /// as JSON. Non-2xx responses become [`UpstreamError::Status`]
    /// carrying the payload verbatim.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, UpstreamError> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let mut request = self
            .http
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("x-api-key", &self.api_key)
            .header("x-wise-namespace", &self.namespace)
            .header("Content-Type", "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|source| UpstreamError::Http {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(UpstreamError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        response.json::<Value>().await.map_err(|source| UpstreamError::Http {
            service: SERVICE,
            source,
        })
    }

    /// Fetch the institute's full ACCEPTED student listing. One batch
    /// call; phone matching happens on the caller's side.
    pub async fn list_students(&self) -> Result<Vec<WiseStudent>, UpstreamError> {
        let path = format!("institutes/{}/students", self.institute_id);
        let body = self.get(&path, &[("status", "ACCEPTED")]).await?;

        let students = body
            .pointer("/data/students")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        serde_json::from_value(students).map_err(|source| UpstreamError::Decode {
            service: SERVICE,
            source,
        })
    }

    /// Fetch one class's content timeline, including sections gated by
    /// sequential learning.
    pub async fn content_timeline(
        &self,
        class_id: &str,
    ) -> Result<Vec<TimelineSection>, UpstreamError> {
        let path = format!("user/classes/{class_id}/contentTimeline");
        let body = self
            .get(&path, &[("showSequentialLearningDisabledSections", "true")])
            .await?;

        let timeline = body
            .pointer("/data/timeline")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        serde_json::from_value(timeline).map_err(|source| UpstreamError::Decode {
            service: SERVICE,
            source,
        })
    }

    /// Next scheduled sessions for the whole institute, platform-side
    /// filter `status=FUTURE`, first page of 5.
    pub async fn upcoming_sessions(&self) -> Result<Vec<Value>, UpstreamError> {
        let path = format!("institutes/{}/sessions", self.institute_id);
        let body = self
            .get(
                &path,
                &[
                    ("paginateBy", "COUNT"),
                    ("page_number", "1"),
                    ("page_size", "5"),
                    ("status", "FUTURE"),
                ],
            )
            .await?;

        match body.get("data") {
            Some(Value::Array(sessions)) => Ok(sessions.clone()),
            _ => Ok(Vec::new()),
        }
    }

    /// A teacher's availability between two instants, trimmed to the
    /// first [`AVAILABILITY_SLOT_LIMIT`] slots.
    pub async fn teacher_availability(
        &self,
        teacher_id: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<Vec<AvailabilitySlot>, UpstreamError> {
        let path = format!(
            "institutes/{}/teachers/{teacher_id}/availability",
            self.institute_id
        );
        let body = self
            .get(&path, &[("startTime", start_time), ("endTime", end_time)])
            .await?;

        let slots = body
            .pointer("/data/workingHours/slots")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let slots: Vec<AvailabilitySlot> =
            serde_json::from_value(slots).map_err(|source| UpstreamError::Decode {
                service: SERVICE,
                source,
            })?;

        Ok(slots.into_iter().take(AVAILABILITY_SLOT_LIMIT).collect())
    }
}

fn required_env(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set"))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::AvailabilitySlot;

    #[test]
    fn student_listing_payload_deserializes() {
        let body = json!({
            "data": {
                "students": [
                    {
                        "_id": "stu1",
                        "userId": { "name": "Asha", "phoneNumber": "+91 98 76 54 32 10" },
                        "classes": [{ "_id": "cls1", "name": "Physics", "subject": "Science" }],
                        "status": "ACCEPTED"
                    },
                    { "_id": "stu2" }
                ]
            }
        });

        let students: Vec<sagepilot_core::identity::WiseStudent> =
            serde_json::from_value(body.pointer("/data/students").cloned().unwrap())
                .expect("listing fixture should deserialize");

        assert_eq!(students.len(), 2);
        assert_eq!(students[0].phone_number(), Some("+91 98 76 54 32 10"));
        assert_eq!(students[0].classes.len(), 1);
        assert!(students[1].user.is_none());
        assert!(students[1].classes.is_empty());
    }

    #[test]
    fn availability_slots_pass_through_unknown_time_formats() {
        let slots: Vec<AvailabilitySlot> = serde_json::from_value(json!([
            { "startTime": "2026-03-01T10:00:00Z", "endTime": "2026-03-01T11:00:00Z" },
            { "startTime": 1767261600000u64, "endTime": 1767265200000u64 }
        ]))
        .expect("slot fixture should deserialize");

        assert_eq!(slots.len(), 2);
        assert_eq!(
            slots[0].start_time,
            Some(Value::String("2026-03-01T10:00:00Z".to_string()))
        );
        assert!(slots[1].start_time.as_ref().is_some_and(Value::is_number));
    }
}
