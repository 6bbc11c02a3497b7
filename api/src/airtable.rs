//! HTTP client for the sheet provider's own API.
//!
//! Used by the spreadsheet-variant student search, which queries the
//! provider directly instead of the store's mirrored collections.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::UpstreamError;

const SERVICE: &str = "airtable";
const API_URL: &str = "https://api.airtable.com/v0";

/// The sheet column holding the student's contact number.
const PHONE_COLUMN: &str = "Student Contact Number (from Student ID)";
/// Record cap for phone searches.
const MAX_RECORDS: &str = "5";

#[derive(Clone)]
pub struct AirtableClient {
    http: reqwest::Client,
    base_id: String,
    table_id: String,
    api_key: String,
}

/// One sheet record, passed through with its raw labeled fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AirtableRecord {
    pub id: String,
    #[schema(value_type = Object)]
    pub fields: Value,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirtableListResponse {
    #[serde(default)]
    records: Vec<AirtableRecord>,
}

impl AirtableClient {
    /// Read the base, table and API key from the environment. Panics when
    /// one is missing, same startup contract as the platform client.
    pub fn from_env() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_id: required_env("AIRTABLE_BASE_ID"),
            table_id: required_env("AIRTABLE_TABLE_ID"),
            api_key: required_env("AIRTABLE_API_KEY"),
        }
    }

    /// Exact-match filter formula against the contact-number column.
    fn phone_filter_formula(phone: &str) -> String {
        format!("{{{PHONE_COLUMN}}} = '{phone}'")
    }

    /// Search the sheet for records whose contact number equals `phone`
    /// exactly, capped at [`MAX_RECORDS`].
    pub async fn search_by_phone(
        &self,
        phone: &str,
    ) -> Result<Vec<AirtableRecord>, UpstreamError> {
        let url = format!("{API_URL}/{}/{}", self.base_id, self.table_id);
        let formula = Self::phone_filter_formula(phone);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .query(&[
                ("filterByFormula", formula.as_str()),
                ("maxRecords", MAX_RECORDS),
            ])
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

        let body: AirtableListResponse =
            response
                .json()
                .await
                .map_err(|source| UpstreamError::Http {
                    service: SERVICE,
                    source,
                })?;
        Ok(body.records)
    }
}

fn required_env(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AirtableClient, AirtableListResponse};

    #[test]
    fn phone_filter_formula_targets_the_contact_column_exactly() {
        assert_eq!(
            AirtableClient::phone_filter_formula("+15550100"),
            "{Student Contact Number (from Student ID)} = '+15550100'"
        );
    }

    #[test]
    fn list_response_tolerates_missing_created_time() {
        let parsed: AirtableListResponse = serde_json::from_value(json!({
            "records": [
                { "id": "rec1", "fields": { "Status": "Scheduled" }, "createdTime": "2026-01-05T08:00:00.000Z" },
                { "id": "rec2", "fields": {} }
            ]
        }))
        .expect("records fixture should deserialize");

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(
            parsed.records[0].created_time.as_deref(),
            Some("2026-01-05T08:00:00.000Z")
        );
        assert!(parsed.records[1].created_time.is_none());
    }
}
