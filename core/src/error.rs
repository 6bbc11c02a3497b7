use serde::Serialize;
use utoipa::ToSchema;

/// Canonical error body returned by every endpoint.
///
/// `error` carries the upstream payload verbatim when a store query or a
/// platform call failed, for diagnostics only.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Always `false` on an error response
    pub success: bool,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Upstream error payload or message, echoed verbatim (500s only)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub error: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_detail(message: impl Into<String>, detail: serde_json::Value) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(detail),
        }
    }
}
