use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sagepilot_core::error::ApiError;
use serde_json::Value;
use thiserror::Error;

/// Failure from an outbound HTTP dependency (the platform or the sheet
/// provider). On the primary call chain these surface as 500s with the
/// upstream payload attached; on the fan-out path they are logged and
/// swallowed per unit of work.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned {status}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: Value,
    },
    #[error("{service} returned an unexpected payload: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl UpstreamError {
    /// The payload to echo back on a 500: the upstream body verbatim when
    /// there is one, otherwise the error message.
    pub fn detail(&self) -> Value {
        match self {
            UpstreamError::Status { body, .. } if !body.is_null() => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

/// Tagged request outcome for every handler. One renderer per tag keeps
/// the JSON error contract identical across endpoints.
#[derive(Debug)]
pub enum AppError {
    /// Required input absent or malformed (400). Checked before any I/O.
    Validation { message: String },
    /// Identity resolution produced no match (404). Distinct from a
    /// successful query with an empty result set.
    NotFound { message: String },
    /// Store query failed (500)
    Database(sqlx::Error),
    /// Platform or sheet-provider call failed on the primary chain (500)
    Upstream {
        message: String,
        source: UpstreamError,
    },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>, source: UpstreamError) -> Self {
        AppError::Upstream {
            message: message.into(),
            source,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation { message } => (StatusCode::BAD_REQUEST, ApiError::new(message)),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, ApiError::new(message)),
            AppError::Database(err) => {
                tracing::error!(error = %err, "store query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::with_detail(
                        "Failed to query the store",
                        Value::String(err.to_string()),
                    ),
                )
            }
            AppError::Upstream { message, source } => {
                tracing::error!(error = %source, "upstream call failed");
                let detail = source.detail();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::with_detail(message, detail),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}
