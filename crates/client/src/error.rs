//! Errors from the REST API layer and their mapping onto [`CoreError`].

use std::collections::BTreeMap;

use barbearia_core::error::CoreError;
use barbearia_core::types::EntityId;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {message}")]
    Status {
        status: u16,
        /// Machine-readable code from the error body, e.g. `SLOT_CONFLICT`.
        code: Option<String>,
        message: String,
        /// Per-field messages for validation failures.
        fields: BTreeMap<String, String>,
    },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Error body produced by the backend. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
    pub code: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl ApiError {
    /// Build a status error from the raw response body.
    pub fn from_body(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .error
            .or(parsed.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    default_reason(status).to_string()
                } else {
                    body.trim().to_string()
                }
            });
        ApiError::Status {
            status,
            code: parsed.code,
            message,
            fields: parsed.fields,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(err) => err.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    /// Convert into the domain taxonomy, naming the entity on a 404.
    pub fn into_core_for(self, entity: &'static str, id: Option<EntityId>) -> CoreError {
        match self {
            ApiError::Status { status: 404, .. } => CoreError::NotFound { entity, id },
            other => other.into(),
        }
    }
}

impl From<ApiError> for CoreError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Request(err) => classify_transport(&err),
            ApiError::Decode(msg) => CoreError::Internal(format!("invalid response: {msg}")),
            ApiError::Status {
                status,
                code,
                message,
                fields,
            } => classify_status(status, code.as_deref(), message, &fields),
        }
    }
}

/// Classify a status response.
///
/// - 404 maps to `NotFound`, 409 (or a `CONFLICT` code) to `Conflict`.
/// - 400 and 422 map to `Validation`, listing field messages when present.
/// - 401/403 map to `Unauthorized`/`Forbidden`.
/// - 502/503/504 are gateway failures and map to `NetworkUnavailable`.
/// - Everything else maps to `Internal`.
fn classify_status(
    status: u16,
    code: Option<&str>,
    message: String,
    fields: &BTreeMap<String, String>,
) -> CoreError {
    let is_conflict_code = code.is_some_and(|c| c.eq_ignore_ascii_case("conflict"));
    match status {
        404 => CoreError::NotFound {
            entity: "resource",
            id: None,
        },
        409 => CoreError::Conflict(message),
        _ if is_conflict_code => CoreError::Conflict(message),
        400 | 422 => {
            if fields.is_empty() {
                CoreError::Validation(message)
            } else {
                let listing = fields
                    .iter()
                    .map(|(field, msg)| format!("{field}: {msg}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                CoreError::Validation(listing)
            }
        }
        401 => CoreError::Unauthorized(message),
        403 => CoreError::Forbidden(message),
        502..=504 => CoreError::NetworkUnavailable(message),
        _ => {
            tracing::error!(status, error = %message, "Unexpected API error");
            CoreError::Internal(message)
        }
    }
}

fn classify_transport(err: &reqwest::Error) -> CoreError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        CoreError::NetworkUnavailable(err.to_string())
    } else if err.is_decode() {
        CoreError::Internal(format!("invalid response: {err}"))
    } else {
        CoreError::NetworkUnavailable(err.to_string())
    }
}

fn default_reason(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Authentication required",
        403 => "Forbidden",
        404 => "Not found",
        409 => "Conflict",
        422 => "Unprocessable entity",
        502..=504 => "Backend unavailable",
        _ => "Unexpected error",
    }
}
