//! Error types for the marketplace REST client

use reqwest::StatusCode;
use std::io;
use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the marketplace backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Backend answered with a non-success status
    #[error("{message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Normalized message extracted from the response body
        message: String,
    },

    /// Requested resource does not exist
    #[error("{resource} not found")]
    NotFound {
        /// Resource that was not found
        resource: String,
    },

    /// A mutating endpoint is not deployed on the backend
    #[error("{endpoint} endpoint not available")]
    EndpointUnavailable {
        /// Endpoint description, e.g. "Approval"
        endpoint: String,
    },

    /// Input rejected before any request was sent
    #[error("{field}: {message}")]
    Validation {
        /// Offending field
        field: String,
        /// Validation message
        message: String,
    },

    /// Credentials were cleared; the user has to log in again
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// The refresh token was not accepted
    #[error("Token refresh rejected with status {status}")]
    RefreshRejected {
        /// Status returned by the refresh endpoint
        status: u16,
    },

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Token storage I/O error
    #[error("Token storage error: {0}")]
    Io(#[from] io::Error),

    /// Malformed URL built from configuration
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Create an HTTP status error from a response body
    pub fn http(status: StatusCode, body: &str) -> Self {
        Self::Http {
            status: status.as_u16(),
            message: extract_error_message(status, body),
        }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an endpoint unavailable error
    pub fn endpoint_unavailable(endpoint: impl Into<String>) -> Self {
        Self::EndpointUnavailable {
            endpoint: endpoint.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// HTTP status associated with the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::RefreshRejected { status } => Some(*status),
            Self::NotFound { .. } | Self::EndpointUnavailable { .. } => Some(404),
            Self::SessionExpired => Some(401),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the backend reported 404 for this call
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 404,
            Self::NotFound { .. } => true,
            _ => false,
        }
    }

    /// Whether the session ended and the user must authenticate again
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::RefreshRejected { .. })
    }

    /// Single human-readable message suitable for a notice
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(err) if err.is_timeout() => {
                "The server took too long to respond".to_string()
            }
            Self::Transport(err) if err.is_connect() => "Could not reach the server".to_string(),
            Self::Json(_) => "Unexpected response from the server".to_string(),
            other => other.to_string(),
        }
    }
}

/// Normalize a backend error body to a single message
///
/// Understands the shapes the backend produces: `{"detail": ...}`,
/// `{"error": ...}`, `{"message": ...}`, `{"non_field_errors": [...]}` and
/// per-field lists such as `{"email": ["already taken"]}`. Anything else falls
/// back to the raw body (when short) or the status text.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed)
        && let Some(message) = message_from_json(&value)
    {
        return message;
    }

    if !trimmed.is_empty() && trimmed.len() <= 200 && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }

    format!(
        "Request failed with status {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

fn message_from_json(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => items.iter().find_map(message_from_json),
        Value::Object(map) => {
            for key in ["detail", "error", "message", "non_field_errors"] {
                if let Some(message) = map.get(key).and_then(message_from_json) {
                    return Some(message);
                }
            }
            map.iter().find_map(|(field, value)| {
                message_from_json(value).map(|message| format!("{field}: {message}"))
            })
        }
        _ => None,
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        match ventura_core::CoreError::from(errors) {
            ventura_core::CoreError::Validation { field, message } => {
                Self::Validation { field, message }
            }
            other => Self::validation("input", other.to_string()),
        }
    }
}
