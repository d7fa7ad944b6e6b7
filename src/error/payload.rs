// Defensive decoding of backend error bodies

use super::{ApiError, CODE_HTTP_ERROR};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The JSON error shape the backend sends on failure.
///
/// Every field is optional: a body that is valid JSON but only partly matches
/// still counts as structured, and the gaps are filled in during resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A non-success response body, as far as it could be understood.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Structured(ErrorPayload),
    Unstructured(String),
}

impl ErrorBody {
    /// Classify a raw body. Never fails: anything that is not a JSON object
    /// (HTML error pages, plain text, empty bodies) is kept as raw text.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<ErrorPayload>(raw) {
            Ok(payload) => ErrorBody::Structured(payload),
            Err(_) => ErrorBody::Unstructured(raw.to_string()),
        }
    }

    /// Resolve into the normalized error for a response with `status`.
    ///
    /// `reason` is the status line's reason phrase and is only used when the
    /// body had no usable structure.
    pub fn into_api_error(self, status: u16, reason: &str) -> ApiError {
        match self {
            ErrorBody::Structured(payload) => ApiError {
                status,
                code: non_empty(payload.code).unwrap_or_else(|| CODE_HTTP_ERROR.to_string()),
                message: non_empty(payload.message).unwrap_or_else(|| format!("HTTP {}", status)),
                details: payload.details,
            },
            ErrorBody::Unstructured(_) => ApiError::new(
                status,
                CODE_HTTP_ERROR,
                format!("HTTP {}: {}", status, reason),
            ),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
