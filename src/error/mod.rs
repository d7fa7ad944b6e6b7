// Error types for the KALE pool client

mod payload;

pub use payload::{ErrorBody, ErrorPayload};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Error code attached to HTTP failures whose body carried no code of its own.
pub const CODE_HTTP_ERROR: &str = "HTTP_ERROR";
/// Error code for an attempt cancelled by its timeout.
pub const CODE_TIMEOUT: &str = "TIMEOUT";
/// Error code for failures below HTTP (DNS, refused connection, reset).
pub const CODE_NETWORK_ERROR: &str = "NETWORK_ERROR";
/// Error code for a successful response whose body could not be decoded.
pub const CODE_INVALID_RESPONSE: &str = "INVALID_RESPONSE";
/// Error code for a request that could not be built (unserializable body,
/// token that is not a valid header value). Nothing was sent.
pub const CODE_INVALID_REQUEST: &str = "INVALID_REQUEST";

/// The single normalized error every request path resolves to.
///
/// `status` is the HTTP status when one was received, `408` for timeouts and
/// `0` when the request never produced a response.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{message} (status {status}, code {code})")]
pub struct ApiError {
    pub status: u16,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Option<Value>) -> Self {
        self.details = details;
        self
    }

    /// Attempt cancelled by the per-attempt timer.
    pub fn timeout() -> Self {
        Self::new(408, CODE_TIMEOUT, "Request timeout")
    }

    /// Transport failure without an HTTP response.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(0, CODE_NETWORK_ERROR, message)
    }

    /// 2xx response whose body did not decode into the expected shape.
    pub fn invalid_response(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, CODE_INVALID_RESPONSE, message)
    }

    /// Request rejected before it was sent.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(0, CODE_INVALID_REQUEST, message)
    }

    pub fn is_client_error(&self) -> bool {
        (400..=499).contains(&self.status)
    }

    pub fn is_timeout(&self) -> bool {
        self.status == 408 && self.code == CODE_TIMEOUT
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Client errors (timeouts included, being 408) and requests that could
    /// not be built are terminal. Everything else is transient, including a
    /// success status whose body did not decode.
    pub fn is_retryable(&self) -> bool {
        !self.is_client_error() && !self.is_timeout() && self.code != CODE_INVALID_REQUEST
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failures outside a single request: setup, storage and configuration.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Credential store error: {0}")]
    Credentials(String),

    #[error("Insecure credentials file: {0}")]
    InsecureCredentials(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
