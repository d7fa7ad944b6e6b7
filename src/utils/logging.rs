//! Structured logging and security-focused trace utilities.
//!
//! This module configures the `tracing` ecosystem for the client,
//! supporting multiple output formats and providing utilities to keep
//! bearer tokens out of logs.

use crate::config::LoggingConfig;
use crate::error::{ClientError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Supports three output formats:
/// - `json`: Structured JSON logs for machine ingestion.
/// - `compact`: Single-line human-readable output.
/// - `pretty` (default): Multi-line, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`. Logs go to stderr so command output on
/// stdout stays machine-readable.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "compact" => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| ClientError::Internal(format!("Failed to install logger: {}", e)))
}

const BEARER_PREFIX: &str = "Bearer ";
const JWT_PREFIX: &str = "eyJ";

/// Sanitizes bearer tokens from log messages.
///
/// Replaces the credential after every `Bearer ` prefix and every
/// JWT-looking run (base64url JSON header starting with `eyJ`) with a
/// `\[REDACTED\]` placeholder.
pub fn sanitize(input: &str) -> String {
    let bearer = redact_after(input, BEARER_PREFIX, "[REDACTED_TOKEN]", true);
    redact_after(&bearer, JWT_PREFIX, "[REDACTED_JWT]", false)
}

fn redact_after(input: &str, marker: &str, placeholder: &str, keep_marker: bool) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(marker) {
        let token_start = pos + marker.len();
        let token_len = rest[token_start..]
            .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == ',')
            .unwrap_or(rest.len() - token_start);

        result.push_str(&rest[..pos]);
        if keep_marker {
            result.push_str(marker);
        }
        result.push_str(placeholder);
        rest = &rest[token_start + token_len..];
    }

    result.push_str(rest);
    result
}
