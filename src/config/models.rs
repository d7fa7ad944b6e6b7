//! Configuration data structures for the KALE pool client.
//!
//! This module defines the schema for the client settings: backend endpoints
//! and request resilience, where credentials live, and how logs are emitted.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The root configuration object for the client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Backend endpoints and request resilience settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the bearer token and user profile are kept.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for talking to the backend services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the primary backend service.
    /// Default: `http://localhost:3000`
    #[serde(default = "default_backend_base_url")]
    pub backend_base_url: String,

    /// Base URL of the pooler service, used for its status endpoint.
    /// Default: `http://localhost:3001`
    #[serde(default = "default_pooler_base_url")]
    pub pooler_base_url: String,

    /// Per-attempt timeout in milliseconds.
    /// Default: `10000`
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after the first attempt for transient failures.
    /// Default: `3`
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubled for each following one.
    /// Default: `1000`
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

/// Storage backend for credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialsBackend {
    #[default]
    File,
    Memory,
}

/// Settings for credential persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Path to the JSON credentials file.
    /// Default: `~/.kale-pool/credentials.json`
    #[serde(default = "default_credentials_path")]
    pub path: String,

    /// `file` persists across runs, `memory` lasts for the process.
    /// Default: `file`
    #[serde(default)]
    pub backend: CredentialsBackend,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to mask bearer tokens in logged response bodies.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub sanitize_tokens: bool,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            backend_base_url: default_backend_base_url(),
            pooler_base_url: default_pooler_base_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: default_credentials_path(),
            backend: CredentialsBackend::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            sanitize_tokens: true,
        }
    }
}

fn default_backend_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_pooler_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_credentials_path() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".kale-pool")
        .join("credentials.json")
        .to_string_lossy()
        .to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
