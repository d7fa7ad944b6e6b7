//! HTTP client for the KALE pool backend.
//!
//! [`ApiClient`] owns the connection pool, the two service base URLs and a
//! handle to the credential store. Every endpoint goes through the same
//! executor (see `executor.rs`), which adds auth headers, enforces a
//! per-attempt timeout, retries transient failures with doubling backoff and
//! normalizes every failure into an [`ApiError`](crate::error::ApiError).
//!
//! # Submodules
//!
//! - `executor`: the retry / timeout / error-normalization loop.
//! - `api`: typed endpoint methods.
//! - `session`: login, logout and the stored user profile.
//! - `query`: query-string construction.

mod api;
mod executor;
mod query;
mod session;

pub use query::Query;

use crate::config::{ApiConfig, AppConfig};
use crate::credentials::{self, CredentialStore};
use crate::error::{ClientError, Result};
use crate::utils::retry::RetryPolicy;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Which backend service a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Service {
    /// The primary backend (registration, pools, block operations).
    #[default]
    Backend,
    /// The pooler service, reached only for its status endpoint.
    Pooler,
}

/// Per-call overrides for one logical request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Per-attempt timeout; the client default when `None`.
    pub timeout: Option<Duration>,
    /// Retries after the first attempt; the client default when `None`.
    pub retries: Option<u32>,
    /// Do not attach the stored bearer token.
    pub skip_auth: bool,
    /// Extra headers, applied over `Content-Type`.
    pub headers: HeaderMap,
    pub service: Service,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn service(mut self, service: Service) -> Self {
        self.service = service;
        self
    }
}

/// Client for the KALE pool backend.
///
/// Cheap to clone: clones share the connection pool and credential store.
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    backend_base_url: String,
    pooler_base_url: String,
    default_timeout: Duration,
    retry_policy: RetryPolicy,
    credentials: Arc<dyn CredentialStore>,
    sanitize_logs: bool,
}

impl ApiClient {
    /// Create a client for the services described by `config`.
    pub fn new(config: &ApiConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let http_client = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| ClientError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created HTTP client with connection pooling and keep-alive");

        Ok(Self {
            http_client,
            backend_base_url: normalize_base_url(&config.backend_base_url),
            pooler_base_url: normalize_base_url(&config.pooler_base_url),
            default_timeout: config.timeout(),
            retry_policy: RetryPolicy::new(config.max_retries, config.backoff_base()),
            credentials,
            sanitize_logs: true,
        })
    }

    /// Create a client and its credential store from the full app config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = credentials::from_config(&config.credentials);
        Ok(Self::new(&config.api, store)?.with_sanitized_logs(config.logging.sanitize_tokens))
    }

    /// Whether response bodies are scrubbed of tokens before being logged.
    pub fn with_sanitized_logs(mut self, sanitize: bool) -> Self {
        self.sanitize_logs = sanitize;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn set_base_url(&mut self, url: &str) {
        self.backend_base_url = normalize_base_url(url);
    }

    pub fn set_pooler_base_url(&mut self, url: &str) {
        self.pooler_base_url = normalize_base_url(url);
    }

    pub fn base_url(&self) -> &str {
        &self.backend_base_url
    }

    pub fn pooler_base_url(&self) -> &str {
        &self.pooler_base_url
    }

    fn base_url_for(&self, service: Service) -> &str {
        match service {
            Service::Backend => &self.backend_base_url,
            Service::Pooler => &self.pooler_base_url,
        }
    }
}

/// Paths always start with `/`, so a trailing slash on the base would double up.
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
