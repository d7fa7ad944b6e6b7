//! Resilient client for the KALE pool coordination backend.
//!
//! Every call goes through one executor that attaches the stored bearer
//! token, bounds each attempt with a timeout, retries transient failures
//! with doubling backoff and turns every failure into an [`ApiError`].

pub mod cli;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod metrics;
pub mod models;
pub mod utils;

pub use client::{ApiClient, RequestOptions, Service};
pub use config::AppConfig;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredentials};
pub use error::{ApiError, ApiResult, ClientError};
pub use utils::retry::RetryPolicy;
