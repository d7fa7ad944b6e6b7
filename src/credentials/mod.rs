// Credential storage module

mod file;
mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use crate::config::{CredentialsBackend, CredentialsConfig};
use crate::error::Result;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zeroize::Zeroize;

/// Denormalized user fields kept next to the token to avoid
/// a round trip to `/auth/me` for every lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Always lower-case (`farmer`, `pooler`, `admin`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farmer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A bearer token plus the profile it belongs to.
#[derive(Clone, Deserialize, Serialize, Zeroize)]
#[zeroize(drop)]
pub struct StoredCredentials {
    pub token: String,
    #[zeroize(skip)]
    #[serde(default)]
    pub user: UserProfile,
}

// Custom Debug impl that never logs tokens
impl std::fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

impl StoredCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: UserProfile::default(),
        }
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = user;
        self
    }
}

/// Persistent home of the bearer token.
///
/// Reads happen at the start of every authenticated request; writes only
/// from login, registration and logout. There is no client-side expiry:
/// a stale token is discovered when the backend rejects it.
pub trait CredentialStore: Send + Sync {
    /// Overwrite whatever was stored before.
    fn store(&self, credentials: &StoredCredentials) -> Result<()>;

    fn load(&self) -> Result<Option<StoredCredentials>>;

    /// Remove everything, whether or not anything was stored.
    fn clear(&self) -> Result<()>;

    /// The current token, if any. Storage failures read as "no token".
    fn read(&self) -> Option<String> {
        match self.load() {
            Ok(Some(credentials)) if !credentials.token.is_empty() => {
                Some(credentials.token.clone())
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Could not read stored credentials: {}", e);
                None
            }
        }
    }
}

/// Build the store selected by configuration.
pub fn from_config(config: &CredentialsConfig) -> Arc<dyn CredentialStore> {
    match config.backend {
        CredentialsBackend::File => Arc::new(FileCredentialStore::new(&config.path)),
        CredentialsBackend::Memory => Arc::new(MemoryCredentialStore::new()),
    }
}

/// Read the `id` claim from a JWT without verifying it.
///
/// Only meant for showing who is logged in; the backend remains the
/// authority on whether the token is valid.
pub fn decode_token_subject(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;

    match claims.get("id")? {
        serde_json::Value::String(id) => Some(id.clone()),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
