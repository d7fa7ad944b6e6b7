//! Session flows layered on the executor.
//!
//! The executor only reads the stored token. Writing and erasing it happens
//! here: login and farmer registration store it, logout and a failed
//! who-am-I probe clear it. The user profile stored next to the token is
//! what lets farmer endpoints default to "my farmer id" without asking the
//! backend first.

use super::ApiClient;
use crate::credentials::{decode_token_subject, CredentialStore, StoredCredentials, UserProfile};
use crate::error::{ApiError, ApiResult, Result};
use crate::models::{CurrentUser, LoginRequest, MeResponse, RegisterUserRequest, Role};
use serde_json::Value;
use tracing::{debug, info, warn};

impl ApiClient {
    /// `GET /auth/me`
    pub async fn me(&self) -> ApiResult<MeResponse> {
        self.get("/auth/me").await
    }

    /// Register a farmer account and keep the returned token, if any.
    pub async fn register_farmer(
        &self,
        email: &str,
        password: &str,
        external_wallet: &str,
    ) -> Result<Value> {
        let request = RegisterUserRequest {
            email: email.to_string(),
            password: password.to_string(),
            external_wallet: external_wallet.to_string(),
        };
        let response: Value = self.post("/register-farmer", &request).await?;

        if let Some(token) = response.get("token").and_then(Value::as_str) {
            self.credentials.store(&StoredCredentials::new(token))?;
            info!("Stored session token for newly registered farmer");
        }

        Ok(response)
    }

    /// Log in, keep the token and cache the user's profile.
    ///
    /// The profile comes from a follow-up `/auth/me`; if that probe fails
    /// the login still succeeds with just the token stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<Value> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: Value = self.post("/auth/login", &request).await?;

        let Some(token) = response.get("token").and_then(Value::as_str) else {
            warn!("Login response carried no token; nothing stored");
            return Ok(response);
        };

        self.credentials.store(&StoredCredentials::new(token))?;

        match self.me().await {
            Ok(me) => {
                let profile = profile_from(&me.user);
                self.credentials
                    .store(&StoredCredentials::new(token).with_user(profile))?;
                info!("Logged in as {} ({})", me.user.email, me.user.role.to_lowercase());
            }
            Err(e) => warn!("Could not fetch user details after login: {}", e),
        }

        Ok(response)
    }

    /// Tell the backend the session is over and erase local credentials.
    ///
    /// Credentials are erased even when the backend call fails; that failure
    /// is still returned.
    pub async fn logout(&self) -> Result<Value> {
        let result: ApiResult<Value> = self.post("/auth/logout", &serde_json::json!({})).await;
        self.clear_credentials()?;
        Ok(result?)
    }

    /// Re-validate the stored token against `/auth/me`.
    ///
    /// Returns `None` when there is no token or the backend rejected it
    /// (any 4xx); in the latter case local credentials are cleared. Server
    /// and network failures are returned without touching credentials, since
    /// they say nothing about the token.
    pub async fn refresh_user(&self) -> Result<Option<CurrentUser>> {
        let Some(token) = self.credentials.read() else {
            return Ok(None);
        };

        match self.me().await {
            Ok(me) => {
                let profile = profile_from(&me.user);
                self.credentials
                    .store(&StoredCredentials::new(token).with_user(profile))?;
                Ok(Some(me.user))
            }
            Err(e) if e.is_client_error() => {
                warn!("Stored token rejected ({}); clearing credentials", e);
                self.clear_credentials()?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn clear_credentials(&self) -> Result<()> {
        debug!("Clearing stored credentials");
        self.credentials.clear()
    }

    pub fn stored_token(&self) -> Option<String> {
        self.credentials.read()
    }

    /// The profile cached at login, if any.
    pub fn stored_profile(&self) -> Option<UserProfile> {
        match self.credentials.load() {
            Ok(stored) => stored.map(|c| c.user.clone()),
            Err(e) => {
                warn!("Could not read stored profile: {}", e);
                None
            }
        }
    }

    /// User id from the stored token's claims (unverified).
    pub fn user_id_from_token(&self) -> Option<String> {
        self.stored_token().as_deref().and_then(decode_token_subject)
    }

    /// Pick the farmer id for a farmer-scoped endpoint.
    ///
    /// Uses `provided` or else the stored farmer id. A caller asking for a
    /// different farmer than the stored one must be an admin. Fails without
    /// sending anything.
    pub(crate) fn resolve_farmer_id(&self, provided: Option<&str>) -> ApiResult<String> {
        let profile = self.stored_profile().unwrap_or_default();
        let stored = profile.farmer_id.as_deref();

        let farmer_id = provided.or(stored).ok_or_else(|| {
            ApiError::new(400, "FARMER_ID_MISSING", "No farmer ID found in local storage")
        })?;

        if let (Some(stored), Some(provided)) = (stored, provided) {
            let is_admin = profile.role.as_deref().and_then(Role::parse) == Some(Role::Admin);
            if stored != provided && !is_admin {
                return Err(ApiError::new(
                    403,
                    "FORBIDDEN",
                    "You can only access your own farmer data",
                ));
            }
        }

        Ok(farmer_id.to_string())
    }
}

/// Denormalize the fields worth caching; the farmer id only for farmers.
fn profile_from(user: &CurrentUser) -> UserProfile {
    let role = user.role.to_lowercase();
    let farmer_id = if Role::parse(&role) == Some(Role::Farmer) {
        user.farmer_id.clone()
    } else {
        None
    };

    UserProfile {
        user_id: Some(user.id.clone()),
        email: Some(user.email.clone()),
        role: Some(role),
        farmer_id,
        status: user.status.clone(),
    }
}
