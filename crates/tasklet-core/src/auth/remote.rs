//! HTTP client for the application backend's authentication API.
//!
//! Speaks the App Services client REST API: provider login, profile lookup,
//! email/password registration and session logout.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{AuthService, Credentials, SessionStore};
use crate::config::SyncConfig;
use crate::models::{ProviderType, User};
use crate::{Result, TaskletError};

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    identities: Vec<Identity>,
    #[serde(default)]
    data: ProfileData,
}

#[derive(Debug, Deserialize)]
struct Identity {
    provider_type: ProviderType,
}

#[derive(Debug, Default, Deserialize)]
struct ProfileData {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Client for one backend application.
pub struct RemoteApp {
    client: Client,
    base_url: String,
    app_id: String,
    session: Option<SessionStore>,
    current: Mutex<Option<User>>,
}

impl RemoteApp {
    /// Create a client for `app_id` served at `base_url`.
    pub fn new(base_url: &str, app_id: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TaskletError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            session: None,
            current: Mutex::new(None),
        })
    }

    /// Create a client from the installed sync configuration.
    pub fn from_sync_config(config: &SyncConfig) -> Result<Self> {
        match config {
            SyncConfig::Enabled {
                app_id, base_url, ..
            } => Self::new(base_url, app_id),
            SyncConfig::Disabled => Err(TaskletError::Config(
                "Sync is disabled; set `enabled = true` under [sync] to sign in".to_string(),
            )),
        }
    }

    /// Persist the current user in `store` and restore any saved session.
    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        match store.load() {
            Ok(user) => *self.current.get_mut().unwrap_or_else(|e| e.into_inner()) = user,
            Err(e) => warn!(error = %e, path = %store.path().display(), "ignoring unreadable session"),
        }
        self.session = Some(store);
        self
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    fn app_url(&self, path: &str) -> String {
        format!("{}/api/client/v2.0/app/{}{}", self.base_url, self.app_id, path)
    }

    fn client_url(&self, path: &str) -> String {
        format!("{}/api/client/v2.0{}", self.base_url, path)
    }

    fn set_current(&self, user: Option<User>) {
        if let Some(store) = &self.session {
            let persisted = match &user {
                Some(user) => store.save(user),
                None => store.clear(),
            };
            if let Err(e) = persisted {
                warn!(error = %e, "failed to persist session");
            }
        }
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = user;
    }

    /// Map a non-2xx response to an authentication error.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or(body);
        let message = message.trim();

        if message.is_empty() {
            return Err(TaskletError::Auth(format!("request failed with status {}", status)));
        }
        Err(TaskletError::Auth(format!("{} ({})", message, status)))
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProfileResponse> {
        let response = self
            .client
            .get(self.client_url("/auth/profile"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error)?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| TaskletError::Auth(format!("Malformed profile response: {}", e)))
    }
}

fn network_error(e: reqwest::Error) -> TaskletError {
    TaskletError::Network(e.to_string())
}

impl AuthService for RemoteApp {
    fn current_user(&self) -> Option<User> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn log_in(&self, credentials: &Credentials) -> Result<User> {
        let provider = credentials.provider();
        let body = match credentials {
            Credentials::EmailPassword { email, password } => json!({
                "username": email,
                "password": password.as_str(),
            }),
            Credentials::Anonymous => json!({}),
        };

        debug!(provider = provider.as_str(), "logging in");
        let response = self
            .client
            .post(self.app_url(&format!("/auth/providers/{}/login", provider.as_str())))
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let login: LoginResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| TaskletError::Auth(format!("Malformed login response: {}", e)))?;

        let profile = self.fetch_profile(&login.access_token).await?;
        let provider_type = profile
            .identities
            .first()
            .map(|identity| identity.provider_type)
            .filter(|p| *p != ProviderType::Other)
            .unwrap_or(provider);

        let user = User {
            id: login.user_id,
            provider_type,
            email: profile.data.email,
            access_token: login.access_token,
            refresh_token: login.refresh_token,
        };

        info!(user_id = %user.id, provider = user.provider_type.as_str(), "logged in");
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn register_user(&self, email: &str, password: &str) -> Result<()> {
        let response = self
            .client
            .post(self.app_url("/auth/providers/local-userpass/register"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(network_error)?;

        Self::check(response).await?;
        info!(email, "registered user");
        Ok(())
    }

    async fn log_out(&self) -> Result<()> {
        let Some(user) = self.current_user() else {
            return Ok(());
        };
        self.set_current(None);

        let response = self
            .client
            .delete(self.client_url("/auth/session"))
            .bearer_auth(&user.refresh_token)
            .send()
            .await
            .map_err(network_error)?;

        Self::check(response).await?;
        info!(user_id = %user.id, "logged out");
        Ok(())
    }
}
