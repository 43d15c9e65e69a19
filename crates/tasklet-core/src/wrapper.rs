//! Top-level flow controller.
//!
//! Decides between the local-only and the synced flow, and in the synced
//! flow tracks the current user and which screen to show:
//!
//! ```text
//! anonymous-pending ──► login-visible ◄──► authenticated
//! ```
//!
//! Login and registration failures never escape this module; they become
//! [`AuthState::LoginError`] / [`AuthState::RegisterError`] and the user can
//! retry.

use tracing::{error, info, warn};

use crate::auth::{AuthService, Credentials};
use crate::config::SyncConfig;
use crate::models::{AuthState, User};
use crate::provider::SyncBinding;
use crate::tasks::AppProps;

/// What to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Nothing yet: an anonymous login is in flight.
    Placeholder,
    Login { auth_state: AuthState },
    Tasks(AppProps),
}

pub enum AppWrapper<A: AuthService> {
    Offline,
    Synced(SyncFlow<A>),
}

impl<A: AuthService> AppWrapper<A> {
    /// Pick the flow for `config`. `app` is only used when sync is enabled.
    pub fn new(config: &SyncConfig, app: impl FnOnce() -> crate::Result<A>) -> crate::Result<Self> {
        if !config.is_enabled() {
            return Ok(AppWrapper::Offline);
        }
        Ok(AppWrapper::Synced(SyncFlow::new(
            app()?,
            config.anonymous_auth_enabled(),
        )))
    }

    pub fn offline() -> Self {
        AppWrapper::Offline
    }

    pub fn synced(app: A, anonymous_auth_enabled: bool) -> Self {
        AppWrapper::Synced(SyncFlow::new(app, anonymous_auth_enabled))
    }

    pub fn screen(&self) -> Screen {
        match self {
            AppWrapper::Offline => Screen::Tasks(AppProps::SyncDisabled),
            AppWrapper::Synced(flow) => flow.screen(),
        }
    }

    /// Sync parameters for the task store, when the task screen is showing
    /// in the synced flow.
    pub fn sync_binding(&self) -> Option<SyncBinding> {
        match self {
            AppWrapper::Offline => None,
            AppWrapper::Synced(flow) => flow.sync_binding(),
        }
    }

    pub fn auth_state(&self) -> AuthState {
        match self {
            AppWrapper::Offline => AuthState::None,
            AppWrapper::Synced(flow) => flow.auth_state(),
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AppWrapper::Offline => None,
            AppWrapper::Synced(flow) => flow.user(),
        }
    }

    pub fn needs_anonymous_login(&self) -> bool {
        matches!(self, AppWrapper::Synced(flow) if flow.needs_anonymous_login())
    }

    pub async fn ensure_anonymous_login(&mut self) -> bool {
        match self {
            AppWrapper::Offline => false,
            AppWrapper::Synced(flow) => flow.ensure_anonymous_login().await,
        }
    }

    pub async fn handle_login(&mut self, email: &str, password: &str) {
        if let AppWrapper::Synced(flow) = self {
            flow.handle_login(email, password).await;
        }
    }

    pub async fn handle_register(&mut self, email: &str, password: &str) {
        if let AppWrapper::Synced(flow) = self {
            flow.handle_register(email, password).await;
        }
    }

    pub async fn handle_logout(&mut self) {
        if let AppWrapper::Synced(flow) = self {
            flow.handle_logout().await;
        }
    }

    pub fn handle_show_auth(&mut self) {
        if let AppWrapper::Synced(flow) = self {
            flow.handle_show_auth();
        }
    }

    pub fn handle_hide_auth(&mut self) {
        if let AppWrapper::Synced(flow) = self {
            flow.handle_hide_auth();
        }
    }
}

/// State of the synced flow.
pub struct SyncFlow<A: AuthService> {
    app: A,
    anonymous_auth_enabled: bool,
    user: Option<User>,
    auth_state: AuthState,
    auth_visible: bool,
    anonymous_failed: bool,
}

impl<A: AuthService> SyncFlow<A> {
    /// Start from the app's current (possibly persisted) user.
    pub fn new(app: A, anonymous_auth_enabled: bool) -> Self {
        let user = app.current_user();
        Self {
            app,
            anonymous_auth_enabled,
            user,
            auth_state: AuthState::None,
            auth_visible: false,
            anonymous_failed: false,
        }
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth_state
    }

    pub fn needs_anonymous_login(&self) -> bool {
        self.user.is_none() && self.anonymous_auth_enabled && !self.anonymous_failed
    }

    pub fn screen(&self) -> Screen {
        if self.needs_anonymous_login() {
            return Screen::Placeholder;
        }

        match &self.user {
            Some(user) if !self.auth_visible => Screen::Tasks(AppProps::SyncEnabled {
                show_login: self.anonymous_auth_enabled && user.is_anonymous(),
                show_logout: !user.is_anonymous(),
                current_user_id: user.id.clone(),
                current_user_name: user.display_name(),
            }),
            _ => Screen::Login {
                auth_state: self.auth_state,
            },
        }
    }

    pub fn sync_binding(&self) -> Option<SyncBinding> {
        match (&self.user, self.screen()) {
            (Some(user), Screen::Tasks(_)) => Some(SyncBinding::for_user(user.clone())),
            _ => None,
        }
    }

    /// Log in anonymously if there is no user and anonymous auth is on.
    ///
    /// Returns whether an attempt was made. A failed attempt is logged and
    /// the flow falls back to the login screen.
    pub async fn ensure_anonymous_login(&mut self) -> bool {
        if !self.needs_anonymous_login() {
            return false;
        }

        match self.app.log_in(&Credentials::anonymous()).await {
            Ok(user) => {
                info!(user_id = %user.id, "anonymous login succeeded");
                self.user = Some(user);
            }
            Err(e) => {
                error!(error = %e, "Error logging in anonymous user");
                self.anonymous_failed = true;
            }
        }
        true
    }

    pub async fn handle_login(&mut self, email: &str, password: &str) {
        if self.auth_state == AuthState::Loading {
            return;
        }
        self.auth_state = AuthState::Loading;

        match self
            .app
            .log_in(&Credentials::email_password(email, password))
            .await
        {
            Ok(user) => self.authenticated(user),
            Err(e) => {
                warn!(error = %e, "Error logging in");
                self.auth_state = AuthState::LoginError;
            }
        }
    }

    pub async fn handle_register(&mut self, email: &str, password: &str) {
        if self.auth_state == AuthState::Loading {
            return;
        }
        self.auth_state = AuthState::Loading;

        let result = match self.app.register_user(email, password).await {
            Ok(()) => {
                self.app
                    .log_in(&Credentials::email_password(email, password))
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(user) => self.authenticated(user),
            Err(e) => {
                warn!(error = %e, "Error registering");
                self.auth_state = AuthState::RegisterError;
            }
        }
    }

    fn authenticated(&mut self, user: User) {
        self.user = Some(user);
        self.auth_visible = false;
        self.auth_state = AuthState::None;
    }

    pub async fn handle_logout(&mut self) {
        self.user = None;
        self.anonymous_failed = false;
        if let Err(e) = self.app.log_out().await {
            warn!(error = %e, "Error logging out");
        }
    }

    /// An anonymous user asked to sign in with credentials. The anonymous
    /// session is kept until a real login succeeds.
    pub fn handle_show_auth(&mut self) {
        self.auth_visible = true;
    }

    /// Back out of a login view opened with [`SyncFlow::handle_show_auth`].
    pub fn handle_hide_auth(&mut self) {
        if self.user.is_some() && self.auth_state != AuthState::Loading {
            self.auth_visible = false;
            self.auth_state = AuthState::None;
        }
    }
}
