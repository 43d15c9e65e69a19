//! Authentication against the application backend.

pub mod remote;
pub mod session;

use std::future::Future;

use zeroize::Zeroizing;

use crate::models::{ProviderType, User};
use crate::Result;

pub use remote::RemoteApp;
pub use session::SessionStore;

/// How to sign in.
#[derive(Clone)]
pub enum Credentials {
    EmailPassword {
        email: String,
        password: Zeroizing<String>,
    },
    Anonymous,
}

impl Credentials {
    pub fn email_password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::EmailPassword {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    pub fn anonymous() -> Self {
        Credentials::Anonymous
    }

    pub fn provider(&self) -> ProviderType {
        match self {
            Credentials::EmailPassword { .. } => ProviderType::LocalUserpass,
            Credentials::Anonymous => ProviderType::AnonUser,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::EmailPassword { email, .. } => f
                .debug_struct("EmailPassword")
                .field("email", email)
                .finish_non_exhaustive(),
            Credentials::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// The operations the app needs from an authentication backend.
///
/// Every call may fail; callers decide how a failure is surfaced.
pub trait AuthService {
    /// The signed-in user, if a session exists (including one restored from
    /// a previous run).
    fn current_user(&self) -> Option<User>;

    /// Sign in and make the returned user current.
    fn log_in(&self, credentials: &Credentials) -> impl Future<Output = Result<User>> + Send;

    /// Create an email/password account. Does not sign in.
    fn register_user(&self, email: &str, password: &str) -> impl Future<Output = Result<()>> + Send;

    /// End the current session, if any.
    fn log_out(&self) -> impl Future<Output = Result<()>> + Send;
}
