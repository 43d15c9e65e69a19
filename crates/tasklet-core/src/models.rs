use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::ZeroizeOnDrop;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub description: String,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
    /// Owner of the task; only set when sync is enabled.
    pub user_id: Option<String>,
}

impl Task {
    /// A fresh, incomplete task stamped with the current time.
    pub fn generate(user_id: Option<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            is_complete: false,
            created_at: Utc::now(),
            user_id,
        }
    }

    pub fn toggle(&mut self) {
        self.is_complete = !self.is_complete;
    }

    /// First eight characters of the id, as shown in listings.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}

/// Authentication provider a user signed in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProviderType {
    #[serde(rename = "anon-user")]
    AnonUser,
    #[default]
    #[serde(rename = "local-userpass")]
    LocalUserpass,
    #[serde(other)]
    Other,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::AnonUser => "anon-user",
            ProviderType::LocalUserpass => "local-userpass",
            ProviderType::Other => "other",
        }
    }
}

/// A user returned by the authentication backend.
///
/// Session tokens are wiped from memory when the value is dropped.
#[derive(Clone, Serialize, Deserialize, ZeroizeOnDrop)]
pub struct User {
    #[zeroize(skip)]
    pub id: String,
    #[zeroize(skip)]
    pub provider_type: ProviderType,
    #[zeroize(skip)]
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl User {
    pub fn is_anonymous(&self) -> bool {
        self.provider_type == ProviderType::AnonUser
    }

    /// Label shown next to "Logged in as".
    pub fn display_name(&self) -> String {
        if self.is_anonymous() {
            "Anonymous".to_string()
        } else {
            self.email.clone().unwrap_or_else(|| self.id.clone())
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("provider_type", &self.provider_type)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.provider_type == other.provider_type
    }
}

/// What the login screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    None,
    Loading,
    LoginError,
    RegisterError,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(provider_type: ProviderType, email: Option<&str>) -> User {
        User {
            id: "6151e4e6c4b2a1f0a1b2c3d4".to_string(),
            provider_type,
            email: email.map(str::to_string),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        }
    }

    #[test]
    fn test_task_generate_creates_incomplete_task() {
        let before = Utc::now();
        let task = Task::generate(None, "Buy milk");

        assert_eq!(task.description, "Buy milk");
        assert!(!task.is_complete);
        assert!(task.user_id.is_none());
        assert!(task.created_at >= before);
        assert!(task.created_at <= Utc::now());
    }

    #[test]
    fn test_task_generate_with_owner() {
        let task = Task::generate(Some("user-1".to_string()), "Water plants");
        assert_eq!(task.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_toggle_only_flips_completion() {
        let original = Task::generate(Some("user-1".to_string()), "Walk the dog");
        let mut task = original.clone();

        task.toggle();
        assert!(task.is_complete);
        assert_eq!(task.id, original.id);
        assert_eq!(task.description, original.description);
        assert_eq!(task.created_at, original.created_at);
        assert_eq!(task.user_id, original.user_id);

        task.toggle();
        assert_eq!(task, original);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(user(ProviderType::AnonUser, None).display_name(), "Anonymous");
        assert_eq!(
            user(ProviderType::LocalUserpass, Some("ada@example.com")).display_name(),
            "ada@example.com"
        );
        assert_eq!(
            user(ProviderType::LocalUserpass, None).display_name(),
            "6151e4e6c4b2a1f0a1b2c3d4"
        );
    }

    #[test]
    fn test_provider_type_serde() {
        let anon: ProviderType = serde_json::from_str("\"anon-user\"").unwrap();
        assert_eq!(anon, ProviderType::AnonUser);
        let other: ProviderType = serde_json::from_str("\"oauth2-google\"").unwrap();
        assert_eq!(other, ProviderType::Other);
        assert_eq!(
            serde_json::to_string(&ProviderType::LocalUserpass).unwrap(),
            "\"local-userpass\""
        );
    }

    #[test]
    fn test_user_debug_hides_tokens() {
        let rendered = format!("{:?}", user(ProviderType::LocalUserpass, Some("a@b.c")));
        assert!(!rendered.contains("access"));
        assert!(!rendered.contains("refresh"));
        assert!(rendered.contains("a@b.c"));
    }

    #[test]
    fn test_auth_state_default() {
        assert_eq!(AuthState::default(), AuthState::None);
    }
}
