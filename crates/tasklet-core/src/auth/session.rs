//! Persisted session.
//!
//! The signed-in user is written to disk so it survives restarts, the same
//! way a mobile SDK keeps its current user between launches.

use std::fs::{self, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::models::User;
use crate::Result;

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted user, if any.
    pub fn load(&self) -> Result<Option<User>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let user: User = serde_json::from_str(&content)?;
        debug!(user_id = %user.id, path = %self.path.display(), "restored session");
        Ok(Some(user))
    }

    /// Persist `user`, readable by the owner only on Unix.
    pub fn save(&self, user: &User) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            crate::config::ensure_private_dir(parent)
                .map_err(|e| crate::TaskletError::Config(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(user)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&self.path)?;

        // `mode` only applies on creation; tighten a file left by an older run
        #[cfg(unix)]
        file.set_permissions(fs::Permissions::from_mode(0o600))?;

        file.write_all(content.as_bytes())?;

        Ok(())
    }

    /// Forget the persisted user.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderType;
    use tempfile::TempDir;

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            provider_type: ProviderType::LocalUserpass,
            email: Some("ada@example.com".to_string()),
            access_token: "access-token".to_string(),
            refresh_token: "refresh-token".to_string(),
        }
    }

    #[test]
    fn test_missing_session_loads_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().join("session.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().join("session.json"));

        store.save(&user()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.id, "user-1");
        assert_eq!(loaded.email.as_deref(), Some("ada@example.com"));
        assert_eq!(loaded.refresh_token, "refresh-token");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_private() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().join("session.json"));
        store.save(&user()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_session_file_is_tightened_before_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let store = SessionStore::new(&path);
        store.save(&user()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().unwrap().unwrap().id, "user-1");
    }

    #[test]
    fn test_corrupt_session_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(SessionStore::new(path).load().is_err());
    }
}
