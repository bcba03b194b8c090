//! Session state and persistence.
//!
//! A session is the pair of a signed-in identity and its tokens. Only the
//! refresh token and the cached identity fields are persisted; ID tokens are
//! short-lived and re-minted on restore.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use chouxlab_core::Uid;

use crate::firebase::auth::{AuthUser, TokenPair};

/// The identity the session currently acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub uid: Uid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    /// `true` until the session is upgraded to a real account.
    pub is_anonymous: bool,
}

impl From<AuthUser> for CurrentUser {
    fn from(user: AuthUser) -> Self {
        Self {
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            photo_url: user.photo_url,
            is_anonymous: user.is_anonymous,
        }
    }
}

/// A live session: who we are and the tokens proving it.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: CurrentUser,
    pub tokens: TokenPair,
}

/// The on-disk shape of a session.
///
/// Holds the long-lived refresh token plus the cached identity so a restored
/// session can report who it is before the first refresh completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    pub refresh_token: String,
    pub user: CurrentUser,
}

/// Errors from loading or saving persisted sessions.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// Filesystem error.
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted session does not decode.
    #[error("invalid session file: {0}")]
    InvalidFormat(#[from] serde_json::Error),
}

/// Where persisted sessions live.
///
/// The facade calls `save` after every sign-in and token refresh, `load` on
/// startup, and `clear` on sign-out.
pub trait SessionStore: Send + Sync {
    /// Load the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage fails or holds junk.
    fn load(&self) -> Result<Option<PersistedSession>, SessionStoreError>;

    /// Persist the session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage fails.
    fn save(&self, session: &PersistedSession) -> Result<(), SessionStoreError>;

    /// Forget the persisted session. Clearing an empty store is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage fails.
    fn clear(&self) -> Result<(), SessionStoreError>;
}

/// In-memory store. Sessions last as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<PersistedSession>, SessionStoreError> {
        Ok(self.session.lock().map_or(None, |guard| guard.clone()))
    }

    fn save(&self, session: &PersistedSession) -> Result<(), SessionStoreError> {
        if let Ok(mut guard) = self.session.lock() {
            *guard = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        if let Ok(mut guard) = self.session.lock() {
            *guard = None;
        }
        Ok(())
    }
}

/// File-backed store holding one JSON session document.
///
/// The file carries a refresh token, so on Unix it is written with `0600`
/// permissions.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<PersistedSession>, SessionStoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    #[instrument(skip(self, session), fields(path = %self.path.display()))]
    fn save(&self, session: &PersistedSession) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<(), SessionStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_session() -> PersistedSession {
        PersistedSession {
            refresh_token: "refresh-token".to_string(),
            user: CurrentUser {
                uid: Uid::new("abc123"),
                email: Some("user@example.com".to_string()),
                display_name: None,
                photo_url: None,
                is_anonymous: false,
            },
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&sample_session()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.user.uid.as_str(), "abc123");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("chouxlab-session-{}", std::process::id()));
        let store = FileSessionStore::new(dir.join("session.json"));

        assert!(store.load().unwrap().is_none());

        store.save(&sample_session()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.refresh_token, "refresh-token");
        assert_eq!(loaded.user.email.as_deref(), Some("user@example.com"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // clearing twice is fine
        store.clear().unwrap();

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_store_rejects_junk() {
        let dir = std::env::temp_dir().join(format!("chouxlab-junk-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(SessionStoreError::InvalidFormat(_))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
