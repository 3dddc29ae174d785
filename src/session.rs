//! Administrator session persistence and login flow.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::api::AuthApi;
use crate::error::{Error, Result};
use crate::models::{Session, SessionUser};

/// Where the signed-in session lives between runs.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<Session>>;

    async fn save(&self, session: &Session) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// Session kept as a JSON file.
///
/// A file that cannot be parsed is deleted and read as "logged out".
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::Session {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };

        match serde_json::from_str(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!(
                    "Discarding unreadable session file {}: {}",
                    self.path.display(),
                    err
                );
                self.clear().await?;
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| self.io_error(err))?;
        }
        let json = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|err| self.io_error(err))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

/// In-process session, gone when the process exits.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.slot().clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.slot() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Login, logout and the current administrator.
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn SessionStore>,
    session: Option<Session>,
}

impl AuthService {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            store,
            session: None,
        }
    }

    /// Pick up a session saved by an earlier run.
    pub async fn restore(&mut self) -> Result<Option<&SessionUser>> {
        self.session = self.store.load().await?;
        Ok(self.user())
    }

    /// Sign in and persist the session.
    pub async fn login(&mut self, phone_number: &str, password: &str) -> Result<&SessionUser> {
        let response = self.api.login(phone_number, password).await?;
        let session = Session::new(SessionUser::from_login_response(&response, phone_number));
        self.store.save(&session).await?;
        info!("Logged in as {}", session.user.display_name());
        Ok(&self.session.insert(session).user)
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.session = None;
        self.store.clear().await?;
        info!("Logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    struct FakeAuth;

    #[async_trait]
    impl AuthApi for FakeAuth {
        async fn login(&self, phone_number: &str, password: &str) -> Result<Value> {
            if password != "Secret#1" {
                return Err(Error::LoginRejected { status: 401 });
            }
            Ok(json!({"user": {
                "id": 42,
                "phoneNumber": phone_number,
                "email": "admin@example.com",
                "roles": ["super"]
            }}))
        }
    }

    fn file_store(dir: &tempfile::TempDir) -> FileSessionStore {
        FileSessionStore::new(dir.path().join("nested").join("admin_user.json"))
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        assert!(store.load().await.unwrap().is_none());

        let session = Session::new(SessionUser::from_login_response(&json!({"id": "7"}), "0500"));
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session));

        store.clear().await.unwrap();
        assert!(!store.path().exists());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("admin_user.json"));
        std::fs::write(store.path(), "{not json").unwrap();

        assert!(store.load().await.unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_login_persists_and_restores() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn SessionStore> = Arc::new(file_store(&dir));

        let mut auth = AuthService::new(Arc::new(FakeAuth), store.clone());
        let user = auth.login("0555", "Secret#1").await.unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.role, "super");
        assert_eq!(user.phone_number, "0555");
        assert!(auth.is_authenticated());

        let mut later = AuthService::new(Arc::new(FakeAuth), store);
        let restored = later.restore().await.unwrap().cloned();
        assert_eq!(restored.map(|u| u.email), Some("admin@example.com".to_string()));

        later.logout().await.unwrap();
        assert!(!later.is_authenticated());
        assert!(later.restore().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejected_login_leaves_session_empty() {
        let store = Arc::new(MemorySessionStore::new());
        let mut auth = AuthService::new(Arc::new(FakeAuth), store.clone());

        let err = auth.login("0555", "nope").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(!auth.is_authenticated());
        assert!(store.load().await.unwrap().is_none());
    }
}
