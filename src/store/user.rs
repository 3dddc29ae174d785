use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::api::UserApi;
use crate::error::Result;
use crate::models::{User, UserStatistics};

/// User list state for the admin users page.
pub struct UserStore {
    api: Arc<dyn UserApi>,
    users: Vec<User>,
    loading: bool,
    refreshing: bool,
    error: Option<String>,
}

impl UserStore {
    pub fn new(api: Arc<dyn UserApi>) -> Self {
        Self {
            api,
            users: Vec::new(),
            loading: false,
            refreshing: false,
            error: None,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Load every user. A failure keeps the current list and records the error.
    pub async fn fetch(&mut self) {
        self.loading = true;
        self.error = None;
        self.load("fetching").await;
        self.loading = false;
    }

    pub async fn refresh(&mut self) {
        self.refreshing = true;
        self.error = None;
        self.load("refreshing").await;
        self.refreshing = false;
    }

    async fn load(&mut self, action: &str) {
        match self.api.get_all_users().await {
            Ok(users) => {
                info!("Loaded {} users", users.len());
                self.users = users;
            }
            Err(err) => {
                error!("Error {} users: {}", action, err);
                self.error = Some(err.to_string());
            }
        }
    }

    /// Change a user's status on the backend, then patch the local copy.
    pub async fn update_status(&mut self, id: &str, status: &str) -> Result<()> {
        if let Err(err) = self.api.update_user_status(id, status).await {
            error!("Error updating user {} status: {}", id, err);
            self.error = Some(err.to_string());
            return Err(err);
        }

        let now = Utc::now().to_rfc3339();
        for user in self.users.iter_mut().filter(|u| u.id == id) {
            user.status = Some(status.to_string());
            user.updated_at = Some(now.clone());
        }
        info!("User {} status set to {}", id, status);
        Ok(())
    }

    /// Delete a user on the backend, then drop it locally.
    pub async fn remove(&mut self, id: &str) -> Result<()> {
        if let Err(err) = self.api.delete_user(id).await {
            error!("Error removing user {}: {}", id, err);
            self.error = Some(err.to_string());
            return Err(err);
        }
        self.users.retain(|u| u.id != id);
        info!("User {} removed", id);
        Ok(())
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn statistics(&self) -> UserStatistics {
        UserStatistics::from_users(&self.users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{NewUser, RegistrationOutcome};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeUsers {
        fail: bool,
        status_updates: Mutex<Vec<(String, String)>>,
    }

    fn user(id: &str, kyc: &str) -> User {
        User {
            id: id.into(),
            kyc_status: kyc.into(),
            ..User::default()
        }
    }

    fn rejected() -> Error {
        Error::Api {
            status: 403,
            reason: "Forbidden".into(),
            body: Value::Null,
        }
    }

    #[async_trait]
    impl UserApi for FakeUsers {
        async fn get_all_users(&self) -> Result<Vec<User>> {
            if self.fail {
                return Err(rejected());
            }
            Ok(vec![user("a", "approved"), user("b", "pending"), user("c", "rejected")])
        }

        async fn get_user_by_id(&self, id: &str) -> Result<User> {
            Ok(user(id, "approved"))
        }

        async fn update_user_status(&self, id: &str, status: &str) -> Result<()> {
            if self.fail {
                return Err(rejected());
            }
            self.status_updates
                .lock()
                .unwrap()
                .push((id.to_string(), status.to_string()));
            Ok(())
        }

        async fn delete_user(&self, _id: &str) -> Result<()> {
            if self.fail {
                return Err(rejected());
            }
            Ok(())
        }

        async fn register_user(&self, _draft: &NewUser) -> Result<RegistrationOutcome> {
            Ok(RegistrationOutcome {
                success: true,
                message: "ok".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_and_statistics() {
        let mut store = UserStore::new(Arc::new(FakeUsers::default()));
        store.fetch().await;

        assert!(!store.is_loading());
        assert_eq!(store.users().len(), 3);
        let stats = store.statistics();
        assert_eq!((stats.total, stats.active, stats.pending, stats.inactive), (3, 1, 1, 1));
    }

    #[tokio::test]
    async fn test_update_status_patches_local_user() {
        let api = Arc::new(FakeUsers::default());
        let mut store = UserStore::new(api.clone());
        store.fetch().await;

        store.update_status("b", "active").await.unwrap();

        let updated = store.users().iter().find(|u| u.id == "b").unwrap();
        assert_eq!(updated.status.as_deref(), Some("active"));
        assert!(updated.updated_at.is_some());
        assert!(store.users().iter().find(|u| u.id == "a").unwrap().status.is_none());
        assert_eq!(
            api.status_updates.lock().unwrap().as_slice(),
            &[("b".to_string(), "active".to_string())]
        );
    }

    #[tokio::test]
    async fn test_remove_drops_locally() {
        let mut store = UserStore::new(Arc::new(FakeUsers::default()));
        store.refresh().await;
        store.remove("a").await.unwrap();
        assert_eq!(store.users().len(), 2);
    }

    #[tokio::test]
    async fn test_failures_record_error_without_rollback() {
        let mut store = UserStore::new(Arc::new(FakeUsers {
            fail: true,
            ..FakeUsers::default()
        }));

        store.fetch().await;
        assert_eq!(store.error(), Some("API request failed: Forbidden"));

        store.clear_error();
        let err = store.remove("a").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(store.error(), Some("API request failed: Forbidden"));
    }
}
