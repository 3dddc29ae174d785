use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::{
    LookupRecord, NewInvestment, NewProperty, NewUser, RegistrationOutcome, UploadFile, User,
};

/// Property endpoints.
///
/// List calls return raw records with the envelope already removed; turning
/// them into [`crate::models::Property`] is the repository's job.
#[async_trait]
pub trait PropertyApi: Send + Sync {
    async fn get_all_properties(&self) -> Result<Vec<Value>>;

    async fn get_property_by_id(&self, id: i64) -> Result<Value>;

    async fn create_property(&self, draft: &NewProperty) -> Result<Value>;

    async fn update_property(&self, id: i64, patch: &Value) -> Result<Value>;

    async fn delete_property(&self, id: i64) -> Result<()>;

    async fn search_properties(&self, params: &[(String, String)]) -> Result<Vec<Value>>;

    async fn upload_property_images(&self, id: i64, files: &[UploadFile]) -> Result<Value>;
}

/// Account endpoints.
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn get_all_users(&self) -> Result<Vec<User>>;

    async fn get_user_by_id(&self, id: &str) -> Result<User>;

    async fn update_user_status(&self, id: &str, status: &str) -> Result<()>;

    async fn delete_user(&self, id: &str) -> Result<()>;

    async fn register_user(&self, draft: &NewUser) -> Result<RegistrationOutcome>;
}

/// Reference-data endpoints (cities, property types).
#[async_trait]
pub trait LookupApi<T: LookupRecord>: Send + Sync {
    async fn get_all(&self) -> Result<Vec<T>>;

    async fn get_by_id(&self, id: i64) -> Result<T>;

    async fn add(&self, draft: &T::Draft) -> Result<Value>;
}

/// Login endpoint. Returns the raw response body on success.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, phone_number: &str, password: &str) -> Result<Value>;
}

#[async_trait]
pub trait InvestmentApi: Send + Sync {
    async fn add_investment(&self, draft: &NewInvestment) -> Result<Value>;
}
