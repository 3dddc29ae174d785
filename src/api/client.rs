use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::api::traits::{AuthApi, InvestmentApi, LookupApi, PropertyApi, UserApi};
use crate::api::types::{
    unwrap_data, unwrap_user, PropertyListEnvelope, SearchEnvelope, UserListEnvelope,
};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::models::{
    City, LookupRecord, NewCity, NewInvestment, NewProperty, NewPropertyType, NewUser,
    PropertyType, RegistrationOutcome, UploadFile, User,
};

const PROPERTY_PATH: &str = "/api/Property";
const ACCOUNT_PATH: &str = "/api/Account";
const CITY_PATH: &str = "/api/City";
const TYPE_PROPERTY_PATH: &str = "/api/TypeProperty";
const INVESTMENT_PATH: &str = "/api/Investment";

/// HTTP client for the platform backend.
///
/// One instance implements every API trait; clone it or share it behind an
/// `Arc` to hand it to repositories and directories.
#[derive(Debug, Clone)]
pub struct AdminClient {
    client: Client,
    base_url: String,
}

impl AdminClient {
    /// Create a client with default settings against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(&ApiConfig {
            base_url: base_url.into(),
            ..ApiConfig::default()
        })
    }

    /// Create a client from configuration.
    pub fn with_config(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and read its JSON body. Empty bodies read as `null`.
    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = error_for_status(response).await?;
        read_json(response).await
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        debug!("GET {}", url);
        self.send(self.client.get(&url)).await
    }

    async fn lookup_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let body = unwrap_data(self.get_json(path).await?);
        Ok(serde_json::from_value(body)?)
    }

    async fn lookup_one<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = unwrap_data(self.get_json(path).await?);
        Ok(serde_json::from_value(body)?)
    }

    async fn post_json<B: serde::Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let url = self.url(path);
        debug!("POST {}", url);
        self.send(self.client.post(&url).json(body)).await
    }
}

/// Turn a non-success response into [`Error::Api`], keeping its JSON body.
async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = read_json(response).await.unwrap_or(Value::Null);
    let reason = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| status.as_u16().to_string());

    warn!("{} returned status: {}", url, status);
    Err(Error::Api {
        status: status.as_u16(),
        reason,
        body,
    })
}

async fn read_json(response: Response) -> Result<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

fn file_part(file: &UploadFile) -> Result<Part> {
    Ok(Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)?)
}

#[async_trait]
impl PropertyApi for AdminClient {
    async fn get_all_properties(&self) -> Result<Vec<Value>> {
        let body = self
            .get_json(&format!("{PROPERTY_PATH}/getAllProperty"))
            .await?;
        let envelope: PropertyListEnvelope = serde_json::from_value(body)?;
        let records = envelope.into_records();
        info!("Fetched {} property records", records.len());
        Ok(records)
    }

    async fn get_property_by_id(&self, id: i64) -> Result<Value> {
        self.get_json(&format!("{PROPERTY_PATH}/getPropertyById/{id}"))
            .await
    }

    async fn create_property(&self, draft: &NewProperty) -> Result<Value> {
        let mut form = Form::new();
        for (key, value) in draft.form_fields() {
            form = form.text(key, value);
        }
        for file in &draft.files {
            form = form.part("Files", file_part(file)?);
        }

        let url = self.url(&format!("{PROPERTY_PATH}/addNewProperty"));
        info!(
            "Submitting property '{}' with {} file(s)",
            draft.title,
            draft.files.len()
        );
        self.send(self.client.post(&url).multipart(form)).await
    }

    async fn update_property(&self, id: i64, patch: &Value) -> Result<Value> {
        let url = self.url(&format!("{PROPERTY_PATH}/{id}"));
        debug!("PUT {}", url);
        self.send(self.client.put(&url).json(patch)).await
    }

    async fn delete_property(&self, id: i64) -> Result<()> {
        let url = self.url(&format!("{PROPERTY_PATH}/{id}"));
        debug!("DELETE {}", url);
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }

    async fn search_properties(&self, params: &[(String, String)]) -> Result<Vec<Value>> {
        let url = self.url(&format!("{PROPERTY_PATH}/search"));
        debug!("GET {} {:?}", url, params);
        let body = self.send(self.client.get(&url).query(params)).await?;
        let envelope: SearchEnvelope = serde_json::from_value(body)?;
        Ok(envelope.into_records())
    }

    async fn upload_property_images(&self, id: i64, files: &[UploadFile]) -> Result<Value> {
        let mut form = Form::new();
        for file in files {
            form = form.part("images", file_part(file)?);
        }
        let url = self.url(&format!("{PROPERTY_PATH}/uploadImages/{id}"));
        debug!("POST {} ({} file(s))", url, files.len());
        self.send(self.client.post(&url).multipart(form)).await
    }
}

#[async_trait]
impl UserApi for AdminClient {
    async fn get_all_users(&self) -> Result<Vec<User>> {
        let body = self
            .get_json(&format!("{ACCOUNT_PATH}/GetAllUserSystem"))
            .await?;
        let envelope: UserListEnvelope = serde_json::from_value(body)?;
        let users = envelope.into_users();
        info!("Fetched {} users", users.len());
        Ok(users)
    }

    async fn get_user_by_id(&self, id: &str) -> Result<User> {
        let body = self
            .get_json(&format!("{ACCOUNT_PATH}/GetUserById/{id}"))
            .await?;
        unwrap_user(body)
    }

    async fn update_user_status(&self, id: &str, status: &str) -> Result<()> {
        let url = self.url(&format!("{ACCOUNT_PATH}/UpdateUserStatus/{id}"));
        debug!("PUT {}", url);
        self.send(self.client.put(&url).json(&json!({ "status": status })))
            .await?;
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("{ACCOUNT_PATH}/DeleteUser/{id}"));
        debug!("DELETE {}", url);
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }

    async fn register_user(&self, draft: &NewUser) -> Result<RegistrationOutcome> {
        draft.validate()?;
        let body = self
            .post_json(&format!("{ACCOUNT_PATH}/RegisterNewUser"), draft)
            .await?;
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("User registered successfully")
            .to_string();
        info!("Registered user {}", draft.phone_number);
        Ok(RegistrationOutcome {
            success: true,
            message,
        })
    }
}

#[async_trait]
impl LookupApi<City> for AdminClient {
    async fn get_all(&self) -> Result<Vec<City>> {
        self.lookup_all(&format!("{CITY_PATH}/getAllCities")).await
    }

    async fn get_by_id(&self, id: i64) -> Result<City> {
        self.lookup_one(&format!("{CITY_PATH}/getCitiesById/{id}"))
            .await
    }

    async fn add(&self, draft: &NewCity) -> Result<Value> {
        City::validate_draft(draft)?;
        self.post_json(&format!("{CITY_PATH}/addNewCities"), draft)
            .await
    }
}

#[async_trait]
impl LookupApi<PropertyType> for AdminClient {
    async fn get_all(&self) -> Result<Vec<PropertyType>> {
        self.lookup_all(&format!("{TYPE_PROPERTY_PATH}/getAllTypeProperty"))
            .await
    }

    async fn get_by_id(&self, id: i64) -> Result<PropertyType> {
        self.lookup_one(&format!("{TYPE_PROPERTY_PATH}/getTypePropertyById/{id}"))
            .await
    }

    async fn add(&self, draft: &NewPropertyType) -> Result<Value> {
        PropertyType::validate_draft(draft)?;
        self.post_json(&format!("{TYPE_PROPERTY_PATH}/addTypeProperty"), draft)
            .await
    }
}

#[async_trait]
impl AuthApi for AdminClient {
    async fn login(&self, phone_number: &str, password: &str) -> Result<Value> {
        let url = self.url(&format!("{ACCOUNT_PATH}/Login"));
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "PhoneNumber": phone_number, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = read_json(response).await.unwrap_or(Value::Null);
            warn!("Login failed: {} {}", status, body);
            return Err(Error::LoginRejected {
                status: status.as_u16(),
            });
        }
        read_json(response).await
    }
}

#[async_trait]
impl InvestmentApi for AdminClient {
    async fn add_investment(&self, draft: &NewInvestment) -> Result<Value> {
        draft.validate()?;
        self.post_json(&format!("{INVESTMENT_PATH}/addNewInvestment"), draft)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> AdminClient {
        AdminClient::new(server.base_url()).expect("failed to create test client")
    }

    #[tokio::test]
    async fn test_get_all_properties_unwraps_data_envelope() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/Property/getAllProperty");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"data": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]}));
        });

        let records = client_for(&server).get_all_properties().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["title"], "B");
        mock.assert();
    }

    #[tokio::test]
    async fn test_http_error_maps_to_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/Property/getPropertyById/9");
            then.status(404).body("Not Found");
        });

        let err = client_for(&server).get_property_by_id(9).await.unwrap_err();

        match err {
            Error::Api { status, ref reason, ref body } => {
                assert_eq!(status, 404);
                assert_eq!(reason, "Not Found");
                assert!(body.is_null());
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_backend_message_becomes_reason() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/City/addNewCities");
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({"message": "City already exists"}));
        });

        let err = LookupApi::<City>::add(&client_for(&server), &NewCity::new("Riyadh"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "API request failed: City already exists");
    }

    #[tokio::test]
    async fn test_invalid_city_is_not_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/City/addNewCities");
            then.status(200);
        });

        let err = LookupApi::<City>::add(&client_for(&server), &NewCity::new("x"))
            .await
            .unwrap_err();

        assert!(err.validation().is_some());
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn test_create_property_posts_multipart_form() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/Property/addNewProperty")
                .header_exists("content-type");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"id": 77, "title": "Loft", "price": 100}));
        });

        let draft = NewProperty {
            title: "Loft".into(),
            type_property_id: 1,
            files: vec![UploadFile::new("front.jpg", vec![0xff, 0xd8])],
            ..NewProperty::default()
        };
        let created = client_for(&server).create_property(&draft).await.unwrap();

        assert_eq!(created["id"], 77);
        mock.assert();
    }

    #[tokio::test]
    async fn test_login_body_and_rejection() {
        let server = MockServer::start();
        let ok = server.mock(|when, then| {
            when.method(POST)
                .path("/api/Account/Login")
                .json_body(json!({"PhoneNumber": "0500", "password": "Secret#1"}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"user": {"id": "7"}}));
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/Account/Login")
                .json_body(json!({"PhoneNumber": "0500", "password": "wrong"}));
            then.status(401);
        });

        let client = client_for(&server);
        let body = client.login("0500", "Secret#1").await.unwrap();
        assert_eq!(body["user"]["id"], "7");
        ok.assert();

        let err = client.login("0500", "wrong").await.unwrap_err();
        assert!(matches!(err, Error::LoginRejected { status: 401 }));
    }

    #[tokio::test]
    async fn test_users_and_lookups() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/Account/GetAllUserSystem");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"success": true, "data": [{"id": "u1", "kycStatus": "pending"}]}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/TypeProperty/getTypePropertyById/2");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"id": 2, "name": "House"}));
        });
        server.mock(|when, then| {
            when.method(DELETE).path("/api/Account/DeleteUser/u1");
            then.status(204);
        });

        let client = client_for(&server);
        let users = client.get_all_users().await.unwrap();
        assert_eq!(users[0].kyc_status, "pending");

        let kind = LookupApi::<PropertyType>::get_by_id(&client, 2).await.unwrap();
        assert_eq!(kind.name, "House");

        client.delete_user("u1").await.unwrap();
    }

    #[tokio::test]
    async fn test_search_passes_query_parameters() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/Property/search")
                .query_param("location", "Riyadh");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([{"id": 4}]));
        });

        let params = vec![("location".to_string(), "Riyadh".to_string())];
        let records = client_for(&server).search_properties(&params).await.unwrap();

        assert_eq!(records, vec![json!({"id": 4})]);
        mock.assert();
    }

    #[tokio::test]
    async fn test_register_user_reads_backend_message() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/Account/RegisterNewUser")
                .json_body(json!({
                    "phoneNumber": "0501234567",
                    "password": "Secret#1",
                    "email": "new@example.com",
                    "name": "New Admin",
                    "userType": 1
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"message": "Account created"}));
        });

        let draft = NewUser {
            phone_number: "0501234567".into(),
            password: "Secret#1".into(),
            email: "new@example.com".into(),
            name: "New Admin".into(),
            ..NewUser::default()
        };
        let outcome = client_for(&server).register_user(&draft).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.message, "Account created");
        mock.assert();
    }

    #[tokio::test]
    async fn test_invalid_user_is_not_registered() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/Account/RegisterNewUser");
            then.status(200);
        });

        let draft = NewUser {
            phone_number: "call me".into(),
            password: "weak".into(),
            email: "nobody".into(),
            name: "N".into(),
            ..NewUser::default()
        };
        let err = client_for(&server).register_user(&draft).await.unwrap_err();

        let fields = err.validation().unwrap();
        assert!(fields.get("phoneNumber").is_some());
        assert!(fields.get("email").is_some());
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn test_update_user_status_puts_status() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/Account/UpdateUserStatus/u1")
                .json_body(json!({"status": "active"}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"success": true}));
        });

        client_for(&server)
            .update_user_status("u1", "active")
            .await
            .unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_update_user_status_surfaces_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/api/Account/UpdateUserStatus/u1");
            then.status(500);
        });

        let result = client_for(&server).update_user_status("u1", "active").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_add_investment_posts_camel_case() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/Investment/addNewInvestment")
                .json_body(json!({
                    "title": "Tower A",
                    "description": "Office floors",
                    "totalShares": 40,
                    "sharePrice": 250.0,
                    "availableShares": 20,
                    "durationByMonths": 24,
                    "propertyId": 9,
                    "userId": "u-1"
                }));
            then.status(201);
        });

        let draft = NewInvestment {
            title: "Tower A".into(),
            description: "Office floors".into(),
            total_shares: 40,
            share_price: 250.0,
            available_shares: 20,
            duration_by_months: 24,
            property_id: 9,
            user_id: "u-1".into(),
        };
        let body = client_for(&server).add_investment(&draft).await.unwrap();

        assert!(body.is_null());
        mock.assert();
    }

    #[tokio::test]
    async fn test_upload_images_and_update() {
        let server = MockServer::start();
        let upload = server.mock(|when, then| {
            when.method(POST).path("/api/Property/uploadImages/5");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"uploaded": 2}));
        });
        let update = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/Property/5")
                .json_body(json!({"price": 1000}));
            then.status(204);
        });

        let client = client_for(&server);
        let files = vec![
            UploadFile::new("a.png", vec![1, 2, 3]),
            UploadFile::new("b.webp", vec![4]),
        ];
        let body = client.upload_property_images(5, &files).await.unwrap();
        assert_eq!(body["uploaded"], 2);

        let body = client.update_property(5, &json!({"price": 1000})).await.unwrap();
        assert!(body.is_null());

        upload.assert();
        update.assert();
    }

    #[tokio::test]
    async fn test_network_error_when_nothing_listens() {
        let client = AdminClient::new("http://127.0.0.1:9").unwrap();
        let err = client.get_all_properties().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(err.to_string().starts_with("Network error: "));
    }
}
