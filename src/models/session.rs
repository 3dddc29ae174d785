use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::lenient;

/// The signed-in administrator, as kept between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub phone_number: String,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl SessionUser {
    /// Build the session user from a login response.
    ///
    /// The backend sometimes nests the account under `user` and sometimes
    /// returns it flat; missing fields fall back to what was typed at login.
    pub fn from_login_response(response: &Value, entered_phone: &str) -> Self {
        let user = response
            .get("user")
            .filter(|u| u.is_object())
            .unwrap_or(response);

        let roles = lenient::first_text_list(user, &["roles"]);
        let role = lenient::first_text(user, &["role"])
            .or_else(|| roles.as_ref().and_then(|r| r.first().cloned()))
            .unwrap_or_else(|| "admin".to_string());
        let user_name = lenient::first_text(user, &["userName"]);

        Self {
            id: lenient::first_text(user, &["id", "userId"]).unwrap_or_else(|| "1".to_string()),
            phone_number: lenient::first_text(user, &["phoneNumber", "userName"])
                .unwrap_or_else(|| entered_phone.to_string()),
            email: lenient::first_text(user, &["email"]).unwrap_or_default(),
            role,
            name: Some(
                lenient::first_text(user, &["name", "fullName", "userName"])
                    .unwrap_or_else(|| entered_phone.to_string()),
            ),
            user_name,
            roles,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.phone_number)
    }
}

/// What gets persisted for a signed-in administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: SessionUser,
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: SessionUser) -> Self {
        Self {
            user,
            logged_in_at: Utc::now(),
        }
    }
}
