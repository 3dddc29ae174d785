use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationErrors};
use crate::models::lenient;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+\-\s()]+$").expect("valid phone pattern"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// A platform account as returned by the user endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(deserialize_with = "lenient::text")]
    pub user_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub phone_number: String,
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub kyc_status: String,
    #[serde(deserialize_with = "lenient::text")]
    pub created_at: String,
    #[serde(deserialize_with = "lenient::text")]
    pub last_login_at: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub email_confirmed: bool,
    #[serde(deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub total_investments: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl User {
    /// Name to show in lists: full name, then user name, then phone.
    pub fn display_name(&self) -> &str {
        [&self.name, &self.user_name, &self.phone_number]
            .into_iter()
            .find(|s| !s.is_empty())
            .map_or("", String::as_str)
    }
}

/// Aggregate counts shown above the user list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStatistics {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub inactive: usize,
    pub premium: usize,
}

impl UserStatistics {
    pub fn from_users(users: &[User]) -> Self {
        let kyc_in = |user: &User, states: &[&str]| states.contains(&user.kyc_status.as_str());
        Self {
            total: users.len(),
            active: users.iter().filter(|&u| kyc_in(u, &["approved", "active"])).count(),
            pending: users.iter().filter(|&u| kyc_in(u, &["pending"])).count(),
            inactive: users.iter().filter(|&u| kyc_in(u, &["rejected", "inactive"])).count(),
            premium: users
                .iter()
                .filter(|u| u.role.as_deref() == Some("premium"))
                .count(),
        }
    }
}

/// Registration request for a new account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub phone_number: String,
    pub password: String,
    pub email: String,
    pub name: String,
    pub user_type: i64,
}

impl Default for NewUser {
    fn default() -> Self {
        Self {
            phone_number: String::new(),
            password: String::new(),
            email: String::new(),
            name: String::new(),
            user_type: 1,
        }
    }
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();

        if self.phone_number.trim().is_empty() {
            errors.add("phoneNumber", "Phone number is required");
        } else if !PHONE_RE.is_match(&self.phone_number) {
            errors.add("phoneNumber", "Please enter a valid phone number");
        }

        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else {
            let mut problems = Vec::new();
            if self.password.chars().all(|c| c.is_ascii_alphanumeric()) {
                problems.push("Passwords must have at least one non alphanumeric character.");
            }
            if !self.password.chars().any(|c| c.is_ascii_lowercase()) {
                problems.push("Passwords must have at least one lowercase (a-z).");
            }
            if !self.password.chars().any(|c| c.is_ascii_uppercase()) {
                problems.push("Passwords must have at least one uppercase (A-Z).");
            }
            if !problems.is_empty() {
                errors.add("password", problems.join(" "));
            }
        }

        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !EMAIL_RE.is_match(&self.email) {
            errors.add("email", "Please enter a valid email address");
        }

        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        } else if self.name.trim().chars().count() < 2 {
            errors.add("name", "Name must be at least 2 characters");
        }

        errors.into_result()
    }
}

/// What the registration endpoint reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub success: bool,
    pub message: String,
}
