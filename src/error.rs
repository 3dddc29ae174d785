//! Error types for estate-admin.
//!
//! Transport and HTTP failures are surfaced to callers; malformed payloads are
//! coerced to defaults by the parsing layer and never show up here.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type used across the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for estate-admin operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Backend Errors ===
    /// The backend answered with a non-success status.
    #[error("API request failed: {reason}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase or backend-provided message.
        reason: String,
        /// Error body, `null` when it was not JSON.
        body: serde_json::Value,
    },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response was well-formed JSON but not the expected shape.
    #[error("invalid response payload: {0}")]
    Payload(String),

    /// The backend rejected the login attempt.
    #[error("login rejected with status {status}")]
    LoginRejected {
        /// HTTP status code.
        status: u16,
    },

    // === Input Errors ===
    /// A draft failed client-side validation.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Session Errors ===
    /// Reading or writing the persisted session failed.
    #[error("session storage error at {path}: {source}")]
    Session {
        /// Path of the session file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Reading a local file failed.
    #[error("failed to read {path}: {source}")]
    File {
        /// Path of the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An operation-level message wrapped around a lower-level failure.
    #[error("{context}: {source}")]
    Context {
        /// What was being attempted.
        context: String,
        /// The failure underneath.
        #[source]
        source: Box<Error>,
    },
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Wrap this error with an operation-level message.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// HTTP status of the innermost backend error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::LoginRejected { status } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            Self::Context { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Field errors when this is (or wraps) a validation failure.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Context { source, .. } => source.validation(),
            _ => None,
        }
    }
}

/// Field-keyed validation messages collected from a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`, replacing any earlier one.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    /// Message recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(())` when nothing was recorded, the validation error otherwise.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_message_wraps_cause() {
        let err = Error::Api {
            status: 500,
            reason: "Internal Server Error".to_string(),
            body: serde_json::Value::Null,
        }
        .context("Failed to fetch properties");

        assert_eq!(
            err.to_string(),
            "Failed to fetch properties: API request failed: Internal Server Error"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_validation_errors_display_in_field_order() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "Title is required");
        errors.add("area", "Area must be greater than 0");

        assert_eq!(
            errors.to_string(),
            "area: Area must be greater than 0; title: Title is required"
        );
        assert!(errors.clone().into_result().is_err());
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_validation_is_found_through_context() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Name is required");
        let err = Error::Validation(errors).context("Failed to add city");

        assert_eq!(
            err.validation().and_then(|v| v.get("name")),
            Some("Name is required")
        );
    }
}
