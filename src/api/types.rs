//! Response envelopes.
//!
//! List endpoints do not agree on a wrapper: some return a bare array, some
//! `{data: [...]}`, the property list occasionally `{properties: [...]}` or
//! even a single object. Each shape is a variant here instead of being
//! sniffed at every call site.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{lenient, User};

/// Property list response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PropertyListEnvelope {
    Bare(Vec<Value>),
    Data { data: Vec<Value> },
    Properties { properties: Vec<Value> },
    Other(Value),
}

impl PropertyListEnvelope {
    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::Bare(records) | Self::Data { data: records } => records,
            Self::Properties { properties } => properties,
            Self::Other(value) => {
                if ["id", "title", "name"]
                    .iter()
                    .any(|key| lenient::is_truthy(&value, key))
                {
                    vec![value]
                } else {
                    warn!("Unexpected property list response structure: {}", value);
                    Vec::new()
                }
            }
        }
    }
}

/// Property search response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchEnvelope {
    Bare(Vec<Value>),
    Data { data: Vec<Value> },
    Other(Value),
}

impl SearchEnvelope {
    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::Bare(records) | Self::Data { data: records } => records,
            Self::Other(_) => Vec::new(),
        }
    }
}

/// User list response, with or without a `success` flag.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserListEnvelope {
    Bare(Vec<Value>),
    Data { data: Vec<Value> },
    Other(Value),
}

impl UserListEnvelope {
    /// Users in the response. Entries that are not objects are dropped.
    pub fn into_users(self) -> Vec<User> {
        let records = match self {
            Self::Bare(records) | Self::Data { data: records } => records,
            Self::Other(value) => {
                warn!("Unexpected user list response format: {}", value);
                return Vec::new();
            }
        };
        records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<User>(record) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!("Skipping unreadable user record: {}", err);
                    None
                }
            })
            .collect()
    }
}

/// Single user response: the user itself or `{data: user}`.
pub fn unwrap_user(value: Value) -> Result<User> {
    let record = if lenient::is_truthy(&value, "id") {
        value
    } else {
        match value.get("data") {
            Some(data) if lenient::is_truthy(data, "id") => data.clone(),
            _ => return Err(Error::Payload("Invalid user data format".to_string())),
        }
    };
    Ok(serde_json::from_value(record)?)
}

/// `data` when the response wraps its payload, the response otherwise.
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
