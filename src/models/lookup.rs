//! Small `{id, name}` reference records: cities and property types.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationErrors};
use crate::models::lenient;

/// A reference record that can be looked up by id and cached.
pub trait LookupRecord: Clone + Send + Sync + 'static {
    /// Payload sent to create a new record.
    type Draft: Serialize + Send + Sync;

    /// Human-readable kind, used in log lines and error context.
    const KIND: &'static str;

    /// Name reported when a lookup yields nothing.
    const UNKNOWN_NAME: &'static str;

    fn id(&self) -> i64;

    fn name(&self) -> &str;

    fn validate_draft(draft: &Self::Draft) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct City {
    #[serde(deserialize_with = "lenient::opt_integer_or_zero")]
    pub id: i64,
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub country: Option<String>,
    #[serde(deserialize_with = "lenient::opt_integer")]
    pub country_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyType {
    #[serde(deserialize_with = "lenient::opt_integer_or_zero")]
    pub id: i64,
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
}

/// New city. The platform only operates in one country, so `country_id`
/// defaults to 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCity {
    pub name: String,
    pub country_id: i64,
}

impl NewCity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country_id: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPropertyType {
    pub name: String,
}

impl NewPropertyType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

fn check_name(label: &str, name: &str, max: usize) -> Result<()> {
    let mut errors = ValidationErrors::new();
    let len = name.trim().chars().count();
    if len == 0 {
        errors.add("name", format!("{label} name is required"));
    } else if len < 2 {
        errors.add("name", format!("{label} name must be at least 2 characters"));
    } else if len > max {
        errors.add("name", format!("{label} name must be less than {max} characters"));
    }
    errors.into_result()
}

impl LookupRecord for City {
    type Draft = NewCity;
    const KIND: &'static str = "city";
    const UNKNOWN_NAME: &'static str = "Unknown City";

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate_draft(draft: &NewCity) -> Result<()> {
        check_name("City", &draft.name, 100)
    }
}

impl LookupRecord for PropertyType {
    type Draft = NewPropertyType;
    const KIND: &'static str = "property type";
    const UNKNOWN_NAME: &'static str = "Unknown Property Type";

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate_draft(draft: &NewPropertyType) -> Result<()> {
        check_name("Property type", &draft.name, 50)
    }
}
