use std::fmt;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result, ValidationErrors};
use crate::format::{format_currency, plain_number};
use crate::models::lenient;

/// Property type names keyed by the backend's `typePropertyId`.
const PROPERTY_TYPE_NAMES: [(i64, &str); 5] = [
    (1, "Apartment"),
    (2, "House"),
    (3, "Villa"),
    (4, "Commercial"),
    (5, "Land"),
];

/// A listing as the admin client sees it.
///
/// Built from whatever the backend returns via [`Property::from_api_response`],
/// which never fails: missing fields fall back to defaults and the result can be
/// checked with [`Property::is_valid`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub city_id: Option<i64>,
    pub type_property_id: Option<i64>,
    pub property_type: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area: f64,
    pub images: Vec<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub owner: Option<Value>,
    pub features: Vec<String>,
    pub amenities: Vec<String>,
}

/// Record shape the property endpoints return, with every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProperty {
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    nearby: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    city_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    type_property_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    property_type: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::opt_text")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    type_property: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    bedrooms: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    bathrooms: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    area: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    square_feet: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_text_list")]
    images: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_text_list")]
    photos: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_text_list")]
    images_property: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    updated_at: Option<String>,
    #[serde(default)]
    owner: Option<Value>,
    #[serde(default, deserialize_with = "lenient::opt_text_list")]
    features: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_text_list")]
    amenities: Option<Vec<String>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|n| *n != 0.0)
}

fn count(value: Option<i64>) -> u32 {
    value.and_then(|n| u32::try_from(n).ok()).unwrap_or(0)
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

impl RawProperty {
    fn resolved_type(&self) -> String {
        non_empty(self.property_type.clone())
            .or_else(|| non_empty(self.kind.clone()))
            .or_else(|| non_empty(self.type_property.clone()))
            .unwrap_or_else(|| {
                self.type_property_id
                    .filter(|id| *id != 0)
                    .map_or("Unknown", Property::property_type_name)
                    .to_string()
            })
    }

    fn into_property(self) -> Property {
        let property_type = self.resolved_type();
        Property {
            id: self.id.unwrap_or(0),
            title: non_empty(self.title).or(self.name).unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            price: self.price.unwrap_or(0.0),
            location: non_empty(self.location)
                .or_else(|| non_empty(self.nearby))
                .unwrap_or_default(),
            city_id: self.city_id,
            type_property_id: self.type_property_id,
            property_type,
            bedrooms: count(self.bedrooms),
            bathrooms: count(self.bathrooms),
            area: non_zero(self.area).or(self.square_feet).unwrap_or(0.0),
            images: self
                .images
                .or(self.photos)
                .or(self.images_property)
                .unwrap_or_default(),
            status: non_empty(self.status).unwrap_or_else(|| "available".to_string()),
            created_at: non_empty(self.created_at).unwrap_or_else(now_rfc3339),
            updated_at: self.updated_at,
            owner: self.owner.filter(|o| !o.is_null()),
            features: self.features.unwrap_or_default(),
            amenities: self.amenities.unwrap_or_default(),
        }
    }
}

impl Property {
    /// Display name for a backend property type id.
    pub fn property_type_name(type_property_id: i64) -> &'static str {
        PROPERTY_TYPE_NAMES
            .iter()
            .find(|(id, _)| *id == type_property_id)
            .map_or("Unknown", |(_, name)| *name)
    }

    /// Build a property from one backend record. Never fails.
    pub fn from_api_response(data: &Value) -> Self {
        if !data.is_object() {
            warn!("Property record is not an object, using fallback");
            return Self::fallback(data);
        }
        match RawProperty::deserialize(data) {
            Ok(raw) => {
                let property = raw.into_property();
                debug!(
                    id = property.id,
                    property_type = %property.property_type,
                    valid = property.is_valid(),
                    "Parsed property record"
                );
                property
            }
            Err(err) => {
                warn!("Unreadable property record, using fallback: {}", err);
                Self::fallback(data)
            }
        }
    }

    /// Loose reading of a record that could not be read structurally.
    ///
    /// A missing id is replaced with a random one so the entry stays addressable.
    fn fallback(data: &Value) -> Self {
        let type_property_id = lenient::first_integer(data, &["typePropertyId"]);
        Self {
            id: lenient::first_integer(data, &["id"])
                .unwrap_or_else(|| (Uuid::new_v4().as_u128() % 1_000_000) as i64),
            title: lenient::first_text(data, &["title", "name"])
                .unwrap_or_else(|| "Unknown Property".to_string()),
            description: lenient::first_text(data, &["description"]).unwrap_or_default(),
            price: lenient::first_number(data, &["price"]).unwrap_or(0.0),
            location: lenient::first_text(data, &["location", "nearby"]).unwrap_or_default(),
            city_id: lenient::first_integer(data, &["cityId"]),
            type_property_id,
            property_type: lenient::first_text(data, &["propertyType", "type", "typeProperty"])
                .unwrap_or_else(|| {
                    type_property_id
                        .map_or("Unknown", Self::property_type_name)
                        .to_string()
                }),
            bedrooms: count(lenient::first_integer(data, &["bedrooms"])),
            bathrooms: count(lenient::first_integer(data, &["bathrooms"])),
            area: lenient::first_number(data, &["area", "squareFeet"]).unwrap_or(0.0),
            images: lenient::first_text_list(data, &["images", "photos", "imagesProperty"])
                .unwrap_or_default(),
            status: lenient::first_text(data, &["status"])
                .unwrap_or_else(|| "available".to_string()),
            created_at: lenient::first_text(data, &["createdAt"]).unwrap_or_else(now_rfc3339),
            updated_at: lenient::first_text(data, &["updatedAt"]),
            owner: data.get("owner").filter(|o| !o.is_null()).cloned(),
            features: lenient::first_text_list(data, &["features"]).unwrap_or_default(),
            amenities: lenient::first_text_list(data, &["amenities"]).unwrap_or_default(),
        }
    }

    /// Whether the record carries the fields a listing needs to be shown.
    pub fn is_valid(&self) -> bool {
        self.id != 0
            && !self.title.is_empty()
            && self.price != 0.0
            && !self.price.is_nan()
            && !self.property_type.is_empty()
    }

    pub fn status_kind(&self) -> PropertyStatus {
        self.status.parse().unwrap_or(PropertyStatus::Other(String::new()))
    }

    pub fn is_available(&self) -> bool {
        matches!(
            self.status_kind(),
            PropertyStatus::Available | PropertyStatus::Active
        )
    }

    pub fn formatted_price(&self) -> String {
        format_currency(self.price)
    }

    /// `3 bed, 2 bath • 1200 sq ft`
    pub fn summary(&self) -> String {
        format!(
            "{} bed, {} bath • {} sq ft",
            self.bedrooms,
            self.bathrooms,
            plain_number(self.area)
        )
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Plain camelCase object with every field.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Listing status.
///
/// The backend sends either names (`"available"`) or numeric codes (`"1"`).
/// Numeric codes are read as `1 Available, 2 Pending, 3 Sold, 4 Rented,
/// 5 Inactive`; upstream pages disagree on what code 1 means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyStatus {
    Available,
    Active,
    Pending,
    Sold,
    Rented,
    Inactive,
    Other(String),
}

impl PropertyStatus {
    /// Status for a numeric status code.
    pub fn from_code(code: u8) -> Self {
        debug!(code, "Mapping numeric property status code");
        match code {
            1 => Self::Available,
            2 => Self::Pending,
            3 => Self::Sold,
            4 => Self::Rented,
            5 => Self::Inactive,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Available => "Available",
            Self::Active => "Active",
            Self::Pending => "Pending",
            Self::Sold => "Sold",
            Self::Rented => "Rented",
            Self::Inactive => "Inactive",
            Self::Other(raw) if raw.is_empty() => "Unknown",
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// Badge colour classes for the property card.
    pub fn badge_class(&self) -> &'static str {
        match self {
            Self::Available | Self::Active => "bg-success text-white",
            Self::Pending => "bg-warning text-white",
            Self::Sold | Self::Rented => "bg-gray-500 text-white",
            Self::Inactive => "bg-error text-white",
            Self::Other(_) => "bg-gray-400 text-white",
        }
    }
}

impl std::str::FromStr for PropertyStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Ok(Self::from_code(code));
        }
        Ok(match trimmed.to_lowercase().as_str() {
            "available" => Self::Available,
            "active" => Self::Active,
            "pending" => Self::Pending,
            "sold" => Self::Sold,
            "rented" => Self::Rented,
            "inactive" => Self::Inactive,
            _ => Self::Other(trimmed.to_string()),
        })
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A file attached to a property form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| Error::File {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Add-property form contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub original_price: f64,
    pub discount: f64,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub area: f64,
    pub parking: i64,
    pub latitude: String,
    pub longitude: String,
    pub nearby: String,
    pub city_id: i64,
    pub type_property_id: i64,
    pub user_id: String,
    pub files: Vec<UploadFile>,
}

impl NewProperty {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", "Title is required");
        }
        if self.description.trim().is_empty() {
            errors.add("description", "Description is required");
        }
        if self.price <= 0.0 {
            errors.add("price", "Price must be greater than 0");
        }
        if self.bedrooms < 0 {
            errors.add("bedrooms", "Bedrooms cannot be negative");
        }
        if self.bathrooms < 0 {
            errors.add("bathrooms", "Bathrooms cannot be negative");
        }
        if self.area <= 0.0 {
            errors.add("area", "Area must be greater than 0");
        }
        if self.latitude.trim().is_empty() {
            errors.add("latitude", "Latitude is required");
        }
        if self.longitude.trim().is_empty() {
            errors.add("longitude", "Longitude is required");
        }
        if self.nearby.trim().is_empty() {
            errors.add("nearby", "Nearby location is required");
        }
        if self.city_id <= 0 {
            errors.add("cityId", "City is required");
        }
        if self.type_property_id <= 0 {
            errors.add("typePropertyId", "Property type is required");
        }
        if self.user_id.trim().is_empty() {
            errors.add("userId", "User ID is required");
        }
        errors.into_result()
    }

    /// Text parts of the multipart form, keyed the way the backend binds them.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Title", self.title.clone()),
            ("Description", self.description.clone()),
            ("Price", plain_number(self.price)),
            ("OriginalPrice", plain_number(self.original_price)),
            ("Discount", plain_number(self.discount)),
            ("Bedrooms", self.bedrooms.to_string()),
            ("Bathrooms", self.bathrooms.to_string()),
            ("Area", plain_number(self.area)),
            ("Parking", self.parking.to_string()),
            ("Latitude", self.latitude.clone()),
            ("Longitude", self.longitude.clone()),
            ("Nearby", self.nearby.clone()),
            ("CityId", self.city_id.to_string()),
            ("TypePropertyId", self.type_property_id.to_string()),
            ("UserId", self.user_id.clone()),
        ]
    }
}
