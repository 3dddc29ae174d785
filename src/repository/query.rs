//! The "get all properties" use case: fetch, filter, sort, limit.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Property;
use crate::repository::PropertyRepository;

/// Field a property list can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    Price,
    Area,
    Bedrooms,
    Bathrooms,
    Title,
    #[default]
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "price" => Ok(Self::Price),
            "area" => Ok(Self::Area),
            "bedrooms" => Ok(Self::Bedrooms),
            "bathrooms" => Ok(Self::Bathrooms),
            "title" => Ok(Self::Title),
            "createdat" | "date" => Ok(Self::CreatedAt),
            other => Err(Error::Payload(format!("unknown sort field: {other}"))),
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(Error::Payload(format!("unknown sort order: {other}"))),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Price => "price",
            Self::Area => "area",
            Self::Bedrooms => "bedrooms",
            Self::Bathrooms => "bathrooms",
            Self::Title => "title",
            Self::CreatedAt => "createdAt",
        })
    }
}

impl SortField {
    fn compare(self, a: &Property, b: &Property) -> Ordering {
        match self {
            Self::Price => a.price.total_cmp(&b.price),
            Self::Area => a.area.total_cmp(&b.area),
            Self::Bedrooms => a.bedrooms.cmp(&b.bedrooms),
            Self::Bathrooms => a.bathrooms.cmp(&b.bathrooms),
            Self::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            Self::CreatedAt => a.created_at.to_lowercase().cmp(&b.created_at.to_lowercase()),
        }
    }
}

/// Stable sort in place. Descending reverses the comparison so equal
/// elements keep their input order in both directions.
pub fn sort_properties(properties: &mut [Property], field: SortField, order: SortOrder) {
    properties.sort_by(|a, b| match order {
        SortOrder::Asc => field.compare(a, b),
        SortOrder::Desc => field.compare(b, a),
    });
}

/// Options for [`GetAllProperties::execute`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyQuery {
    pub only_available: bool,
    pub property_type: Option<String>,
    pub limit: Option<usize>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

/// Per-call changes to a [`PropertyQuery`]. Unset fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyQueryOverrides {
    pub only_available: Option<bool>,
    pub property_type: Option<String>,
    pub limit: Option<usize>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl PropertyQuery {
    /// Copy of this query with `overrides` laid over it.
    pub fn merged(&self, overrides: &PropertyQueryOverrides) -> PropertyQuery {
        PropertyQuery {
            only_available: overrides.only_available.unwrap_or(self.only_available),
            property_type: overrides
                .property_type
                .clone()
                .or_else(|| self.property_type.clone()),
            limit: overrides.limit.or(self.limit),
            sort_by: overrides.sort_by.unwrap_or(self.sort_by),
            sort_order: overrides.sort_order.unwrap_or(self.sort_order),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyStatistics {
    pub total: usize,
    pub available: usize,
    pub average_price: f64,
    pub property_types: BTreeMap<String, usize>,
    pub price_range: PriceRange,
}

impl PropertyStatistics {
    pub fn from_properties(properties: &[Property]) -> Self {
        if properties.is_empty() {
            return Self::default();
        }

        let total_price: f64 = properties.iter().map(|p| p.price).sum();
        let mut property_types = BTreeMap::new();
        for property in properties {
            let name = if property.property_type.is_empty() {
                "Unknown"
            } else {
                property.property_type.as_str()
            };
            *property_types.entry(name.to_string()).or_insert(0) += 1;
        }

        Self {
            total: properties.len(),
            available: properties.iter().filter(|p| p.is_available()).count(),
            average_price: (total_price / properties.len() as f64).round(),
            property_types,
            price_range: price_range(properties),
        }
    }
}

/// Lowest and highest positive price; zeroes when no listing has one.
pub fn price_range(properties: &[Property]) -> PriceRange {
    let mut prices = properties.iter().map(|p| p.price).filter(|&price| price > 0.0);
    let Some(first) = prices.next() else {
        return PriceRange::default();
    };
    prices.fold(PriceRange { min: first, max: first }, |range, price| PriceRange {
        min: range.min.min(price),
        max: range.max.max(price),
    })
}

/// Fetch listings and shape them according to a [`PropertyQuery`].
#[derive(Clone)]
pub struct GetAllProperties {
    repository: PropertyRepository,
}

impl GetAllProperties {
    pub fn new(repository: PropertyRepository) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, query: &PropertyQuery) -> Result<Vec<Property>> {
        let properties = self
            .repository
            .get_all_properties()
            .await
            .map_err(|err| err.context("Failed to get properties"))?;
        Ok(apply_query(properties, query))
    }

    pub fn statistics(properties: &[Property]) -> PropertyStatistics {
        PropertyStatistics::from_properties(properties)
    }

    /// Listings priced within `min..=max`.
    pub fn by_price_range(properties: &[Property], min: f64, max: f64) -> Vec<Property> {
        properties
            .iter()
            .filter(|p| p.price >= min && p.price <= max)
            .cloned()
            .collect()
    }

    /// Listings whose location contains `location`, ignoring case.
    pub fn by_location(properties: &[Property], location: &str) -> Vec<Property> {
        let needle = location.to_lowercase();
        properties
            .iter()
            .filter(|p| p.location.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

pub fn apply_query(mut properties: Vec<Property>, query: &PropertyQuery) -> Vec<Property> {
    if query.only_available {
        properties.retain(Property::is_available);
    }
    if let Some(kind) = &query.property_type {
        properties.retain(|p| p.property_type.eq_ignore_ascii_case(kind));
    }

    sort_properties(&mut properties, query.sort_by, query.sort_order);

    if let Some(limit) = query.limit.filter(|&limit| limit > 0) {
        properties.truncate(limit);
    }
    debug!(
        "Query by {} {:?} left {} properties",
        query.sort_by,
        query.sort_order,
        properties.len()
    );
    properties
}
