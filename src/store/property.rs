use tracing::{debug, error, info};

use crate::error::Result;
use crate::models::Property;
use crate::repository::{
    price_range, sort_properties, GetAllProperties, PriceRange, PropertyQuery,
    PropertyQueryOverrides, PropertyRepository, PropertyStatistics, SortField, SortOrder,
};

/// Criteria for [`PropertyStore::filter`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    /// Exact type name.
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Case-insensitive substring of the location.
    pub location: Option<String>,
    pub only_available: bool,
}

impl PropertyFilter {
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(kind) = self.property_type.as_deref().filter(|k| !k.is_empty()) {
            if property.property_type != kind {
                return false;
            }
        }
        if let Some(min) = self.min_price.filter(|&min| min != 0.0) {
            if property.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price.filter(|&max| max != 0.0) {
            if property.price > max {
                return false;
            }
        }
        if let Some(location) = self.location.as_deref().filter(|l| !l.is_empty()) {
            if !property
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        !self.only_available || property.is_available()
    }
}

/// Property list state: the listings plus loading and error flags.
pub struct PropertyStore {
    use_case: GetAllProperties,
    options: PropertyQuery,
    properties: Vec<Property>,
    loading: bool,
    refreshing: bool,
    has_fetched: bool,
    error: Option<String>,
}

impl PropertyStore {
    pub fn new(repository: PropertyRepository, options: PropertyQuery) -> Self {
        Self {
            use_case: GetAllProperties::new(repository),
            options,
            properties: Vec::new(),
            loading: false,
            refreshing: false,
            has_fetched: false,
            error: None,
        }
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn has_fetched(&self) -> bool {
        self.has_fetched
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Load listings with `overrides` laid over the store's default query.
    ///
    /// On failure the list is emptied and the message kept in [`Self::error`].
    pub async fn fetch(&mut self, overrides: Option<PropertyQueryOverrides>) {
        if self.loading {
            debug!("Already loading properties, skipping fetch");
            return;
        }
        self.loading = true;
        self.error = None;

        let query = match &overrides {
            Some(overrides) => self.options.merged(overrides),
            None => self.options.clone(),
        };
        match self.use_case.execute(&query).await {
            Ok(properties) => {
                info!("Loaded {} properties", properties.len());
                self.properties = properties;
                self.has_fetched = true;
            }
            Err(err) => {
                error!("Error fetching properties: {}", err);
                self.error = Some(err.to_string());
                self.properties.clear();
            }
        }
        self.loading = false;
    }

    /// Reload with the default query, keeping the current list on failure.
    pub async fn refresh(&mut self) {
        self.refreshing = true;
        self.error = None;

        match self.use_case.execute(&self.options).await {
            Ok(properties) => self.properties = properties,
            Err(err) => {
                error!("Error refreshing properties: {}", err);
                self.error = Some(err.to_string());
            }
        }
        self.refreshing = false;
    }

    /// First load; later calls do nothing.
    pub async fn ensure_fetched(&mut self) {
        if !self.has_fetched && !self.loading {
            debug!("Initial fetch of properties");
            self.fetch(None).await;
        }
    }

    pub async fn retry(&mut self) {
        self.fetch(None).await;
    }

    pub async fn force_refresh(&mut self) {
        self.has_fetched = false;
        self.fetch(None).await;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn get_property_by_id(&self, id: i64) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn filter(&self, criteria: &PropertyFilter) -> Vec<&Property> {
        self.properties.iter().filter(|p| criteria.matches(p)).collect()
    }

    /// Sorted copy of the listings.
    pub fn sort(&self, field: SortField, order: SortOrder) -> Vec<Property> {
        let mut sorted = self.properties.clone();
        sort_properties(&mut sorted, field, order);
        sorted
    }

    /// Listings whose title, description, location or type contain `term`,
    /// ignoring case. An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<&Property> {
        if term.is_empty() {
            return self.properties.iter().collect();
        }
        let term = term.to_lowercase();
        self.properties
            .iter()
            .filter(|p| {
                [&p.title, &p.description, &p.location, &p.property_type]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            })
            .collect()
    }

    pub fn statistics(&self) -> PropertyStatistics {
        PropertyStatistics::from_properties(&self.properties)
    }

    /// Distinct type names in first-seen order.
    pub fn property_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for property in &self.properties {
            let kind = property.property_type.as_str();
            if !kind.is_empty() && !types.contains(&kind) {
                types.push(kind);
            }
        }
        types
    }

    pub fn price_range(&self) -> PriceRange {
        price_range(&self.properties)
    }

    pub fn available_count(&self) -> usize {
        self.properties.iter().filter(|p| p.is_available()).count()
    }
}

/// A single listing loaded by id.
pub struct PropertyDetail {
    repository: PropertyRepository,
    property: Option<Property>,
    loading: bool,
    error: Option<String>,
}

impl PropertyDetail {
    pub fn new(repository: PropertyRepository) -> Self {
        Self {
            repository,
            property: None,
            loading: false,
            error: None,
        }
    }

    pub fn property(&self) -> Option<&Property> {
        self.property.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Load listing `id`; non-positive ids are ignored.
    pub async fn fetch(&mut self, id: i64) {
        if id <= 0 {
            return;
        }
        self.loading = true;
        self.error = None;

        match self.repository.get_property_by_id(id).await {
            Ok(property) => self.property = Some(property),
            Err(err) => {
                error!("Error fetching property {}: {}", id, err);
                self.error = Some(err.to_string());
                self.property = None;
            }
        }
        self.loading = false;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

/// Results of a backend property search.
pub struct PropertySearch {
    repository: PropertyRepository,
    results: Vec<Property>,
    loading: bool,
    error: Option<String>,
}

impl PropertySearch {
    pub fn new(repository: PropertyRepository) -> Self {
        Self {
            repository,
            results: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn results(&self) -> &[Property] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn search(&mut self, params: &[(String, String)]) -> Result<()> {
        self.loading = true;
        self.error = None;

        let outcome = self.repository.search_properties(params).await;
        self.loading = false;
        match outcome {
            Ok(results) => {
                self.results = results;
                Ok(())
            }
            Err(err) => {
                error!("Error searching properties: {}", err);
                self.error = Some(err.to_string());
                self.results.clear();
                Err(err)
            }
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
