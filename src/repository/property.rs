use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::api::types::unwrap_data;
use crate::api::PropertyApi;
use crate::error::Result;
use crate::models::{NewProperty, Property, UploadFile};

/// Maps backend property records into [`Property`] values.
#[derive(Clone)]
pub struct PropertyRepository {
    api: Arc<dyn PropertyApi>,
}

impl PropertyRepository {
    pub fn new(api: Arc<dyn PropertyApi>) -> Self {
        Self { api }
    }

    /// Every listing the backend returns that passes [`Property::is_valid`].
    pub async fn get_all_properties(&self) -> Result<Vec<Property>> {
        let records = self.api.get_all_properties().await.map_err(|err| {
            error!("Repository error in get_all_properties: {}", err);
            err.context("Failed to fetch properties")
        })?;
        let properties = into_valid(&records);
        info!(
            "Built {} valid properties from {} records",
            properties.len(),
            records.len()
        );
        Ok(properties)
    }

    pub async fn get_property_by_id(&self, id: i64) -> Result<Property> {
        let record = self
            .api
            .get_property_by_id(id)
            .await
            .map_err(|err| err.context(format!("Failed to fetch property {id}")))?;
        Ok(Property::from_api_response(&unwrap_data(record)))
    }

    /// Validate the draft and submit it.
    pub async fn create_property(&self, draft: &NewProperty) -> Result<Property> {
        draft
            .validate()
            .map_err(|err| err.context("Failed to create property"))?;
        let created = self
            .api
            .create_property(draft)
            .await
            .map_err(|err| err.context("Failed to create property"))?;
        Ok(Property::from_api_response(&unwrap_data(created)))
    }

    /// Apply `patch` (camelCase fields) to a listing.
    ///
    /// When the backend acknowledges without echoing the record, the result is
    /// the current listing with the patch laid over it.
    pub async fn update_property(&self, id: i64, patch: &Value) -> Result<Property> {
        let response = self
            .api
            .update_property(id, patch)
            .await
            .map_err(|err| err.context("Failed to update property"))?;

        let echoed = Property::from_api_response(&unwrap_data(response.clone()));
        if response.is_object() && echoed.is_valid() {
            return Ok(echoed);
        }

        debug!("Update of property {} not echoed, merging locally", id);
        let current = self
            .get_property_by_id(id)
            .await
            .map_err(|err| err.context("Failed to update property"))?;
        Ok(merge_patch(&current, patch))
    }

    pub async fn delete_property(&self, id: i64) -> Result<()> {
        self.api
            .delete_property(id)
            .await
            .map_err(|err| err.context(format!("Failed to delete property {id}")))?;
        info!("Deleted property {}", id);
        Ok(())
    }

    pub async fn search_properties(&self, params: &[(String, String)]) -> Result<Vec<Property>> {
        let records = self
            .api
            .search_properties(params)
            .await
            .map_err(|err| err.context("Failed to search properties"))?;
        Ok(into_valid(&records))
    }

    /// Listings whose type name equals `property_type`, ignoring case.
    pub async fn get_properties_by_type(&self, property_type: &str) -> Result<Vec<Property>> {
        let properties = self.get_all_properties().await.map_err(|err| {
            err.context(format!("Failed to get properties by type {property_type}"))
        })?;
        Ok(properties
            .into_iter()
            .filter(|p| p.property_type.eq_ignore_ascii_case(property_type))
            .collect())
    }

    pub async fn get_available_properties(&self) -> Result<Vec<Property>> {
        let properties = self
            .get_all_properties()
            .await
            .map_err(|err| err.context("Failed to get available properties"))?;
        Ok(properties.into_iter().filter(Property::is_available).collect())
    }

    pub async fn upload_images(&self, id: i64, files: &[UploadFile]) -> Result<Value> {
        self.api
            .upload_property_images(id, files)
            .await
            .map_err(|err| err.context(format!("Failed to upload images for property {id}")))
    }
}

fn into_valid(records: &[Value]) -> Vec<Property> {
    records
        .iter()
        .map(Property::from_api_response)
        .filter(Property::is_valid)
        .collect()
}

fn merge_patch(current: &Property, patch: &Value) -> Property {
    let mut merged = current.to_json();
    if let (Value::Object(target), Value::Object(fields)) = (&mut merged, patch) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
        target.insert("id".to_string(), Value::from(current.id));
        target.insert("updatedAt".to_string(), Value::from(Utc::now().to_rfc3339()));
    }
    Property::from_api_response(&merged)
}
