use serde::Serialize;

use crate::error::{Result, ValidationErrors};

/// Share offering opened against a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestment {
    pub title: String,
    pub description: String,
    pub total_shares: i64,
    pub share_price: f64,
    pub available_shares: i64,
    pub duration_by_months: i64,
    pub property_id: i64,
    pub user_id: String,
}

impl NewInvestment {
    /// Offering prefilled from the property it is opened against.
    pub fn for_property(property: &crate::models::Property, user_id: impl Into<String>) -> Self {
        Self {
            title: property.title.clone(),
            description: property.description.clone(),
            property_id: property.id,
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", "Title is required");
        }
        if self.description.trim().is_empty() {
            errors.add("description", "Description is required");
        }
        if !(0..=100).contains(&self.total_shares) {
            errors.add("totalShares", "Total shares must be between 0 and 100");
        }
        if self.share_price < 0.0 {
            errors.add("sharePrice", "Share price must be 0 or greater");
        }
        if !(0..=50).contains(&self.available_shares) {
            errors.add("availableShares", "Available shares must be between 0 and 50");
        }
        if self.available_shares > self.total_shares {
            errors.add("availableShares", "Available shares cannot exceed total shares");
        }
        if self.duration_by_months <= 0 {
            errors.add("durationByMonths", "Duration must be greater than 0 months");
        }
        errors.into_result()
    }

    /// Total value of the shares still on offer.
    pub fn available_value(&self) -> f64 {
        self.available_shares as f64 * self.share_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewInvestment {
        NewInvestment {
            title: "Tower A".into(),
            description: "Office floors".into(),
            total_shares: 40,
            share_price: 250.0,
            available_shares: 20,
            duration_by_months: 24,
            property_id: 9,
            user_id: "u-1".into(),
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(draft().validate().is_ok());
        assert_eq!(draft().available_value(), 5000.0);
    }

    #[test]
    fn test_available_over_total_overrides_range_message() {
        let investment = NewInvestment {
            total_shares: 10,
            available_shares: 30,
            ..draft()
        };
        let err = investment.validate().unwrap_err();
        assert_eq!(
            err.validation().and_then(|v| v.get("availableShares")),
            Some("Available shares cannot exceed total shares")
        );
    }

    #[test]
    fn test_bounds() {
        let investment = NewInvestment {
            total_shares: 101,
            share_price: -1.0,
            available_shares: 51,
            duration_by_months: 0,
            ..draft()
        };
        let err = investment.validate().unwrap_err();
        let errors = err.validation().unwrap();
        assert_eq!(errors.get("totalShares"), Some("Total shares must be between 0 and 100"));
        assert_eq!(errors.get("sharePrice"), Some("Share price must be 0 or greater"));
        assert_eq!(
            errors.get("availableShares"),
            Some("Available shares must be between 0 and 50")
        );
        assert!(errors.get("durationByMonths").is_some());
    }

    #[test]
    fn test_payload_is_camel_case() {
        let body = serde_json::to_value(draft()).unwrap();
        assert_eq!(body["durationByMonths"], 24);
        assert_eq!(body["propertyId"], 9);
    }
}
