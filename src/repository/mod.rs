//! Repositories and use cases over the property endpoints.

pub mod property;
pub mod query;

pub use property::PropertyRepository;
pub use query::{
    apply_query, price_range, sort_properties, GetAllProperties, PriceRange, PropertyQuery,
    PropertyQueryOverrides, PropertyStatistics, SortField, SortOrder,
};
