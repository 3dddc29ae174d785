//! Stateful holders for list pages: data plus loading and error flags.

pub mod property;
pub mod user;

pub use property::{PropertyDetail, PropertyFilter, PropertySearch, PropertyStore};
pub use user::UserStore;
