//! `estate-admin` - typed client for the real-estate investment platform
//! backend.
//!
//! API traits sit over a `reqwest` client. A repository turns loose JSON into
//! [`Property`] values, and stores hold the loaded data together with loading
//! and error state.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod lookup;
pub mod models;
pub mod repository;
pub mod rtl;
pub mod session;
pub mod store;

pub use api::AdminClient;
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use lookup::{CityDirectory, Directory, LookupCache, PropertyTypeDirectory};
pub use models::{City, Property, PropertyStatus, PropertyType, User};
pub use repository::{
    GetAllProperties, PropertyQuery, PropertyQueryOverrides, PropertyRepository,
};
pub use rtl::{Language, Rtl};
pub use session::{AuthService, FileSessionStore, MemorySessionStore, SessionStore};
pub use store::{PropertyStore, UserStore};
