//! Backend HTTP surface.

pub mod client;
pub mod traits;
pub mod types;

pub use client::AdminClient;
pub use traits::{AuthApi, InvestmentApi, LookupApi, PropertyApi, UserApi};
