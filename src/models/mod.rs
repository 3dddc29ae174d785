pub mod investment;
pub mod lenient;
pub mod lookup;
pub mod property;
pub mod session;
pub mod user;

pub use investment::NewInvestment;
pub use lookup::{City, LookupRecord, NewCity, NewPropertyType, PropertyType};
pub use property::{NewProperty, Property, PropertyStatus, UploadFile};
pub use session::{Session, SessionUser};
pub use user::{NewUser, RegistrationOutcome, User, UserStatistics};
