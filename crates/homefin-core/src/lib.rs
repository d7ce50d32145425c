pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortisation")]
pub mod amortisation;

#[cfg(feature = "affordability")]
pub mod affordability;

pub use error::HomefinError;
pub use types::*;

/// Standard result type for all homefin operations
pub type HomefinResult<T> = Result<T, HomefinError>;
