pub mod error;
pub mod metrics;
pub mod opex;
pub mod types;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "projections")]
pub mod projections;

#[cfg(feature = "rent_roll")]
pub mod rent_roll;

pub use error::RentfolioError;
pub use types::*;

/// Standard result type for all rentfolio operations
pub type RentfolioResult<T> = Result<T, RentfolioError>;
