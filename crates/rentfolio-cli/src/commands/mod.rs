pub mod metrics;
pub mod mortgage;
pub mod opex;
pub mod projections;
pub mod rent_roll;
