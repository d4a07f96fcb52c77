pub mod application;
pub mod party;
pub mod premium;
pub mod snapshot;
pub mod suitability;
