//! Domain layer: entities and the generic repository layer.
//!
//! - [`entities`] - persisted records and the [`entities::Entity`] trait
//! - [`repositories`] - query values, builders and the storage contract
//!
//! Storage implementations live in [`crate::infrastructure::persistence`].

pub mod entities;
pub mod repositories;
