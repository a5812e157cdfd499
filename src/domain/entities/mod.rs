//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic. Each one
//! implements [`Entity`] so the generic repository layer can filter, project
//! and soft-delete it.
//!
//! # Entity Types
//!
//! - [`ShortLink`] - A shortened URL mapping
//! - [`User`] - A registered account owning short links
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation:
//! `NewShortLink` and `NewUser` carry only the caller-supplied columns.

pub mod entity;
pub mod short_link;
pub mod user;

pub use entity::{Draft, Entity, FieldValue};
pub use short_link::{NewShortLink, ShortLink, ShortLinkField};
pub use user::{NewUser, User, UserField};
