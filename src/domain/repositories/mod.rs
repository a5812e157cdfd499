//! Generic repository layer.
//!
//! A [`Repository`] wraps a [`Storage`] delegate (PostgreSQL or in-memory) and
//! exposes CRUD plus two query builders:
//!
//! - [`FindOne`] - single record, requires at least one discriminating condition
//! - [`FindAll`] - every matching record, with optional ordering and pagination
//!
//! Both builders are consumed by `execute`, and [`Repository::find_one`] /
//! [`Repository::find_all`] hand out a fresh builder on every call.
//!
//! # Soft delete
//!
//! Reads implicitly filter on `is_deleted = false` and omit the flag from
//! results. Set the flag explicitly in a `Where`, or call
//! [`BaseFind::include_deleted`], to see deleted records.

pub mod base_find;
pub mod find_all;
pub mod find_one;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use base_find::{BaseFind, FindState};
pub use find_all::FindAll;
pub use find_one::FindOne;
pub use pagination::{
    FIND_ALL_DEFAULTS, FindAllParams, FindAllQuery, PageRequest, PaginatedResponse,
    PaginationMeta, execute_find_all_with_params, parse_find_all_query,
};
pub use query::{Changes, Filter, OrderBy, Projection, QueryArgs, SortOrder, UpdateArgs, Where};
pub use repository::Repository;
pub use storage::Storage;

use crate::domain::entities::{ShortLink, User};

pub type LinkRepository = Repository<ShortLink>;
pub type UserRepository = Repository<User>;
