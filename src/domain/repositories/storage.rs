//! Storage delegate trait: the CRUD backend reached by the repository layer.

use async_trait::async_trait;

use super::query::{QueryArgs, UpdateArgs};
use crate::domain::entities::Entity;
use crate::error::AppError;

pub const UPDATE_DATA_EMPTY: &str = "UPDATE_DATA_EMPTY";
pub const UPDATE_FILTER_REQUIRED: &str = "UPDATE_FILTER_REQUIRED";

/// Per-entity CRUD backend.
///
/// Stores receive fully resolved arguments: the soft-delete predicate is
/// already part of `args.filter`, so implementations must not add their own.
/// They manage their own pooling and concurrency; the repository layer adds
/// no locking on top.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgStore`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - In-process implementation
#[async_trait]
pub trait Storage<T: Entity>: Send + Sync {
    /// Returns every record matching `args.filter`, ordered and windowed by
    /// `order_by`, `skip` and `take`, with `projection` applied.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on backend errors.
    async fn find_many(&self, args: QueryArgs<T>) -> Result<Vec<T>, AppError>;

    /// Returns the first record matching `args.filter`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on backend errors.
    async fn find_unique(&self, args: QueryArgs<T>) -> Result<Option<T>, AppError>;

    /// Counts records matching `args.filter`. Windowing arguments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on backend errors.
    async fn count(&self, args: QueryArgs<T>) -> Result<u64, AppError>;

    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] carrying the constraint name if a unique
    /// field already holds the same value.
    /// Returns [`AppError::Internal`] on backend errors.
    async fn create(&self, draft: T::Draft) -> Result<T, AppError>;

    /// Applies `args.data` to the first record matching `args.filter`. At most
    /// one record is ever written.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `args.data` or `args.filter` is empty.
    /// Returns [`AppError::NotFound`] if no record matches.
    /// Returns [`AppError::Conflict`] if the update violates a unique constraint.
    /// Returns [`AppError::Internal`] on backend errors.
    async fn update(&self, args: UpdateArgs<T>) -> Result<T, AppError>;
}
