//! Per-entity repository facade.

use serde_json::json;
use std::sync::Arc;

use super::find_all::FindAll;
use super::find_one::FindOne;
use super::query::{Changes, UpdateArgs, Where};
use super::storage::{Storage, UPDATE_FILTER_REQUIRED};
use crate::domain::entities::{Entity, FieldValue};
use crate::error::AppError;

/// CRUD operations for one entity type over a [`Storage`] delegate.
///
/// Reads go through builders obtained from [`Repository::find_one`] and
/// [`Repository::find_all`]; each call returns a fresh builder, so filters
/// never leak between unrelated queries. Deletion is a soft delete.
///
/// # Examples
///
/// ```ignore
/// let repository: LinkRepository = Repository::new(Arc::new(PgStore::new(pool)));
/// let link = repository.create(new_link).await?;
/// ```
pub struct Repository<T: Entity> {
    storage: Arc<dyn Storage<T>>,
}

impl<T: Entity> Repository<T> {
    pub fn new(storage: Arc<dyn Storage<T>>) -> Self {
        Self { storage }
    }

    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] on unique constraint violations.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn create(&self, draft: T::Draft) -> Result<T, AppError> {
        self.storage.create(draft).await
    }

    /// Applies `data` to the record matching `filter`.
    ///
    /// `filter` is sent as given: it does not exclude soft-deleted records.
    /// If several records match, only one of them is updated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] without touching storage if `filter`
    /// has no condition other than the soft-delete flag.
    /// Returns [`AppError::NotFound`] if no record matches.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn update(&self, data: Changes<T>, filter: Where<T>) -> Result<T, AppError> {
        if filter.iter().all(|(field, _)| field == T::SOFT_DELETE) {
            return Err(AppError::bad_request(
                UPDATE_FILTER_REQUIRED,
                "Where condition is required for update and delete operations",
                json!({ "table": T::TABLE }),
            ));
        }

        self.storage.update(UpdateArgs { data, filter }).await
    }

    /// Soft-deletes the record matching `filter` and returns it.
    ///
    /// # Errors
    ///
    /// See [`Repository::update`].
    pub async fn delete(&self, filter: Where<T>) -> Result<T, AppError> {
        let data = Changes::new().and(T::SOFT_DELETE, FieldValue::Bool(true));
        self.update(data, filter).await
    }

    /// Starts a multi-record lookup.
    pub fn find_all(&self) -> FindAll<T> {
        FindAll::new(self.storage.clone())
    }

    /// Starts a single-record lookup.
    pub fn find_one(&self) -> FindOne<T> {
        FindOne::new(self.storage.clone())
    }
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}
