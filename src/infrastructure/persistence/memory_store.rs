//! In-process storage for tests and local runs.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::{Draft, Entity, FieldValue};
use crate::domain::repositories::storage::{UPDATE_DATA_EMPTY, UPDATE_FILTER_REQUIRED};
use crate::domain::repositories::{QueryArgs, Storage, UpdateArgs};
use crate::error::AppError;

struct Table<T> {
    rows: Vec<T>,
    next_id: i64,
}

/// [`Storage`] keeping every record in memory.
///
/// Enforces the entity's unique fields and reports violations with the
/// constraint name PostgreSQL would use (`<table>_<column>_key`), so error
/// classification behaves the same as against [`super::PgStore`].
pub struct MemoryStore<T: Entity> {
    table: RwLock<Table<T>>,
}

impl<T: Entity> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored records, soft-deleted ones included.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Name of the violated constraint if `value` is already taken by a row other than `skip`.
fn unique_conflict<T: Entity>(
    rows: &[T],
    field: T::Field,
    value: &FieldValue,
    skip: Option<usize>,
) -> Option<String> {
    if value.is_null() || !T::UNIQUE.contains(&field) {
        return None;
    }

    rows.iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != skip)
        .any(|(_, row)| row.value(field) == *value)
        .then(|| T::unique_constraint(field))
}

#[async_trait]
impl<T: Entity> Storage<T> for MemoryStore<T> {
    async fn find_many(&self, args: QueryArgs<T>) -> Result<Vec<T>, AppError> {
        let table = self.table.read().await;

        let mut matched: Vec<&T> = table
            .rows
            .iter()
            .filter(|row| args.filter.matches(row))
            .collect();
        matched.sort_by(|a, b| args.order_by.compare(a, b));

        let skip = args.skip.map_or(0, |s| usize::try_from(s).unwrap_or(usize::MAX));
        let take = args.take.map_or(usize::MAX, |t| usize::try_from(t).unwrap_or(usize::MAX));

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|row| {
                let mut row = row.clone();
                args.projection.apply(&mut row);
                row
            })
            .collect())
    }

    async fn find_unique(&self, args: QueryArgs<T>) -> Result<Option<T>, AppError> {
        let table = self.table.read().await;

        Ok(table
            .rows
            .iter()
            .find(|row| args.filter.matches(row))
            .map(|row| {
                let mut row = row.clone();
                args.projection.apply(&mut row);
                row
            }))
    }

    async fn count(&self, args: QueryArgs<T>) -> Result<u64, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|row| args.filter.matches(row))
            .count() as u64)
    }

    async fn create(&self, draft: T::Draft) -> Result<T, AppError> {
        let mut table = self.table.write().await;

        for (field, value) in draft.values() {
            if let Some(constraint) = unique_conflict(&table.rows, field, &value, None) {
                tracing::debug!(table = T::TABLE, constraint = %constraint, "unique violation");
                return Err(AppError::unique_violation(constraint));
            }
        }

        let id = table.next_id;
        table.next_id += 1;

        let row = draft.into_entity(id, Utc::now());
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, args: UpdateArgs<T>) -> Result<T, AppError> {
        if args.data.is_empty() {
            return Err(AppError::bad_request(
                UPDATE_DATA_EMPTY,
                "Update requires at least one field",
                json!({ "table": T::TABLE }),
            ));
        }
        if args.filter.is_empty() {
            return Err(AppError::bad_request(
                UPDATE_FILTER_REQUIRED,
                "Where condition is required for update",
                json!({ "table": T::TABLE }),
            ));
        }

        let mut table = self.table.write().await;

        let index = table
            .rows
            .iter()
            .position(|row| args.filter.matches(row))
            .ok_or_else(|| AppError::not_found("Record not found", json!({ "table": T::TABLE })))?;

        for (field, value) in args.data.iter() {
            if let Some(constraint) = unique_conflict(&table.rows, field, value, Some(index)) {
                return Err(AppError::unique_violation(constraint));
            }
        }

        let row = &mut table.rows[index];
        for (field, value) in args.data.iter() {
            row.apply(field, value);
        }
        Ok(row.clone())
    }
}
