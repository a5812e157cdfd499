//! PostgreSQL implementation of the storage delegate.

use async_trait::async_trait;
use serde_json::json;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::domain::entities::{Draft, Entity, FieldValue};
use crate::domain::repositories::storage::{UPDATE_DATA_EMPTY, UPDATE_FILTER_REQUIRED};
use crate::domain::repositories::{OrderBy, QueryArgs, Storage, UpdateArgs, Where};
use crate::error::AppError;

/// PostgreSQL [`Storage`] for any [`Entity`] that can be read from a row.
///
/// Statements are assembled with [`QueryBuilder`]: identifiers come only from
/// [`Entity::TABLE`] and [`Entity::column`], every value is a bound parameter.
/// Full rows are always fetched; projections are applied afterwards.
pub struct PgStore<T> {
    pool: Arc<PgPool>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> PgStore<T> {
    /// Creates a new store with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

fn columns<T: Entity>() -> String {
    T::FIELDS
        .iter()
        .map(|field| T::column(*field))
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &FieldValue) {
    match value.clone() {
        FieldValue::Null => qb.push("NULL"),
        FieldValue::Bool(v) => qb.push_bind(v),
        FieldValue::Int(v) => qb.push_bind(v),
        FieldValue::Text(v) => qb.push_bind(v),
        FieldValue::Timestamp(v) => qb.push_bind(v),
    };
}

/// Appends `WHERE a = $1 AND b IS NULL ...`; nothing for an empty filter.
fn push_filter<T: Entity>(qb: &mut QueryBuilder<'_, Postgres>, filter: &Where<T>) {
    for (i, (field, value)) in filter.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        qb.push(T::column(field));

        if value.is_null() {
            qb.push(" IS NULL");
        } else {
            qb.push(" = ");
            push_value(qb, value);
        }
    }
}

fn push_order_by<T: Entity>(qb: &mut QueryBuilder<'_, Postgres>, order_by: &OrderBy<T>) {
    for (i, (field, order)) in order_by.iter().enumerate() {
        qb.push(if i == 0 { " ORDER BY " } else { ", " });
        qb.push(T::column(field));
        qb.push(" ");
        qb.push(order.as_sql());
    }
}

/// PostgreSQL has no unsigned integers; windows beyond `i64::MAX` are clamped.
fn to_bigint(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn select_query<T: Entity>(args: &QueryArgs<T>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", columns::<T>(), T::TABLE));
    push_filter(&mut qb, &args.filter);
    push_order_by(&mut qb, &args.order_by);

    if let Some(take) = args.take {
        qb.push(" LIMIT ");
        qb.push_bind(to_bigint(take));
    }
    if let Some(skip) = args.skip {
        qb.push(" OFFSET ");
        qb.push_bind(to_bigint(skip));
    }
    qb
}

fn count_query<T: Entity>(filter: &Where<T>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", T::TABLE));
    push_filter(&mut qb, filter);
    qb
}

fn insert_query<T: Entity>(values: &[(T::Field, FieldValue)]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("INSERT INTO {} (", T::TABLE));
    {
        let mut names = qb.separated(", ");
        for (field, _) in values {
            names.push(T::column(*field));
        }
    }
    qb.push(") VALUES (");
    for (i, (_, value)) in values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(&mut qb, value);
    }
    qb.push(") RETURNING ");
    qb.push(columns::<T>());
    qb
}

fn update_query<T: Entity>(args: &UpdateArgs<T>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", T::TABLE));
    for (i, (field, value)) in args.data.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(T::column(field));
        qb.push(" = ");
        push_value(&mut qb, value);
    }
    qb.push(format!(" WHERE ctid = (SELECT ctid FROM {}", T::TABLE));
    push_filter(&mut qb, &args.filter);
    qb.push(" LIMIT 1 FOR UPDATE) RETURNING ");
    qb.push(columns::<T>());
    qb
}

#[async_trait]
impl<T> Storage<T> for PgStore<T>
where
    T: Entity + for<'r> FromRow<'r, PgRow>,
{
    async fn find_many(&self, args: QueryArgs<T>) -> Result<Vec<T>, AppError> {
        let mut qb = select_query(&args);
        tracing::debug!(sql = qb.sql(), "find_many");

        let mut rows: Vec<T> = qb.build_query_as().fetch_all(self.pool.as_ref()).await?;
        for row in &mut rows {
            args.projection.apply(row);
        }
        Ok(rows)
    }

    async fn find_unique(&self, args: QueryArgs<T>) -> Result<Option<T>, AppError> {
        let mut qb = select_query(&args);
        qb.push(" LIMIT 1");
        tracing::debug!(sql = qb.sql(), "find_unique");

        let row: Option<T> = qb
            .build_query_as()
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(row.map(|mut row| {
            args.projection.apply(&mut row);
            row
        }))
    }

    async fn count(&self, args: QueryArgs<T>) -> Result<u64, AppError> {
        let mut qb = count_query(&args.filter);
        tracing::debug!(sql = qb.sql(), "count");

        let total: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(total.max(0) as u64)
    }

    async fn create(&self, draft: T::Draft) -> Result<T, AppError> {
        let mut qb = insert_query::<T>(&draft.values());
        tracing::debug!(sql = qb.sql(), "create");

        let row = qb.build_query_as().fetch_one(self.pool.as_ref()).await?;
        Ok(row)
    }

    /// Locks and updates the first row matching `args.filter`.
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

        let mut qb = update_query(&args);
        tracing::debug!(sql = qb.sql(), "update");

        let row: Option<T> = qb
            .build_query_as()
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.ok_or_else(|| AppError::not_found("Record not found", json!({ "table": T::TABLE })))
    }
}
