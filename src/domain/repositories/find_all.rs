//! Multi-record lookup builder with ordering and pagination.

use serde_json::json;
use std::sync::Arc;

use super::base_find::{BaseFind, FindState};
use super::pagination::{
    PAGE_NOT_GREATER_THAN_ZERO, PAGE_SIZE_NOT_GREATER_THAN_ZERO, PageRequest, PaginatedResponse,
    PaginationMeta,
};
use super::query::{OrderBy, QueryArgs};
use super::storage::Storage;
use crate::domain::entities::Entity;
use crate::error::AppError;

pub const PAGINATION_NOT_ENABLED: &str = "PAGINATION_NOT_ENABLED";

/// Builds and runs a lookup returning every matching record.
///
/// Without pagination a single `find_many` is issued and `meta` is `None`.
/// With pagination, the page and the total count are read concurrently from
/// the same argument snapshot.
///
/// ```ignore
/// let page = repository
///     .find_all()
///     .set_where(Where::new().and(ShortLinkField::UserId, "user1"))
///     .set_order_by(OrderBy::new().desc(ShortLinkField::CreatedAt))
///     .set_paginated()
///     .set_page(2)?
///     .set_page_size(25)?
///     .execute()
///     .await?;
/// ```
pub struct FindAll<T: Entity> {
    storage: Arc<dyn Storage<T>>,
    state: FindState<T>,
    order_by: OrderBy<T>,
    page: Option<PageRequest>,
}

impl<T: Entity> FindAll<T> {
    pub fn new(storage: Arc<dyn Storage<T>>) -> Self {
        Self {
            storage,
            state: FindState::new(),
            order_by: OrderBy::new(),
            page: None,
        }
    }

    /// Replaces the sort keys.
    pub fn set_order_by(mut self, order_by: OrderBy<T>) -> Self {
        self.order_by = order_by;
        self
    }

    /// Enables pagination with default page and page size. Idempotent.
    pub fn set_paginated(mut self) -> Self {
        self.page.get_or_insert_with(PageRequest::default);
        self
    }

    /// Sets the 1-indexed page.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if pagination is not enabled or `page < 1`.
    pub fn set_page(mut self, page: i64) -> Result<Self, AppError> {
        let request = self.pagination()?;
        if page < 1 {
            return Err(AppError::bad_request(
                PAGE_NOT_GREATER_THAN_ZERO,
                "Page must be a positive integer and greater than 0",
                json!({ "page": page }),
            ));
        }

        request.page = page as u64;
        Ok(self)
    }

    /// Sets the number of records per page.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if pagination is not enabled or `page_size <= 0`.
    pub fn set_page_size(mut self, page_size: i64) -> Result<Self, AppError> {
        let request = self.pagination()?;
        if page_size <= 0 {
            return Err(AppError::bad_request(
                PAGE_SIZE_NOT_GREATER_THAN_ZERO,
                "Page size must be a positive integer and greater than 0",
                json!({ "page_size": page_size }),
            ));
        }

        request.page_size = page_size as u64;
        Ok(self)
    }

    pub fn is_paginated(&self) -> bool {
        self.page.is_some()
    }

    /// Runs the lookup.
    ///
    /// A page past the last one is not an error: it yields no results and
    /// metadata reflecting the real totals.
    ///
    /// # Errors
    ///
    /// Propagates store errors unchanged.
    pub async fn execute(self) -> Result<PaginatedResponse<T>, AppError> {
        let FindAll {
            storage,
            state,
            order_by,
            page,
        } = self;

        let mut args = QueryArgs {
            filter: state.filter.resolve(),
            projection: state.projection,
            order_by,
            skip: None,
            take: None,
        };

        let Some(page) = page else {
            tracing::debug!(table = T::TABLE, filter = ?args.filter, "find_all");
            let results = storage.find_many(args).await?;
            return Ok(PaginatedResponse {
                results,
                meta: None,
            });
        };

        args.skip = Some(page.skip());
        args.take = Some(page.page_size);
        let count_args = QueryArgs::filtered(args.filter.clone());

        tracing::debug!(
            table = T::TABLE,
            filter = ?args.filter,
            page = page.page,
            page_size = page.page_size,
            "find_all paginated"
        );

        let (results, total_items) =
            tokio::try_join!(storage.find_many(args), storage.count(count_args))?;

        Ok(PaginatedResponse {
            results,
            meta: Some(PaginationMeta::new(total_items, page.page, page.page_size)),
        })
    }

    fn pagination(&mut self) -> Result<&mut PageRequest, AppError> {
        self.page.as_mut().ok_or_else(|| {
            AppError::bad_request(
                PAGINATION_NOT_ENABLED,
                "Pagination is not set. Use set_paginated() to enable pagination.",
                json!({}),
            )
        })
    }
}

impl<T: Entity> BaseFind<T> for FindAll<T> {
    fn state(&self) -> &FindState<T> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FindState<T> {
        &mut self.state
    }
}
