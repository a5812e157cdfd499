//! Pagination state, response metadata and query parameter parsing.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::find_all::FindAll;
use super::query::{OrderBy, SortOrder};
use crate::domain::entities::Entity;
use crate::error::AppError;

pub const PAGE_NOT_A_NUMBER: &str = "PAGE_NOT_A_NUMBER";
pub const PAGE_NOT_GREATER_THAN_ZERO: &str = "PAGE_NOT_GREATER_THAN_ZERO";
pub const PAGE_SIZE_NOT_A_NUMBER: &str = "PAGE_SIZE_NOT_A_NUMBER";
pub const PAGE_SIZE_NOT_GREATER_THAN_ZERO: &str = "PAGE_SIZE_NOT_GREATER_THAN_ZERO";
pub const SORT_BY_NOT_A_STRING: &str = "SORT_BY_NOT_A_STRING";
pub const SORT_BY_UNKNOWN_FIELD: &str = "SORT_BY_UNKNOWN_FIELD";
pub const SORT_ORDER_INVALID: &str = "SORT_ORDER_INVALID";
pub const SORT_ORDER_BOTH_REQUIRED: &str = "SORT_ORDER_BOTH_REQUIRED";

/// Page and page size used when pagination is enabled without explicit values.
pub const FIND_ALL_DEFAULTS: PageRequest = PageRequest {
    page: 1,
    page_size: 30,
};

/// A validated page window: `page >= 1`, `page_size >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        FIND_ALL_DEFAULTS
    }
}

/// Pagination metadata derived from a count and a page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total_items: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
}

impl PaginationMeta {
    /// `page_size` must be non-zero; [`FindAll`] guarantees it.
    pub fn new(total_items: u64, page: u64, page_size: u64) -> Self {
        Self {
            total_items,
            page,
            page_size,
            total_pages: total_items.div_ceil(page_size),
            has_prev_page: page > 1,
            has_next_page: page.saturating_mul(page_size) < total_items,
        }
    }
}

/// Result of [`FindAll::execute`]. `meta` is `None` for unpaginated queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedResponse<T> {
    pub results: Vec<T>,
    pub meta: Option<PaginationMeta>,
}

/// Raw listing parameters as they arrive from a query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindAllQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl FindAllQuery {
    /// Fills in `page_size` when it is missing or blank.
    pub fn with_default_page_size(mut self, page_size: u64) -> Self {
        if non_empty(&self.page_size).is_none() {
            self.page_size = Some(page_size.to_string());
        }
        self
    }
}

/// Validated listing parameters.
#[derive(Debug)]
pub struct FindAllParams<T: Entity> {
    pub page: i64,
    pub page_size: i64,
    pub order_by: OrderBy<T>,
}

/// Validates raw listing parameters.
///
/// # Defaults
///
/// - `page`: 1
/// - `page_size`: 30
/// - no ordering
///
/// # Errors
///
/// Returns [`AppError::Validation`] with one of the `PAGE_*`, `PAGE_SIZE_*`,
/// `SORT_BY_*` or `SORT_ORDER_*` codes, checked in that order.
pub fn parse_find_all_query<T: Entity>(query: &FindAllQuery) -> Result<FindAllParams<T>, AppError> {
    let page = match non_empty(&query.page) {
        Some(raw) => {
            let page = parse_number(raw, PAGE_NOT_A_NUMBER, "Page must be a number")?;
            if page < 1 {
                return Err(AppError::bad_request(
                    PAGE_NOT_GREATER_THAN_ZERO,
                    "Page must be a positive integer and greater than 0",
                    json!({ "page": page }),
                ));
            }
            page
        }
        None => FIND_ALL_DEFAULTS.page as i64,
    };

    let page_size = match non_empty(&query.page_size) {
        Some(raw) => {
            let page_size = parse_number(raw, PAGE_SIZE_NOT_A_NUMBER, "Page size must be a number")?;
            if page_size <= 0 {
                return Err(AppError::bad_request(
                    PAGE_SIZE_NOT_GREATER_THAN_ZERO,
                    "Page size must be a positive integer and greater than 0",
                    json!({ "page_size": page_size }),
                ));
            }
            page_size
        }
        None => FIND_ALL_DEFAULTS.page_size as i64,
    };

    let sort_by = non_empty(&query.sort_by);
    let sort_order = non_empty(&query.sort_order);

    if let Some(sort_by) = sort_by
        && sort_by.parse::<f64>().is_ok_and(f64::is_finite)
    {
        return Err(AppError::bad_request(
            SORT_BY_NOT_A_STRING,
            "Sort by must be a string",
            json!({ "sort_by": sort_by }),
        ));
    }

    let field = match sort_by {
        Some(name) => Some(T::field_by_name(name).ok_or_else(|| {
            AppError::bad_request(
                SORT_BY_UNKNOWN_FIELD,
                format!("Cannot sort by unknown field '{name}'"),
                json!({ "sort_by": name, "table": T::TABLE }),
            )
        })?),
        None => None,
    };

    let order = match sort_order {
        Some(raw) => Some(SortOrder::parse(raw).ok_or_else(|| {
            AppError::bad_request(
                SORT_ORDER_INVALID,
                "Sort order must be either 'asc' or 'desc'",
                json!({ "sort_order": raw }),
            )
        })?),
        None => None,
    };

    let order_by = match (field, order) {
        (Some(field), Some(order)) => OrderBy::new().then(field, order),
        (None, None) => OrderBy::new(),
        _ => {
            return Err(AppError::bad_request(
                SORT_ORDER_BOTH_REQUIRED,
                "Both sort by and sort order must be provided together or not at all",
                json!({}),
            ));
        }
    };

    Ok(FindAllParams {
        page,
        page_size,
        order_by,
    })
}

/// Validates `query` and runs `find_all` as a paginated, ordered listing.
///
/// # Errors
///
/// See [`parse_find_all_query`]; store errors are propagated unchanged.
pub async fn execute_find_all_with_params<T: Entity>(
    query: &FindAllQuery,
    find_all: FindAll<T>,
) -> Result<PaginatedResponse<T>, AppError> {
    let params = parse_find_all_query::<T>(query)?;

    find_all
        .set_paginated()
        .set_order_by(params.order_by)
        .set_page(params.page)?
        .set_page_size(params.page_size)?
        .execute()
        .await
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(raw: &str, code: &'static str, message: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::bad_request(code, message, json!({ "value": raw })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ShortLink, ShortLinkField};

    fn query(
        page: Option<&str>,
        page_size: Option<&str>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> FindAllQuery {
        FindAllQuery {
            page: page.map(str::to_string),
            page_size: page_size.map(str::to_string),
            sort_by: sort_by.map(str::to_string),
            sort_order: sort_order.map(str::to_string),
        }
    }

    fn code_of(q: FindAllQuery) -> Option<&'static str> {
        parse_find_all_query::<ShortLink>(&q).err().and_then(|e| e.code())
    }

    #[test]
    fn test_meta_arithmetic() {
        let meta = PaginationMeta::new(100, 2, 25);
        assert_eq!(meta.total_pages, 4);
        assert!(meta.has_prev_page);
        assert!(meta.has_next_page);

        let last = PaginationMeta::new(100, 4, 25);
        assert!(!last.has_next_page);

        let partial = PaginationMeta::new(101, 4, 25);
        assert_eq!(partial.total_pages, 5);
        assert!(partial.has_next_page);
    }

    #[test]
    fn test_meta_for_empty_result() {
        let meta = PaginationMeta::new(0, 1, 30);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_prev_page);
        assert!(!meta.has_next_page);
    }

    #[test]
    fn test_meta_properties_hold_across_grid() {
        for total in 0..60u64 {
            for page_size in 1..12u64 {
                for page in 1..10u64 {
                    let meta = PaginationMeta::new(total, page, page_size);
                    assert_eq!(meta.total_pages, (total as f64 / page_size as f64).ceil() as u64);
                    assert_eq!(meta.has_next_page, page * page_size < total);
                    assert_eq!(meta.has_prev_page, page > 1);
                }
            }
        }
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let json = serde_json::to_value(PaginationMeta::new(10, 1, 5)).unwrap();
        assert_eq!(json["totalItems"], 10);
        assert_eq!(json["hasNextPage"], true);
    }

    #[test]
    fn test_page_request_skip() {
        assert_eq!(PageRequest::default().skip(), 0);
        assert_eq!(
            PageRequest {
                page: 3,
                page_size: 50
            }
            .skip(),
            100
        );
    }

    #[test]
    fn test_parse_defaults() {
        let params = parse_find_all_query::<ShortLink>(&FindAllQuery::default()).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 30);
        assert!(params.order_by.is_empty());
    }

    #[test]
    fn test_parse_full_query() {
        let params = parse_find_all_query::<ShortLink>(&query(
            Some("3"),
            Some("10"),
            Some("created_at"),
            Some("desc"),
        ))
        .unwrap();

        assert_eq!(params.page, 3);
        assert_eq!(params.page_size, 10);
        assert_eq!(
            params.order_by.iter().collect::<Vec<_>>(),
            vec![(ShortLinkField::CreatedAt, SortOrder::Desc)]
        );
    }

    #[test]
    fn test_parse_page_errors() {
        assert_eq!(code_of(query(Some("abc"), None, None, None)), Some(PAGE_NOT_A_NUMBER));
        assert_eq!(
            code_of(query(Some("0"), None, None, None)),
            Some(PAGE_NOT_GREATER_THAN_ZERO)
        );
    }

    #[test]
    fn test_parse_page_size_errors() {
        assert_eq!(
            code_of(query(None, Some("ten"), None, None)),
            Some(PAGE_SIZE_NOT_A_NUMBER)
        );
        assert_eq!(
            code_of(query(None, Some("-1"), None, None)),
            Some(PAGE_SIZE_NOT_GREATER_THAN_ZERO)
        );
    }

    #[test]
    fn test_parse_sort_errors() {
        assert_eq!(
            code_of(query(None, None, Some("123"), Some("asc"))),
            Some(SORT_BY_NOT_A_STRING)
        );
        assert_eq!(
            code_of(query(None, None, Some("nope"), Some("asc"))),
            Some(SORT_BY_UNKNOWN_FIELD)
        );
        assert_eq!(
            code_of(query(None, None, Some("short_id"), Some("up"))),
            Some(SORT_ORDER_INVALID)
        );
        assert_eq!(
            code_of(query(None, None, Some("short_id"), None)),
            Some(SORT_ORDER_BOTH_REQUIRED)
        );
        assert_eq!(
            code_of(query(None, None, None, Some("asc"))),
            Some(SORT_ORDER_BOTH_REQUIRED)
        );
    }

    #[test]
    fn test_query_deserializes_camel_case() {
        let q: FindAllQuery =
            serde_json::from_str(r#"{"page":"2","pageSize":"5","sortBy":"id","sortOrder":"asc"}"#)
                .unwrap();
        assert_eq!(q.page_size.as_deref(), Some("5"));
        assert_eq!(q.sort_by.as_deref(), Some("id"));
    }

    #[test]
    fn test_default_page_size_only_fills_blanks() {
        let missing = query(None, None, None, None).with_default_page_size(5);
        assert_eq!(missing.page_size.as_deref(), Some("5"));

        let blank = query(None, Some("  "), None, None).with_default_page_size(5);
        assert_eq!(blank.page_size.as_deref(), Some("5"));

        let given = query(None, Some("12"), None, None).with_default_page_size(5);
        assert_eq!(given.page_size.as_deref(), Some("12"));
    }
}
