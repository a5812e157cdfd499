mod common;

use std::sync::Arc;

use common::{FAST_RETRY, ScriptedCodes};
use shortlink::application::services::UrlService;
use shortlink::domain::repositories::FindAllQuery;
use shortlink::error::AppError;
use shortlink::utils::code_generator::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};

#[tokio::test]
async fn test_create_stores_link_with_generated_code() {
    let (store, repository) = common::memory_repository();
    let service = common::seeded_service(repository, 7);

    let link = service
        .create_short_url("https://example.com/page", Some("user1"))
        .await
        .unwrap();

    assert!((MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&link.short_id.len()));
    assert_eq!(link.long_url, "https://example.com/page");
    assert_eq!(link.user_id.as_deref(), Some("user1"));
    assert_eq!(store.len().await, 1);

    let found = service.find_one_by_short_id(&link.short_id).await.unwrap();
    assert_eq!(found.unwrap().long_url, "https://example.com/page");
}

#[tokio::test]
async fn test_taken_code_is_replaced_on_retry() {
    let (store, repository) = common::memory_repository();
    repository
        .create(common::new_link("taken1", None))
        .await
        .unwrap();

    let codes = Arc::new(ScriptedCodes::new(&["taken1", "fresh1"]));
    let service = UrlService::new(repository, codes.clone(), FAST_RETRY);

    let link = service
        .create_short_url("https://example.com", None)
        .await
        .unwrap();

    assert_eq!(link.short_id, "fresh1");
    assert_eq!(codes.remaining(), 0);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_gives_up_after_configured_attempts() {
    let (store, repository) = common::memory_repository();
    repository
        .create(common::new_link("taken1", None))
        .await
        .unwrap();

    let codes = Arc::new(ScriptedCodes::new(&["taken1", "taken1", "taken1", "unused"]));
    let service = UrlService::new(repository, codes.clone(), FAST_RETRY);

    let err = service
        .create_short_url("https://example.com", None)
        .await
        .unwrap_err();

    assert!(err.is_unique_violation_of("short_links_short_id_key"));
    assert_eq!(codes.remaining(), 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_invalid_url_never_reaches_store() {
    let (store, repository) = common::memory_repository();
    let service = common::seeded_service(repository, 1);

    let result = service.create_short_url("not a url", None).await;

    assert!(matches!(result, Err(AppError::Validation { .. })));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_user_listing_is_scoped_and_paginated() {
    let (_, repository) = common::memory_repository();
    common::seed_links(&repository, "user1", 12).await;
    repository
        .create(common::new_link("other1", Some("user2")))
        .await
        .unwrap();
    let service = common::seeded_service(repository, 1);

    let query = FindAllQuery {
        page: Some("2".to_string()),
        page_size: Some("5".to_string()),
        sort_by: Some("short_id".to_string()),
        sort_order: Some("desc".to_string()),
    };
    let response = service.find_all_by_user_id("user1", &query).await.unwrap();

    let codes: Vec<_> = response.results.iter().map(|l| l.short_id.as_str()).collect();
    assert_eq!(codes, vec!["link006", "link005", "link004", "link003", "link002"]);

    let meta = response.meta.unwrap();
    assert_eq!(meta.total_items, 12);
    assert_eq!(meta.total_pages, 3);
    assert!(meta.has_next_page);
}

#[tokio::test]
async fn test_deleted_link_disappears_from_listing() {
    let (_, repository) = common::memory_repository();
    common::seed_links(&repository, "user1", 3).await;
    let service = common::seeded_service(repository, 1);

    service
        .delete_one_by_short_id("link001", "user1")
        .await
        .unwrap();

    let response = service
        .find_all_by_user_id("user1", &FindAllQuery::default())
        .await
        .unwrap();
    assert_eq!(response.meta.unwrap().total_items, 2);
    assert!(service.find_one_by_short_id("link001").await.unwrap().is_none());

    // Deleting twice finds nothing the second time.
    let again = service.delete_one_by_short_id("link001", "user1").await;
    assert!(matches!(again, Err(AppError::NotFound { .. })));
}

#[tokio::test]
async fn test_only_owner_can_delete() {
    let (_, repository) = common::memory_repository();
    repository
        .create(common::new_link("mine01", Some("user1")))
        .await
        .unwrap();
    repository
        .create(common::new_link("anon01", None))
        .await
        .unwrap();
    let service = common::seeded_service(repository, 1);

    let forbidden = service.delete_one_by_short_id("mine01", "user2").await;
    assert!(matches!(forbidden, Err(AppError::Forbidden { .. })));

    let anonymous = service.delete_one_by_short_id("anon01", "user1").await;
    assert!(matches!(anonymous, Err(AppError::Validation { .. })));

    assert!(service.find_one_by_short_id("mine01").await.unwrap().is_some());
}

#[tokio::test]
async fn test_listing_uses_service_default_page_size() {
    let (_, repository) = common::memory_repository();
    common::seed_links(&repository, "user1", 12).await;
    let service = common::seeded_service(repository, 1).with_default_page_size(5);

    let response = service
        .find_all_by_user_id("user1", &FindAllQuery::default())
        .await
        .unwrap();

    assert_eq!(response.results.len(), 5);
    let meta = response.meta.unwrap();
    assert_eq!(meta.page_size, 5);
    assert_eq!(meta.total_pages, 3);
}
