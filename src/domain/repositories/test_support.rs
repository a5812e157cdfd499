//! Test doubles for the storage delegate.

use async_trait::async_trait;
use chrono::Utc;

use super::query::{QueryArgs, UpdateArgs};
use super::storage::Storage;
use crate::domain::entities::{Draft, NewShortLink, ShortLink};
use crate::error::AppError;

mockall::mock! {
    pub LinkStore {}

    #[async_trait]
    impl Storage<ShortLink> for LinkStore {
        async fn find_many(&self, args: QueryArgs<ShortLink>) -> Result<Vec<ShortLink>, AppError>;
        async fn find_unique(&self, args: QueryArgs<ShortLink>) -> Result<Option<ShortLink>, AppError>;
        async fn count(&self, args: QueryArgs<ShortLink>) -> Result<u64, AppError>;
        async fn create(&self, draft: NewShortLink) -> Result<ShortLink, AppError>;
        async fn update(&self, args: UpdateArgs<ShortLink>) -> Result<ShortLink, AppError>;
    }
}

pub fn link(id: i64, short_id: &str, user_id: Option<&str>) -> ShortLink {
    NewShortLink {
        short_id: short_id.to_string(),
        long_url: format!("https://example.com/{id}"),
        user_id: user_id.map(str::to_string),
    }
    .into_entity(id, Utc::now())
}
