//! Short link creation, lookup and deletion.

use serde_json::json;
use std::sync::Arc;
use url::Url;

use crate::domain::entities::{Entity, NewShortLink, ShortLink, ShortLinkField};
use crate::domain::repositories::{
    BaseFind, FIND_ALL_DEFAULTS, FindAllQuery, LinkRepository, PaginatedResponse, Where,
    execute_find_all_with_params,
};
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, MAX_CODE_LENGTH, MIN_CODE_LENGTH};
use crate::utils::retry::{Retry, RetryConfig};

pub const INVALID_URL: &str = "INVALID_URL";
pub const ANONYMOUS_LINK: &str = "ANONYMOUS_LINK";

/// Service for creating and managing short links.
///
/// Short codes are generated randomly and uniqueness is left to the store:
/// a collision on `short_id` is retried with a fresh code under the
/// configured [`RetryConfig`]. Any other failure propagates immediately.
pub struct UrlService {
    repository: LinkRepository,
    codes: Arc<dyn CodeGenerator>,
    retry: RetryConfig,
    default_page_size: u64,
}

impl UrlService {
    pub fn new(repository: LinkRepository, codes: Arc<dyn CodeGenerator>, retry: RetryConfig) -> Self {
        Self {
            repository,
            codes,
            retry,
            default_page_size: FIND_ALL_DEFAULTS.page_size,
        }
    }

    /// Page size used by listings that do not ask for one.
    pub fn with_default_page_size(mut self, page_size: u64) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Creates a short link for `url`, owned by `user_id` if given.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `url` is not an absolute URL.
    /// Returns [`AppError::Conflict`] if every attempt collided.
    /// Other store errors are returned without retrying.
    pub async fn create_short_url(
        &self,
        url: &str,
        user_id: Option<&str>,
    ) -> Result<ShortLink, AppError> {
        Url::parse(url).map_err(|e| {
            AppError::bad_request(
                INVALID_URL,
                "Invalid URL format",
                json!({ "url": url, "reason": e.to_string() }),
            )
        })?;

        tracing::info!(url, user_id, "Creating short URL");

        let collision = ShortLink::unique_constraint(ShortLinkField::ShortId);
        let retry = Retry::new(self.retry)?
            .should_retry(move |e: &AppError, _| e.is_unique_violation_of(&collision))
            .on_retry(|e, attempt| {
                tracing::warn!(attempt, error = %e, details = %e.details(), "short code collision");
                metrics::counter!("short_link_collisions_total").increment(1);
            });

        let repository = &self.repository;
        let codes = &self.codes;

        let link = retry
            .execute(|| {
                let draft = codes
                    .generate_by_range(MIN_CODE_LENGTH, MAX_CODE_LENGTH)
                    .map(|short_id| NewShortLink {
                        short_id,
                        long_url: url.to_string(),
                        user_id: user_id.map(str::to_string),
                    });

                async move { repository.create(draft?).await }
            })
            .await?;

        metrics::counter!("short_links_created_total").increment(1);
        Ok(link)
    }

    /// Looks up a live link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn find_one_by_short_id(&self, short_id: &str) -> Result<Option<ShortLink>, AppError> {
        tracing::info!(short_id, "Finding short URL");

        self.repository
            .find_one()
            .set_where(Where::new().and(ShortLinkField::ShortId, short_id))
            .execute()
            .await
    }

    /// Lists the live links of `user_id`, paginated and optionally sorted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `query` is malformed.
    ///
    /// A missing page size falls back to the service's default page size.
    pub async fn find_all_by_user_id(
        &self,
        user_id: &str,
        query: &FindAllQuery,
    ) -> Result<PaginatedResponse<ShortLink>, AppError> {
        tracing::info!(user_id, "Finding short URLs by user");

        let find_all = self
            .repository
            .find_all()
            .set_where(Where::new().and(ShortLinkField::UserId, user_id));

        let query = query.clone().with_default_page_size(self.default_page_size);
        execute_find_all_with_params(&query, find_all).await
    }

    /// Soft-deletes a link owned by `user_id`.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no live link has this code
    /// - [`AppError::Validation`] (`ANONYMOUS_LINK`) if the link has no owner
    /// - [`AppError::Forbidden`] if another user owns the link
    pub async fn delete_one_by_short_id(
        &self,
        short_id: &str,
        user_id: &str,
    ) -> Result<ShortLink, AppError> {
        tracing::info!(short_id, user_id, "Deleting short URL");

        let link = self.find_one_by_short_id(short_id).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "short_id": short_id }))
        })?;

        if !link.is_owned() {
            return Err(AppError::bad_request(
                ANONYMOUS_LINK,
                "Anonymous links cannot be deleted",
                json!({ "short_id": short_id }),
            ));
        }

        if !link.is_owned_by(user_id) {
            return Err(AppError::forbidden(
                "You do not have permission to delete this link",
                json!({ "short_id": short_id }),
            ));
        }

        self.repository
            .delete(Where::new().and(ShortLinkField::ShortId, short_id))
            .await
    }
}
