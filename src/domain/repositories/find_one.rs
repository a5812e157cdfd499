//! Single-record lookup builder.

use serde_json::json;
use std::sync::Arc;

use super::base_find::{BaseFind, FindState};
use super::query::{OrderBy, QueryArgs};
use super::storage::Storage;
use crate::domain::entities::Entity;
use crate::error::AppError;

pub const FIND_ONE_VALIDATION_ERROR: &str = "FIND_ONE_VALIDATION_ERROR";

/// Builds and runs a lookup of at least one discriminating condition.
///
/// ```ignore
/// let link = repository
///     .find_one()
///     .set_where(Where::new().and(ShortLinkField::ShortId, "abc123"))
///     .execute()
///     .await?;
/// ```
pub struct FindOne<T: Entity> {
    storage: Arc<dyn Storage<T>>,
    state: FindState<T>,
}

impl<T: Entity> FindOne<T> {
    pub fn new(storage: Arc<dyn Storage<T>>) -> Self {
        Self {
            storage,
            state: FindState::new(),
        }
    }

    /// Runs the lookup.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] without touching storage if no
    /// condition other than the soft-delete flag was set.
    /// Propagates store errors unchanged.
    pub async fn execute(self) -> Result<Option<T>, AppError> {
        let args = self.args()?;
        tracing::debug!(table = T::TABLE, filter = ?args.filter, "find_one");
        self.storage.find_unique(args).await
    }

    fn args(&self) -> Result<QueryArgs<T>, AppError> {
        if self.state.filter.discriminating_len() == 0 {
            return Err(AppError::bad_request(
                FIND_ONE_VALIDATION_ERROR,
                "Where condition is required for findOne operation",
                json!({ "table": T::TABLE }),
            ));
        }

        Ok(QueryArgs {
            filter: self.state.filter.resolve(),
            projection: self.state.projection.clone(),
            order_by: OrderBy::new(),
            skip: None,
            take: None,
        })
    }
}

impl<T: Entity> BaseFind<T> for FindOne<T> {
    fn state(&self) -> &FindState<T> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FindState<T> {
        &mut self.state
    }
}
