//! Filter and projection state shared by [`super::FindOne`] and [`super::FindAll`].

use super::query::{Filter, Projection, Where};
use crate::domain::entities::Entity;

/// Builder state common to both read operations.
///
/// A fresh state always starts with the soft-delete predicate active and the
/// soft-delete flag omitted from results.
pub struct FindState<T: Entity> {
    pub filter: Filter<T>,
    pub projection: Projection<T>,
}

impl<T: Entity> FindState<T> {
    pub fn new() -> Self {
        Self {
            filter: Filter::new(),
            projection: Projection::new(),
        }
    }
}

impl<T: Entity> Default for FindState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for FindState<T> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            projection: self.projection.clone(),
        }
    }
}

impl<T: Entity> std::fmt::Debug for FindState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FindState")
            .field("filter", &self.filter)
            .field("projection", &self.projection)
            .finish()
    }
}

/// Chainable setters over [`FindState`].
///
/// Every setter consumes the builder and returns the updated value; nothing
/// touches storage until the builder's terminal `execute`.
pub trait BaseFind<T: Entity>: Sized {
    fn state(&self) -> &FindState<T>;
    fn state_mut(&mut self) -> &mut FindState<T>;

    /// Merges `conditions` into the current filter. Keys not present in
    /// `conditions` are kept.
    fn set_where(mut self, conditions: Where<T>) -> Self {
        self.state_mut().filter.conditions.merge(conditions);
        self
    }

    /// Replaces the set of returned fields.
    fn set_select(mut self, fields: impl IntoIterator<Item = T::Field>) -> Self {
        self.state_mut().projection.set_select(fields);
        self
    }

    /// Merges omit flags into the projection.
    fn set_omit(mut self, omit: impl IntoIterator<Item = (T::Field, bool)>) -> Self {
        self.state_mut().projection.set_omit(omit);
        self
    }

    /// Drops the implicit `is_deleted = false` predicate.
    fn include_deleted(mut self) -> Self {
        self.state_mut().filter.include_deleted = true;
        self
    }
}
