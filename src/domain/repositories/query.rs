//! Query values shared by the builders and the storage delegates.
//!
//! All of these are plain values: builders assemble them and hand an owned
//! [`QueryArgs`] snapshot to the store, so nothing a store sees can change
//! while a query is in flight.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::domain::entities::{Entity, FieldValue};

/// Equality conditions keyed by field.
///
/// Also used as the assignment set of an update (see [`Changes`]).
pub struct Where<T: Entity> {
    fields: BTreeMap<T::Field, FieldValue>,
}

/// Column assignments applied by `update`.
pub type Changes<T> = Where<T>;

impl<T: Entity> Where<T> {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Adds (or overwrites) one condition.
    pub fn and(mut self, field: T::Field, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: T::Field, value: impl Into<FieldValue>) {
        self.fields.insert(field, value.into());
    }

    /// Merges `other` into `self`. Keys absent from `other` are kept.
    pub fn merge(&mut self, other: Where<T>) {
        self.fields.extend(other.fields);
    }

    pub fn get(&self, field: T::Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    pub fn contains(&self, field: T::Field) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (T::Field, &FieldValue)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    /// Returns true if every condition holds for `entity`.
    pub fn matches(&self, entity: &T) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| entity.value(*field) == *expected)
    }
}

impl<T: Entity> Default for Where<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for Where<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<T: Entity> PartialEq for Where<T> {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl<T: Entity> fmt::Debug for Where<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields.iter()).finish()
    }
}

/// Caller conditions plus the soft-delete policy.
///
/// The soft-delete predicate is never stored in `conditions`; it is added by
/// [`Filter::resolve`] when the query is built, unless the caller either set
/// the soft-delete field explicitly or asked for deleted records.
pub struct Filter<T: Entity> {
    pub conditions: Where<T>,
    pub include_deleted: bool,
}

impl<T: Entity> Filter<T> {
    pub fn new() -> Self {
        Self {
            conditions: Where::new(),
            include_deleted: false,
        }
    }

    /// Number of caller conditions that narrow the query beyond the soft-delete flag.
    pub fn discriminating_len(&self) -> usize {
        self.conditions
            .iter()
            .filter(|(field, _)| *field != T::SOFT_DELETE)
            .count()
    }

    /// Effective conditions sent to the store.
    pub fn resolve(&self) -> Where<T> {
        let mut resolved = self.conditions.clone();
        if !self.include_deleted && !resolved.contains(T::SOFT_DELETE) {
            resolved.insert(T::SOFT_DELETE, false);
        }
        resolved
    }
}

impl<T: Entity> Default for Filter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            include_deleted: self.include_deleted,
        }
    }
}

impl<T: Entity> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("conditions", &self.conditions)
            .field("include_deleted", &self.include_deleted)
            .finish()
    }
}

/// Which fields are returned.
///
/// `select` is a whitelist (`None` = every field); `omit` excludes fields and
/// by default hides the soft-delete flag. Fields that are not returned come
/// back reset to their default value.
pub struct Projection<T: Entity> {
    select: Option<BTreeSet<T::Field>>,
    omit: BTreeMap<T::Field, bool>,
}

impl<T: Entity> Projection<T> {
    pub fn new() -> Self {
        Self {
            select: None,
            omit: BTreeMap::from([(T::SOFT_DELETE, true)]),
        }
    }

    /// Replaces the selection.
    pub fn set_select(&mut self, fields: impl IntoIterator<Item = T::Field>) {
        self.select = Some(fields.into_iter().collect());
    }

    /// Merges omit flags; `false` re-includes a previously omitted field.
    pub fn set_omit(&mut self, omit: impl IntoIterator<Item = (T::Field, bool)>) {
        self.omit.extend(omit);
    }

    pub fn select(&self) -> Option<&BTreeSet<T::Field>> {
        self.select.as_ref()
    }

    pub fn is_omitted(&self, field: T::Field) -> bool {
        self.omit.get(&field).copied().unwrap_or(false)
    }

    pub fn is_retained(&self, field: T::Field) -> bool {
        let selected = self.select.as_ref().is_none_or(|s| s.contains(&field));
        selected && !self.is_omitted(field)
    }

    /// Resets every field that is not part of the projection.
    pub fn apply(&self, entity: &mut T) {
        for field in T::FIELDS {
            if !self.is_retained(*field) {
                entity.clear(*field);
            }
        }
    }
}

impl<T: Entity> Default for Projection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for Projection<T> {
    fn clone(&self) -> Self {
        Self {
            select: self.select.clone(),
            omit: self.omit.clone(),
        }
    }
}

impl<T: Entity> PartialEq for Projection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.select == other.select && self.omit == other.omit
    }
}

impl<T: Entity> fmt::Debug for Projection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection")
            .field("select", &self.select)
            .field("omit", &self.omit)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses `"asc"` or `"desc"`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Ordered list of sort keys; earlier keys take precedence.
pub struct OrderBy<T: Entity> {
    keys: Vec<(T::Field, SortOrder)>,
}

impl<T: Entity> OrderBy<T> {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    pub fn then(mut self, field: T::Field, order: SortOrder) -> Self {
        self.keys.retain(|(f, _)| *f != field);
        self.keys.push((field, order));
        self
    }

    pub fn asc(self, field: T::Field) -> Self {
        self.then(field, SortOrder::Asc)
    }

    pub fn desc(self, field: T::Field) -> Self {
        self.then(field, SortOrder::Desc)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (T::Field, SortOrder)> + '_ {
        self.keys.iter().copied()
    }

    /// Compares two entities by the sort keys.
    pub fn compare(&self, a: &T, b: &T) -> std::cmp::Ordering {
        self.keys
            .iter()
            .map(|(field, order)| {
                let ordering = a.value(*field).cmp(&b.value(*field));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

impl<T: Entity> Default for OrderBy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for OrderBy<T> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
        }
    }
}

impl<T: Entity> PartialEq for OrderBy<T> {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl<T: Entity> fmt::Debug for OrderBy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys.iter()).finish()
    }
}

/// Arguments of every read issued to a [`super::Storage`].
pub struct QueryArgs<T: Entity> {
    pub filter: Where<T>,
    pub projection: Projection<T>,
    pub order_by: OrderBy<T>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl<T: Entity> QueryArgs<T> {
    /// Arguments carrying only conditions, as used by `count`.
    pub fn filtered(filter: Where<T>) -> Self {
        Self {
            filter,
            projection: Projection::new(),
            order_by: OrderBy::new(),
            skip: None,
            take: None,
        }
    }
}

impl<T: Entity> Clone for QueryArgs<T> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            projection: self.projection.clone(),
            order_by: self.order_by.clone(),
            skip: self.skip,
            take: self.take,
        }
    }
}

impl<T: Entity> fmt::Debug for QueryArgs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryArgs")
            .field("filter", &self.filter)
            .field("projection", &self.projection)
            .field("order_by", &self.order_by)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .finish()
    }
}

/// Arguments of an update: assignments plus the conditions selecting the row.
pub struct UpdateArgs<T: Entity> {
    pub data: Changes<T>,
    pub filter: Where<T>,
}

impl<T: Entity> fmt::Debug for UpdateArgs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateArgs")
            .field("data", &self.data)
            .field("filter", &self.filter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewShortLink, ShortLink, ShortLinkField};
    use crate::domain::entities::Draft;
    use chrono::Utc;

    fn link(id: i64, short_id: &str) -> ShortLink {
        NewShortLink {
            short_id: short_id.to_string(),
            long_url: "https://example.com".to_string(),
            user_id: Some("user1".to_string()),
        }
        .into_entity(id, Utc::now())
    }

    #[test]
    fn test_merge_keeps_unset_keys() {
        let mut base = Where::<ShortLink>::new()
            .and(ShortLinkField::IsDeleted, false)
            .and(ShortLinkField::UserId, "user1");

        base.merge(Where::new().and(ShortLinkField::ShortId, "abc"));

        assert_eq!(base.len(), 3);
        assert_eq!(
            base.get(ShortLinkField::IsDeleted),
            Some(&FieldValue::Bool(false))
        );
    }

    #[test]
    fn test_merge_overwrites_same_key() {
        let mut base = Where::<ShortLink>::new().and(ShortLinkField::UserId, "user1");
        base.merge(Where::new().and(ShortLinkField::UserId, "user2"));

        assert_eq!(
            base.get(ShortLinkField::UserId),
            Some(&FieldValue::from("user2"))
        );
    }

    #[test]
    fn test_filter_resolve_adds_soft_delete_predicate() {
        let filter = Filter::<ShortLink>::new();
        let resolved = filter.resolve();

        assert_eq!(resolved.len(), 1);
        assert_eq!(
            resolved.get(ShortLinkField::IsDeleted),
            Some(&FieldValue::Bool(false))
        );
    }

    #[test]
    fn test_filter_resolve_respects_explicit_flag() {
        let mut filter = Filter::<ShortLink>::new();
        filter.conditions.insert(ShortLinkField::IsDeleted, true);

        assert_eq!(
            filter.resolve().get(ShortLinkField::IsDeleted),
            Some(&FieldValue::Bool(true))
        );
        assert_eq!(filter.discriminating_len(), 0);
    }

    #[test]
    fn test_filter_resolve_include_deleted() {
        let filter = Filter::<ShortLink> {
            conditions: Where::new().and(ShortLinkField::ShortId, "abc"),
            include_deleted: true,
        };

        let resolved = filter.resolve();
        assert!(!resolved.contains(ShortLinkField::IsDeleted));
        assert_eq!(filter.discriminating_len(), 1);
    }

    #[test]
    fn test_where_matches() {
        let entity = link(1, "abc");

        assert!(
            Where::<ShortLink>::new()
                .and(ShortLinkField::ShortId, "abc")
                .and(ShortLinkField::IsDeleted, false)
                .matches(&entity)
        );
        assert!(
            !Where::<ShortLink>::new()
                .and(ShortLinkField::ShortId, "xyz")
                .matches(&entity)
        );
    }

    #[test]
    fn test_default_projection_omits_soft_delete_flag() {
        let projection = Projection::<ShortLink>::new();

        assert!(projection.is_omitted(ShortLinkField::IsDeleted));
        assert!(projection.is_retained(ShortLinkField::ShortId));
    }

    #[test]
    fn test_projection_select_replaces() {
        let mut projection = Projection::<ShortLink>::new();
        projection.set_select([ShortLinkField::ShortId, ShortLinkField::LongUrl]);
        projection.set_select([ShortLinkField::ShortId]);

        let mut entity = link(9, "abc");
        projection.apply(&mut entity);

        assert_eq!(entity.short_id, "abc");
        assert!(entity.long_url.is_empty());
        assert_eq!(entity.id, 0);
    }

    #[test]
    fn test_projection_omit_merges() {
        let mut projection = Projection::<ShortLink>::new();
        projection.set_omit([(ShortLinkField::LongUrl, true)]);

        assert!(projection.is_omitted(ShortLinkField::IsDeleted));
        assert!(projection.is_omitted(ShortLinkField::LongUrl));

        projection.set_omit([(ShortLinkField::IsDeleted, false)]);
        assert!(projection.is_retained(ShortLinkField::IsDeleted));
    }

    #[test]
    fn test_order_by_compare() {
        let a = link(1, "aaa");
        let b = link(2, "bbb");

        let asc = OrderBy::<ShortLink>::new().asc(ShortLinkField::ShortId);
        let desc = OrderBy::<ShortLink>::new().desc(ShortLinkField::ShortId);

        assert!(asc.compare(&a, &b).is_lt());
        assert!(desc.compare(&a, &b).is_gt());
        assert!(OrderBy::<ShortLink>::new().compare(&a, &b).is_eq());
    }

    #[test]
    fn test_order_by_same_field_is_replaced() {
        let order = OrderBy::<ShortLink>::new()
            .asc(ShortLinkField::Id)
            .desc(ShortLinkField::Id);

        assert_eq!(
            order.iter().collect::<Vec<_>>(),
            vec![(ShortLinkField::Id, SortOrder::Desc)]
        );
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("desc"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("DESC"), None);
    }
}
