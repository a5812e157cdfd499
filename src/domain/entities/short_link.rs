//! Short link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::{Draft, Entity, FieldValue};

/// A shortened URL.
///
/// `user_id` is `None` for links created anonymously. `short_id` is unique
/// across all links, including soft-deleted ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ShortLink {
    pub id: i64,
    pub short_id: String,
    pub long_url: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl ShortLink {
    /// Returns true if the link belongs to a registered user.
    pub fn is_owned(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }
}

/// Columns of the `short_links` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShortLinkField {
    Id,
    ShortId,
    LongUrl,
    UserId,
    CreatedAt,
    IsDeleted,
}

impl Entity for ShortLink {
    type Field = ShortLinkField;
    type Draft = NewShortLink;

    const TABLE: &'static str = "short_links";
    const SOFT_DELETE: ShortLinkField = ShortLinkField::IsDeleted;
    const UNIQUE: &'static [ShortLinkField] = &[ShortLinkField::ShortId];
    const FIELDS: &'static [ShortLinkField] = &[
        ShortLinkField::Id,
        ShortLinkField::ShortId,
        ShortLinkField::LongUrl,
        ShortLinkField::UserId,
        ShortLinkField::CreatedAt,
        ShortLinkField::IsDeleted,
    ];

    fn column(field: ShortLinkField) -> &'static str {
        match field {
            ShortLinkField::Id => "id",
            ShortLinkField::ShortId => "short_id",
            ShortLinkField::LongUrl => "long_url",
            ShortLinkField::UserId => "user_id",
            ShortLinkField::CreatedAt => "created_at",
            ShortLinkField::IsDeleted => "is_deleted",
        }
    }

    fn value(&self, field: ShortLinkField) -> FieldValue {
        match field {
            ShortLinkField::Id => self.id.into(),
            ShortLinkField::ShortId => self.short_id.clone().into(),
            ShortLinkField::LongUrl => self.long_url.clone().into(),
            ShortLinkField::UserId => self.user_id.clone().into(),
            ShortLinkField::CreatedAt => self.created_at.into(),
            ShortLinkField::IsDeleted => self.is_deleted.into(),
        }
    }

    fn clear(&mut self, field: ShortLinkField) {
        match field {
            ShortLinkField::Id => self.id = 0,
            ShortLinkField::ShortId => self.short_id.clear(),
            ShortLinkField::LongUrl => self.long_url.clear(),
            ShortLinkField::UserId => self.user_id = None,
            ShortLinkField::CreatedAt => self.created_at = DateTime::<Utc>::default(),
            ShortLinkField::IsDeleted => self.is_deleted = false,
        }
    }

    fn apply(&mut self, field: ShortLinkField, value: &FieldValue) {
        match (field, value) {
            (ShortLinkField::Id, FieldValue::Int(v)) => self.id = *v,
            (ShortLinkField::ShortId, FieldValue::Text(v)) => self.short_id = v.clone(),
            (ShortLinkField::LongUrl, FieldValue::Text(v)) => self.long_url = v.clone(),
            (ShortLinkField::UserId, FieldValue::Text(v)) => self.user_id = Some(v.clone()),
            (ShortLinkField::UserId, FieldValue::Null) => self.user_id = None,
            (ShortLinkField::CreatedAt, FieldValue::Timestamp(v)) => self.created_at = *v,
            (ShortLinkField::IsDeleted, FieldValue::Bool(v)) => self.is_deleted = *v,
            _ => {}
        }
    }
}

/// Input data for creating a new short link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub short_id: String,
    pub long_url: String,
    pub user_id: Option<String>,
}

impl Draft<ShortLink> for NewShortLink {
    fn values(&self) -> Vec<(ShortLinkField, FieldValue)> {
        vec![
            (ShortLinkField::ShortId, self.short_id.clone().into()),
            (ShortLinkField::LongUrl, self.long_url.clone().into()),
            (ShortLinkField::UserId, self.user_id.clone().into()),
        ]
    }

    fn into_entity(self, seq: i64, now: DateTime<Utc>) -> ShortLink {
        ShortLink {
            id: seq,
            short_id: self.short_id,
            long_url: self.long_url,
            user_id: self.user_id,
            created_at: now,
            is_deleted: false,
        }
    }
}
