//! User entity representing a registered account.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::{Draft, Entity, FieldValue};

/// A registered user. `password` always holds a hash, never the raw secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserField {
    Id,
    Email,
    Password,
    IsAdmin,
    CreatedAt,
    IsDeleted,
}

impl Entity for User {
    type Field = UserField;
    type Draft = NewUser;

    const TABLE: &'static str = "users";
    const SOFT_DELETE: UserField = UserField::IsDeleted;
    const UNIQUE: &'static [UserField] = &[UserField::Email];
    const FIELDS: &'static [UserField] = &[
        UserField::Id,
        UserField::Email,
        UserField::Password,
        UserField::IsAdmin,
        UserField::CreatedAt,
        UserField::IsDeleted,
    ];

    fn column(field: UserField) -> &'static str {
        match field {
            UserField::Id => "id",
            UserField::Email => "email",
            UserField::Password => "password",
            UserField::IsAdmin => "is_admin",
            UserField::CreatedAt => "created_at",
            UserField::IsDeleted => "is_deleted",
        }
    }

    fn value(&self, field: UserField) -> FieldValue {
        match field {
            UserField::Id => self.id.clone().into(),
            UserField::Email => self.email.clone().into(),
            UserField::Password => self.password.clone().into(),
            UserField::IsAdmin => self.is_admin.into(),
            UserField::CreatedAt => self.created_at.into(),
            UserField::IsDeleted => self.is_deleted.into(),
        }
    }

    fn clear(&mut self, field: UserField) {
        match field {
            UserField::Id => self.id.clear(),
            UserField::Email => self.email.clear(),
            UserField::Password => self.password.clear(),
            UserField::IsAdmin => self.is_admin = false,
            UserField::CreatedAt => self.created_at = DateTime::<Utc>::default(),
            UserField::IsDeleted => self.is_deleted = false,
        }
    }

    fn apply(&mut self, field: UserField, value: &FieldValue) {
        match (field, value) {
            (UserField::Id, FieldValue::Text(v)) => self.id = v.clone(),
            (UserField::Email, FieldValue::Text(v)) => self.email = v.clone(),
            (UserField::Password, FieldValue::Text(v)) => self.password = v.clone(),
            (UserField::IsAdmin, FieldValue::Bool(v)) => self.is_admin = *v,
            (UserField::CreatedAt, FieldValue::Timestamp(v)) => self.created_at = *v,
            (UserField::IsDeleted, FieldValue::Bool(v)) => self.is_deleted = *v,
            _ => {}
        }
    }
}

/// Input data for creating a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

impl Draft<User> for NewUser {
    fn values(&self) -> Vec<(UserField, FieldValue)> {
        vec![
            (UserField::Email, self.email.clone().into()),
            (UserField::Password, self.password.clone().into()),
            (UserField::IsAdmin, self.is_admin.into()),
        ]
    }

    fn into_entity(self, seq: i64, now: DateTime<Utc>) -> User {
        User {
            id: seq.to_string(),
            email: self.email,
            password: self.password,
            is_admin: self.is_admin,
            created_at: now,
            is_deleted: false,
        }
    }
}
