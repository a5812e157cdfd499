//! User registration and lookup.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{Entity, NewUser, User, UserField};
use crate::domain::repositories::{BaseFind, UserRepository, Where};
use crate::error::AppError;

/// One-way password hashing.
///
/// The algorithm lives outside this crate; the service only guarantees that
/// plain-text passwords never reach the store.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if hashing fails.
    fn hash(&self, password: &str) -> Result<String, AppError>;
}

/// Input of [`UserService::create`].
#[derive(Debug, Clone)]
pub struct NewUserParams {
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

pub struct UserService {
    repository: UserRepository,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(repository: UserRepository, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Registers a user with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    /// Returns [`AppError::Internal`] on hashing or store errors.
    pub async fn create(&self, params: NewUserParams) -> Result<User, AppError> {
        tracing::info!(email = %params.email, "Creating user");

        let password = self.hasher.hash(&params.password)?;
        let draft = NewUser {
            email: params.email,
            password,
            is_admin: params.is_admin,
        };
        let email = draft.email.clone();

        self.repository.create(draft).await.map_err(|e| {
            if e.is_unique_violation_of(&User::unique_constraint(UserField::Email)) {
                AppError::conflict(
                    "User with this email already exists",
                    json!({ "email": email }),
                )
            } else {
                tracing::error!(error = %e, "Error creating user");
                e
            }
        })
    }

    /// Looks up a live user by email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.repository
            .find_one()
            .set_where(Where::new().and(UserField::Email, email))
            .execute()
            .await
    }
}
