//! Crate-wide error type.
//!
//! Every layer (builders, stores, services) reports failures through [`AppError`].
//! Storage failures are mapped once, in [`map_sqlx_error`], so that callers can
//! classify them without knowing which backend produced them.

use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A precondition was violated before any storage call was made.
    #[error("{message}")]
    Validation {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    /// Raised by stores on unique constraint violations.
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Forbidden { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Builds the conflict raised for a violated unique constraint.
    pub fn unique_violation(constraint: impl Into<String>) -> Self {
        let constraint = constraint.into();
        Self::conflict(
            "Unique constraint violation",
            json!({ "constraint": constraint }),
        )
    }

    /// Stable machine-readable kind of the error.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict { .. } => "conflict",
            AppError::Forbidden { .. } => "forbidden",
            AppError::Internal { .. } => "internal_error",
        }
    }

    /// Validation code, if this is a validation error.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AppError::Validation { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn details(&self) -> &Value {
        match self {
            AppError::Validation { details, .. }
            | AppError::NotFound { details, .. }
            | AppError::Conflict { details, .. }
            | AppError::Forbidden { details, .. }
            | AppError::Internal { details, .. } => details,
        }
    }

    /// Returns true if a store rejected a write because of a unique constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, AppError::Conflict { details, .. } if details.get("constraint").is_some())
    }

    /// Returns true if the violated unique constraint is exactly `constraint`.
    ///
    /// See [`crate::domain::entities::Entity::unique_constraint`] for the
    /// names PostgreSQL and [`crate::infrastructure::persistence::MemoryStore`] report.
    pub fn is_unique_violation_of(&self, constraint: &str) -> bool {
        match self {
            AppError::Conflict { details, .. } => {
                details.get("constraint").and_then(Value::as_str) == Some(constraint)
            }
            _ => false,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return AppError::unique_violation(db.constraint().unwrap_or_default());
    }

    if matches!(e, sqlx::Error::RowNotFound) {
        return AppError::not_found("Record not found", json!({}));
    }

    tracing::error!(error = %e, "Database error");
    AppError::internal("Database error", json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_is_classified() {
        let err = AppError::unique_violation("short_links_short_id_key");

        assert!(err.is_unique_violation());
        assert!(err.is_unique_violation_of("short_links_short_id_key"));
        assert!(!err.is_unique_violation_of("users_email_key"));
        assert_eq!(err.kind(), "conflict");
    }

    #[test]
    fn test_plain_conflict_is_not_a_unique_violation() {
        let err = AppError::conflict("Already exists", json!({}));
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_other_errors_are_not_collisions() {
        let err = AppError::internal("Database error", json!({}));
        assert!(!err.is_unique_violation_of("short_links_short_id_key"));

        let err = AppError::bad_request(
            "X",
            "bad",
            json!({ "constraint": "short_links_short_id_key" }),
        );
        assert!(!err.is_unique_violation_of("short_links_short_id_key"));
    }

    #[test]
    fn test_constraint_must_match_exactly() {
        let err = AppError::unique_violation("short_links_short_id_key");

        assert!(!err.is_unique_violation_of("short_links_id_key"));
        assert!(!err.is_unique_violation_of("short_id"));
        assert!(!err.is_unique_violation_of("id"));
    }

    #[test]
    fn test_validation_code_and_message() {
        let err = AppError::bad_request("PAGE_NOT_A_NUMBER", "Page must be a number", json!({}));

        assert_eq!(err.code(), Some("PAGE_NOT_A_NUMBER"));
        assert_eq!(err.to_string(), "Page must be a number");
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn test_unknown_sqlx_error_maps_to_internal() {
        let err = map_sqlx_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Internal { .. }));
        assert!(err.details().as_object().is_some_and(|o| o.is_empty()));
    }
}
