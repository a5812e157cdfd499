//! Business logic services for the application layer.

pub mod url_service;
pub mod user_service;

pub use url_service::UrlService;
pub use user_service::{NewUserParams, PasswordHasher, UserService};
