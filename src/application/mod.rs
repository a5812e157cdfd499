//! Application layer services implementing business logic.
//!
//! Services orchestrate the generic repositories with the code generator and
//! the retry policy; they hold no storage details of their own.
//!
//! # Available Services
//!
//! - [`services::url_service::UrlService`] - Short link creation, listing and deletion
//! - [`services::user_service::UserService`] - User registration and lookup

pub mod services;
