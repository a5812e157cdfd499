//! Helpers shared by the services.
//!
//! - [`code_generator`] - random short code generation
//! - [`retry`] - retry policy for fallible async operations

pub mod code_generator;
pub mod retry;
