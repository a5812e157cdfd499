//! Storage delegate implementations.
//!
//! # Stores
//!
//! - [`PgStore`] - PostgreSQL, statements built with `sqlx::QueryBuilder`
//! - [`MemoryStore`] - in-process, for tests and local runs
//!
//! [`connect_pool`] and [`run_migrations`] prepare the database for [`PgStore`].

pub mod memory_store;
pub mod pg_store;
pub mod pool;

pub use memory_store::MemoryStore;
pub use pg_store::PgStore;
pub use pool::{connect_pool, run_migrations};
