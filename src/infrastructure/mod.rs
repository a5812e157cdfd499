//! Infrastructure layer for external integrations.
//!
//! Implements the storage contract defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL and in-memory stores
//! - [`logging`] - tracing subscriber setup

pub mod logging;
pub mod persistence;
