//! Random short code generation.
//!
//! Codes use the 64-symbol URL-safe alphabet and a length picked uniformly
//! from a range, so that collisions stay rare without any coordination
//! between callers. Uniqueness itself is enforced by the store.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::sync::{Mutex, PoisonError};

use crate::error::AppError;

pub const MIN_CODE_LENGTH: usize = 6;
pub const MAX_CODE_LENGTH: usize = 10;

pub const CODE_RANGE_INVALID: &str = "CODE_RANGE_INVALID";

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Source of short codes.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    /// Generates a code whose length is uniform in `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `min > max`.
    fn generate_by_range(&self, min: usize, max: usize) -> Result<String, AppError>;
}

/// [`CodeGenerator`] backed by a seedable [`StdRng`].
pub struct ShortCodeGenerator {
    rng: Mutex<StdRng>,
}

impl ShortCodeGenerator {
    /// Seeds from the operating system.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic generator, for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for ShortCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for ShortCodeGenerator {
    fn generate_by_range(&self, min: usize, max: usize) -> Result<String, AppError> {
        if min > max {
            return Err(AppError::bad_request(
                CODE_RANGE_INVALID,
                "Minimum value cannot be greater than maximum value",
                json!({ "min": min, "max": max }),
            ));
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let length = rng.random_range(min..=max);

        Ok((0..length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect())
    }
}
