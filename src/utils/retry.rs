//! Retry policy for fallible async operations.
//!
//! A [`Retry`] is built fresh for every logical operation from a [`RetryConfig`]
//! value plus two hooks:
//!
//! - `should_retry(error, attempt)` decides whether a failure is retriable;
//!   returning `false` propagates the error without further attempts or waits.
//! - `on_retry(error, attempt)` runs for every retriable failure, the last
//!   one included, before deciding whether another attempt remains.
//!
//! The wait before attempt `k + 1` is `delay_ms * k` with backoff enabled and
//! `delay_ms` otherwise. Scheduling is delegated to [`tokio_retry::RetryIf`].

use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tokio_retry::RetryIf;

use crate::error::AppError;

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_DELAY_MS: u64 = 500;
pub const DEFAULT_BACKOFF: bool = false;

pub const RETRY_ATTEMPTS_INVALID: &str = "RETRY_ATTEMPTS_INVALID";

/// Attempt budget and wait policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of invocations, the first one included.
    pub attempts: u32,
    pub delay_ms: u64,
    /// Linear backoff: the wait grows by `delay_ms` after every failure.
    pub backoff: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay_ms: DEFAULT_DELAY_MS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

/// Waits between consecutive attempts; `attempts - 1` entries.
pub fn delay_schedule(config: &RetryConfig) -> Vec<Duration> {
    (1..config.attempts as u64)
        .map(|k| {
            let ms = if config.backoff {
                config.delay_ms.saturating_mul(k)
            } else {
                config.delay_ms
            };
            Duration::from_millis(ms)
        })
        .collect()
}

type ShouldRetry<E> = Box<dyn Fn(&E, u32) -> bool + Send + Sync>;
type OnRetry<E> = Box<dyn Fn(&E, u32) + Send + Sync>;

/// Runs an operation under a [`RetryConfig`].
///
/// # Examples
///
/// ```ignore
/// let link = Retry::new(config)?
///     .should_retry(|e: &AppError, _| e.is_unique_violation_of("short_links_short_id_key"))
///     .on_retry(|e, attempt| tracing::warn!(attempt, error = %e, "collision"))
///     .execute(|| async { repository.create(draft()).await })
///     .await?;
/// ```
pub struct Retry<E> {
    config: RetryConfig,
    should_retry: ShouldRetry<E>,
    on_retry: OnRetry<E>,
}

impl<E> Retry<E> {
    /// Creates a policy that retries every error and has no hook.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `config.attempts` is zero.
    pub fn new(config: RetryConfig) -> Result<Self, AppError> {
        if config.attempts == 0 {
            return Err(AppError::bad_request(
                RETRY_ATTEMPTS_INVALID,
                "Retry attempts must be at least 1",
                json!({ "attempts": config.attempts }),
            ));
        }

        Ok(Self {
            config,
            should_retry: Box::new(|_, _| true),
            on_retry: Box::new(|_, _| {}),
        })
    }

    pub fn should_retry(mut self, f: impl Fn(&E, u32) -> bool + Send + Sync + 'static) -> Self {
        self.should_retry = Box::new(f);
        self
    }

    pub fn on_retry(mut self, f: impl Fn(&E, u32) + Send + Sync + 'static) -> Self {
        self.on_retry = Box::new(f);
        self
    }

    pub fn config(&self) -> RetryConfig {
        self.config
    }

    /// Invokes `action` until it succeeds, a failure is not retriable, or the
    /// attempt budget is spent.
    ///
    /// # Errors
    ///
    /// Returns the last error observed.
    pub async fn execute<R, A, Fut>(&self, action: A) -> Result<R, E>
    where
        A: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let mut attempt = 0u32;
        let condition = |error: &E| {
            attempt += 1;
            if !(self.should_retry)(error, attempt) {
                return false;
            }
            (self.on_retry)(error, attempt);
            true
        };

        RetryIf::spawn(delay_schedule(&self.config), action, condition).await
    }
}
