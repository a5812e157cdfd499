#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use shortlink::application::services::UrlService;
use shortlink::domain::entities::{NewShortLink, ShortLink};
use shortlink::domain::repositories::{LinkRepository, Repository};
use shortlink::error::AppError;
use shortlink::infrastructure::persistence::MemoryStore;
use shortlink::utils::code_generator::{CodeGenerator, ShortCodeGenerator};
use shortlink::utils::retry::RetryConfig;

/// Retry policy without waits, so collision tests run instantly.
pub const FAST_RETRY: RetryConfig = RetryConfig {
    attempts: 3,
    delay_ms: 0,
    backoff: false,
};

pub fn memory_repository() -> (Arc<MemoryStore<ShortLink>>, LinkRepository) {
    let store = Arc::new(MemoryStore::<ShortLink>::new());
    let repository = Repository::new(store.clone());
    (store, repository)
}

pub fn seeded_service(repository: LinkRepository, seed: u64) -> UrlService {
    UrlService::new(
        repository,
        Arc::new(ShortCodeGenerator::with_seed(seed)),
        FAST_RETRY,
    )
}

pub fn new_link(short_id: &str, user_id: Option<&str>) -> NewShortLink {
    NewShortLink {
        short_id: short_id.to_string(),
        long_url: format!("https://example.com/{short_id}"),
        user_id: user_id.map(str::to_string),
    }
}

/// Inserts `count` links owned by `user_id`, coded `link000`, `link001`, ...
pub async fn seed_links(repository: &LinkRepository, user_id: &str, count: usize) {
    for i in 0..count {
        repository
            .create(new_link(&format!("link{i:03}"), Some(user_id)))
            .await
            .unwrap();
    }
}

/// Hands out a fixed sequence of codes, then fails.
pub struct ScriptedCodes {
    codes: Mutex<VecDeque<String>>,
}

impl ScriptedCodes {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.codes.lock().unwrap().len()
    }
}

impl CodeGenerator for ScriptedCodes {
    fn generate_by_range(&self, _min: usize, _max: usize) -> Result<String, AppError> {
        self.codes
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::internal("No scripted codes left", serde_json::json!({})))
    }
}
