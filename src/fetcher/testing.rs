use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::app::{CalmError, Result};
use crate::fetcher::Fetcher;

/// In-memory fetcher serving canned bodies; unknown URLs answer 404.
#[derive(Default)]
pub struct ScriptedFetcher {
    bodies: HashMap<String, String>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub fn with_failure(mut self, url: &str) -> Self {
        self.bodies.remove(url);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| CalmError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}
