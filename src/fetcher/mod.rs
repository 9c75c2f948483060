pub mod http_fetcher;
pub mod parallel;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;
pub use parallel::{ParallelFetcher, DEFAULT_WORKERS};

/// Fetch capability consumed by the digest engine and discovery.
///
/// Implementations return the response body as text. Non-success statuses
/// must surface as [`CalmError::HttpStatus`](crate::app::CalmError::HttpStatus).
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<String>;
}
