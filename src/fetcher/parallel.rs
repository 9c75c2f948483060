use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::{CalmError, Result};
use crate::fetcher::Fetcher;

pub const DEFAULT_WORKERS: usize = 10;

/// Fans fetches out over tokio tasks and joins them back in input order.
///
/// Each URL is fetched independently; one failure only affects its own slot.
#[derive(Clone)]
pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS)
    }

    pub fn with_workers(fetcher: Arc<dyn Fetcher + Send + Sync>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher + Send + Sync> {
        &self.fetcher
    }

    pub async fn fetch_all(&self, urls: Vec<String>) -> Vec<Result<String>> {
        let mut handles = Vec::with_capacity(urls.len());

        for url in urls {
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| CalmError::Other(e.to_string()))?;

                tracing::debug!("Fetching {}", url);
                fetcher.fetch(&url).await
            });

            handles.push(handle);
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                    results.push(Err(CalmError::Other(format!("fetch task failed: {}", e))));
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::ScriptedFetcher;

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let fetcher = ScriptedFetcher::new()
            .with_body("https://a.test", "A")
            .with_body("https://b.test", "B")
            .with_failure("https://c.test");
        let parallel = ParallelFetcher::with_workers(Arc::new(fetcher), 2);

        let results = parallel
            .fetch_all(vec![
                "https://a.test".into(),
                "https://c.test".into(),
                "https://b.test".into(),
            ])
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_deref().unwrap(), "A");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_deref().unwrap(), "B");
    }

    #[tokio::test]
    async fn test_zero_workers_still_progresses() {
        let fetcher = ScriptedFetcher::new().with_body("https://a.test", "A");
        let parallel = ParallelFetcher::with_workers(Arc::new(fetcher), 0);

        let results = parallel.fetch_all(vec!["https://a.test".into()]).await;
        assert_eq!(results[0].as_deref().unwrap(), "A");
    }
}
