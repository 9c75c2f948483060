//! Turn a free-text query into a previewable search feed.

use std::sync::Arc;

use crate::app::{CalmError, Result};
use crate::config::SourcesConfig;
use crate::domain::{Article, CustomFeed};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::sources::{news_search_url, proxy_url};

const MIN_QUERY_LEN: usize = 2;
const PREVIEW_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryResult {
    pub name: String,
    /// Feed URL without the proxy applied.
    pub url: String,
    pub preview: Vec<Article>,
}

impl DiscoveryResult {
    pub fn into_custom_feed(self) -> CustomFeed {
        CustomFeed::new(&self.name, &self.url)
    }
}

#[derive(Clone)]
pub struct Discovery {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    config: SourcesConfig,
    normalizer: Normalizer,
}

impl Discovery {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, config: SourcesConfig) -> Self {
        Self {
            fetcher,
            config,
            normalizer: Normalizer::new(),
        }
    }

    /// Look up a search feed for `query`.
    ///
    /// Queries shorter than two characters return `None` without touching
    /// the network. A feed with no items is still a result, with an empty
    /// preview.
    pub async fn discover(&self, query: &str) -> Result<Option<DiscoveryResult>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(None);
        }

        let url = news_search_url(query, self.config.discovery_region);
        let fetch_url = proxy_url(self.config.proxy.as_deref(), &url);

        let xml = self.fetcher.fetch(&fetch_url).await.map_err(|e| {
            tracing::warn!(query, error = %e, "Discovery failed");
            CalmError::Discovery(query.to_string())
        })?;

        let mut preview = self.normalizer.parse(&xml, query);
        preview.truncate(PREVIEW_LEN);

        tracing::debug!(query, previews = preview.len(), "Discovery succeeded");

        Ok(Some(DiscoveryResult {
            name: query.to_string(),
            url,
            preview,
        }))
    }
}
