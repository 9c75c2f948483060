use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::digest::DigestEngine;
use crate::discovery::Discovery;
use crate::domain::Section;
use crate::fetcher::{Fetcher, HttpFetcher, ParallelFetcher};
use crate::library::Library;
use crate::sources::plan_sections;
use crate::store::{NewsStore, SqliteStore};

pub struct AppContext {
    pub config: Config,
    pub store: NewsStore,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub parallel_fetcher: ParallelFetcher,
    pub engine: DigestEngine,
    pub discovery: Discovery,
    pub library: Library,
}

impl AppContext {
    /// Open the SQLite store at the configured path and build an HTTP fetcher.
    pub fn new(config: Config) -> Result<Self> {
        let db_path = config.database_path()?;
        tracing::debug!("Opening database at {}", db_path.display());

        let store = NewsStore::new(Arc::new(SqliteStore::new(&db_path)?));
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetch)?);
        Ok(Self::with_parts(config, store, fetcher))
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = NewsStore::new(Arc::new(SqliteStore::in_memory()?));
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetch)?);
        Ok(Self::with_parts(config, store, fetcher))
    }

    pub fn with_parts(
        config: Config,
        store: NewsStore,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
    ) -> Self {
        let parallel_fetcher = ParallelFetcher::with_workers(fetcher.clone(), config.fetch.workers);
        let engine = DigestEngine::new(parallel_fetcher.clone(), store.clone());
        let discovery = Discovery::new(fetcher.clone(), config.sources.clone());
        let library = Library::new(store.clone());

        Self {
            config,
            store,
            fetcher,
            parallel_fetcher,
            engine,
            discovery,
            library,
        }
    }

    /// Sections for the current library, seeded with stored articles.
    ///
    /// An empty library (no feeds and no topics) is seeded with the curated
    /// defaults first.
    pub fn sections_to_refresh(&self) -> Vec<Section> {
        let mut feeds = self.library.feeds();
        let topics = self.library.topics();

        if feeds.is_empty() && topics.is_empty() {
            let added = self.library.restore_defaults();
            tracing::info!(added, "Seeded library with default feeds");
            feeds = self.library.feeds();
        }

        plan_sections(&feeds, &topics, &self.store.load_sections(), &self.config.sources)
    }
}
