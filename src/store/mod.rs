pub mod memory;
pub mod sqlite;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app::Result;
use crate::domain::{AppSettings, Article, CustomFeed, FontSize, Section, Theme};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Upper bound on articles kept in the global article history.
pub const MAX_STORED_ARTICLES: usize = 500;

pub mod keys {
    pub const ARTICLES: &str = "calm_news_articles";
    pub const SECTIONS: &str = "calm_news_sections";
    pub const CUSTOM_FEEDS: &str = "calm_news_custom_feeds";
    pub const TOPICS: &str = "calm_news_topics";
    pub const LEGACY_LOCATION: &str = "calm_news_location_tracking";
    pub const LEGACY_COMPANY: &str = "calm_news_company_tracking";
    pub const READ_ARTICLES: &str = "calm_news_read_articles";
    pub const THEME: &str = "calm_news_theme";
    pub const FONT_SIZE: &str = "calm_news_font_size";
    pub const SETTINGS: &str = "calm_news_settings";

    /// Keys removed by a factory reset.
    pub const CLEARED: &[&str] = &[
        ARTICLES,
        SECTIONS,
        CUSTOM_FEEDS,
        TOPICS,
        LEGACY_LOCATION,
        LEGACY_COMPANY,
        READ_ARTICLES,
        THEME,
        FONT_SIZE,
    ];
}

/// Synchronous string key-value substrate.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Oldest publish time that survives the retention window.
///
/// A window reaching past the representable range retains everything.
pub fn retention_cutoff(settings: &AppSettings, now: DateTime<Utc>) -> DateTime<Utc> {
    Duration::try_days(i64::from(settings.retention_days))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Typed, namespaced access to persisted state.
///
/// Saves never fail from the caller's point of view: backend and
/// serialization errors are logged and the write is dropped. Loads treat
/// missing or unreadable data as the documented default.
#[derive(Clone)]
pub struct NewsStore {
    backend: Arc<dyn KeyValueStore + Send + Sync>,
}

impl NewsStore {
    pub fn new(backend: Arc<dyn KeyValueStore + Send + Sync>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read from storage");
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring corrupt stored value");
                None
            }
        }
    }

    fn write_raw(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.set(key, value) {
            tracing::error!(key, error = %e, "Failed to write to storage");
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.write_raw(key, &json),
            Err(e) => tracing::error!(key, error = %e, "Failed to serialize value for storage"),
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            tracing::error!(key, error = %e, "Failed to remove storage key");
        }
    }

    /// Merge `articles` into the stored history.
    ///
    /// Same-id articles are replaced by the new value. The result is pruned
    /// to the retention window, ordered newest first and capped at
    /// [`MAX_STORED_ARTICLES`].
    pub fn save_articles(&self, articles: &[Article]) {
        let settings = self.load_settings();
        let cutoff = retention_cutoff(&settings, Utc::now());

        let mut merged: Vec<Article> = self.load_articles();
        let mut index: HashMap<String, usize> = merged
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.clone(), i))
            .collect();

        for article in articles {
            match index.get(&article.id) {
                Some(&i) => merged[i] = article.clone(),
                None => {
                    index.insert(article.id.clone(), merged.len());
                    merged.push(article.clone());
                }
            }
        }

        let mut kept: Vec<(DateTime<Utc>, Article)> = merged
            .into_iter()
            .filter_map(|a| a.published_at().map(|at| (at, a)))
            .filter(|(at, _)| *at > cutoff)
            .collect();
        kept.sort_by(|a, b| b.0.cmp(&a.0));
        kept.truncate(MAX_STORED_ARTICLES);

        let kept: Vec<Article> = kept.into_iter().map(|(_, a)| a).collect();
        self.write_json(keys::ARTICLES, &kept);
    }

    pub fn load_articles(&self) -> Vec<Article> {
        self.read_json(keys::ARTICLES).unwrap_or_default()
    }

    pub fn save_sections(&self, sections: &[Section]) {
        self.write_json(keys::SECTIONS, sections);
    }

    pub fn load_sections(&self) -> Vec<Section> {
        self.read_json(keys::SECTIONS).unwrap_or_default()
    }

    pub fn save_custom_feeds(&self, feeds: &[CustomFeed]) {
        self.write_json(keys::CUSTOM_FEEDS, feeds);
    }

    pub fn load_custom_feeds(&self) -> Vec<CustomFeed> {
        self.read_json(keys::CUSTOM_FEEDS).unwrap_or_default()
    }

    pub fn save_topics(&self, topics: &[String]) {
        self.write_json(keys::TOPICS, topics);
    }

    /// Load topics, migrating the legacy location/company keys on first use.
    pub fn load_topics(&self) -> Vec<String> {
        if let Some(raw) = self.read_raw(keys::TOPICS) {
            return match serde_json::from_str(&raw) {
                Ok(topics) => topics,
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring corrupt topics");
                    Vec::new()
                }
            };
        }

        let location = self.read_raw(keys::LEGACY_LOCATION);
        let company = self.read_raw(keys::LEGACY_COMPANY);
        if location.is_none() && company.is_none() {
            return Vec::new();
        }

        let mut topics: Vec<String> = Vec::new();
        for raw in location.iter().chain(company.iter()) {
            for topic in parse_legacy_topics(raw) {
                if !topics.contains(&topic) {
                    topics.push(topic);
                }
            }
        }

        tracing::info!(count = topics.len(), "Migrated legacy tracking keys to topics");
        self.save_topics(&topics);
        self.remove(keys::LEGACY_LOCATION);
        self.remove(keys::LEGACY_COMPANY);

        topics
    }

    pub fn save_settings(&self, settings: &AppSettings) {
        self.write_json(keys::SETTINGS, settings);
    }

    pub fn load_settings(&self) -> AppSettings {
        self.read_json(keys::SETTINGS).unwrap_or_default()
    }

    pub fn save_read_articles(&self, ids: &[String]) {
        self.write_json(keys::READ_ARTICLES, ids);
    }

    pub fn load_read_articles(&self) -> Vec<String> {
        self.read_json(keys::READ_ARTICLES).unwrap_or_default()
    }

    pub fn save_theme(&self, theme: Theme) {
        self.write_raw(keys::THEME, theme.as_str());
    }

    pub fn load_theme(&self) -> Theme {
        self.read_raw(keys::THEME)
            .and_then(|raw| Theme::parse(&raw))
            .unwrap_or_default()
    }

    pub fn save_font_size(&self, size: FontSize) {
        self.write_raw(keys::FONT_SIZE, size.as_str());
    }

    pub fn load_font_size(&self) -> FontSize {
        self.read_raw(keys::FONT_SIZE)
            .and_then(|raw| FontSize::parse(&raw))
            .unwrap_or_default()
    }

    /// Factory reset of every key owned by the store except settings.
    pub fn clear(&self) {
        for key in keys::CLEARED {
            self.remove(key);
        }
    }
}

/// Legacy values are a JSON array, a JSON string, or an unquoted string.
fn parse_legacy_topics(raw: &str) -> Vec<String> {
    let values = serde_json::from_str::<Vec<String>>(raw)
        .or_else(|_| serde_json::from_str::<String>(raw).map(|s| vec![s]))
        .unwrap_or_else(|_| vec![raw.to_string()]);

    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
