//! User library: custom feeds, topics, settings and reader preferences.
//!
//! Every mutation reads the current value from the store, applies the
//! change and writes it back.

use crate::domain::{AppSettings, CustomFeed, FontSize, SettingsUpdate, Theme};
use crate::sources::default_feeds;
use crate::store::NewsStore;

#[derive(Clone)]
pub struct Library {
    store: NewsStore,
}

impl Library {
    pub fn new(store: NewsStore) -> Self {
        Self { store }
    }

    pub fn feeds(&self) -> Vec<CustomFeed> {
        self.store.load_custom_feeds()
    }

    /// Add a feed. Returns `None` when the name or URL is blank or a feed
    /// with the same URL already exists.
    pub fn add_feed(&self, name: &str, url: &str) -> Option<CustomFeed> {
        let (name, url) = (name.trim(), url.trim());
        if name.is_empty() || url.is_empty() {
            return None;
        }

        let mut feeds = self.feeds();
        if feeds.iter().any(|f| f.url == url) {
            tracing::warn!(url, "Feed already exists");
            return None;
        }

        let feed = CustomFeed::new(name, url);
        feeds.push(feed.clone());
        self.store.save_custom_feeds(&feeds);
        Some(feed)
    }

    /// Remove a feed by id. Returns whether anything was removed.
    pub fn remove_feed(&self, id: &str) -> bool {
        let mut feeds = self.feeds();
        let before = feeds.len();
        feeds.retain(|f| f.id != id);
        if feeds.len() == before {
            return false;
        }
        self.store.save_custom_feeds(&feeds);
        true
    }

    /// Append the curated defaults whose URL is not in the library yet.
    /// Returns the number of feeds added.
    pub fn restore_defaults(&self) -> usize {
        let mut feeds = self.feeds();
        let missing: Vec<CustomFeed> = default_feeds()
            .into_iter()
            .filter(|d| !feeds.iter().any(|f| f.url == d.url))
            .collect();

        let added = missing.len();
        feeds.extend(missing);
        self.store.save_custom_feeds(&feeds);
        added
    }

    pub fn topics(&self) -> Vec<String> {
        self.store.load_topics()
    }

    /// Add a topic. Blank and duplicate topics are ignored.
    pub fn add_topic(&self, topic: &str) -> bool {
        let topic = topic.trim();
        if topic.is_empty() {
            return false;
        }

        let mut topics = self.topics();
        if topics.iter().any(|t| t == topic) {
            tracing::warn!(topic, "Topic already exists");
            return false;
        }

        topics.push(topic.to_string());
        self.store.save_topics(&topics);
        true
    }

    pub fn remove_topic(&self, topic: &str) -> bool {
        let mut topics = self.topics();
        let before = topics.len();
        topics.retain(|t| t != topic);
        if topics.len() == before {
            return false;
        }
        self.store.save_topics(&topics);
        true
    }

    pub fn settings(&self) -> AppSettings {
        self.store.load_settings()
    }

    /// Merge a partial update into the stored settings.
    pub fn update_settings(&self, update: SettingsUpdate) -> AppSettings {
        let settings = self.settings().apply(update);
        self.store.save_settings(&settings);
        settings
    }

    pub fn is_read(&self, id: &str) -> bool {
        self.store.load_read_articles().iter().any(|r| r == id)
    }

    /// Flip the read state of an article. Returns the new state.
    pub fn toggle_read(&self, id: &str) -> bool {
        let mut read = self.store.load_read_articles();
        let now_read = match read.iter().position(|r| r == id) {
            Some(pos) => {
                read.remove(pos);
                false
            }
            None => {
                read.push(id.to_string());
                true
            }
        };
        self.store.save_read_articles(&read);
        now_read
    }

    pub fn theme(&self) -> Theme {
        self.store.load_theme()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.store.save_theme(theme);
    }

    pub fn font_size(&self) -> FontSize {
        self.store.load_font_size()
    }

    pub fn set_font_size(&self, size: FontSize) {
        self.store.save_font_size(size);
    }
}
