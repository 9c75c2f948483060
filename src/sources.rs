//! Logical sources and the fetch plan.
//!
//! Custom feeds and topics are turned into [`Section`]s with fully resolved
//! (optionally proxied) URLs, seeded with the articles stored for each
//! section id so the engine can merge instead of replace.

use std::collections::HashMap;

use serde::Deserialize;
use url::form_urlencoded;

use crate::config::SourcesConfig;
use crate::domain::{CustomFeed, Section};

pub const TOPIC_SECTION_PREFIX: &str = "topic-";

const NEWS_SEARCH_BASE: &str = "https://news.google.com/rss/search";

/// Google News edition used for search feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Region {
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "IN")]
    In,
}

impl Region {
    fn params(self) -> &'static str {
        match self {
            Region::In => "hl=en-IN&gl=IN&ceid=IN:en",
            Region::Us => "hl=en-US&gl=US&ceid=US:en",
        }
    }
}

/// Curated sources offered on first run and by "restore defaults".
pub const DEFAULT_FEEDS: &[(&str, &str, &str)] = &[
    ("ani-india", "ANI India", "https://www.aninews.in/rss/feed/category/national/"),
    ("ani-world", "ANI World", "https://www.aninews.in/rss/feed/category/world-news/"),
    ("ani-sports", "ANI Sports", "https://www.aninews.in/rss/feed/category/sports/"),
    ("ani-tech", "ANI Tech", "https://www.aninews.in/rss/feed/category/science-technology/"),
    ("reuters-india", "Reuters India", "https://news.google.com/rss/search?q=Reuters+India&hl=en-IN&gl=IN&ceid=IN:en"),
    ("reuters-sports", "Reuters Sports", "https://news.google.com/rss/search?q=Reuters+Sports&hl=en-US&gl=US&ceid=US:en"),
    ("reuters-tech", "Reuters Tech", "https://news.google.com/rss/search?q=Reuters+Technology&hl=en-US&gl=US&ceid=US:en"),
    ("the-conversation", "The Conversation", "https://theconversation.com/global/articles.atom"),
    ("dw-news", "DW News", "https://rss.dw.com/xml/rss-en-all"),
    ("ars-technica", "Ars Technica", "https://feeds.arstechnica.com/arstechnica/index"),
];

pub fn default_feeds() -> Vec<CustomFeed> {
    DEFAULT_FEEDS
        .iter()
        .map(|(id, name, url)| CustomFeed {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
        })
        .collect()
}

fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Search feed URL for a free-text query.
pub fn news_search_url(query: &str, region: Region) -> String {
    format!(
        "{}?q={}&{}",
        NEWS_SEARCH_BASE,
        encode_component(query),
        region.params()
    )
}

/// Apply the configured proxy template; identity when none is set.
pub fn proxy_url(template: Option<&str>, url: &str) -> String {
    match template {
        Some(t) if t.contains("{url}") => t.replace("{url}", &encode_component(url)),
        Some(t) => format!("{}{}", t, encode_component(url)),
        None => url.to_string(),
    }
}

/// Build the sections to refresh.
///
/// Topic sections come first, with the most recently added topic at the
/// top, followed by custom feeds in library order. Each section starts with
/// the articles previously stored under its id.
pub fn plan_sections(
    feeds: &[CustomFeed],
    topics: &[String],
    stored: &[Section],
    config: &SourcesConfig,
) -> Vec<Section> {
    let mut previous: HashMap<&str, &Section> =
        stored.iter().map(|s| (s.id.as_str(), s)).collect();

    let proxy = config.proxy.as_deref();

    let topic_sections = topics.iter().rev().filter(|t| !t.trim().is_empty()).map(|topic| {
        Section::new(
            format!("{}{}", TOPIC_SECTION_PREFIX, topic),
            topic.clone(),
            proxy_url(proxy, &news_search_url(topic, config.topic_region)),
        )
    });

    let feed_sections = feeds
        .iter()
        .map(|feed| Section::new(feed.id.clone(), feed.name.clone(), proxy_url(proxy, &feed.url)));

    topic_sections
        .chain(feed_sections)
        .map(|mut section| {
            if let Some(prev) = previous.remove(section.id.as_str()) {
                section.articles = prev.articles.clone();
                section.last_updated = prev.last_updated;
            }
            section
        })
        .collect()
}
