use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Article;

/// One logical feed or topic query with its ranked articles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub name: String,
    pub rss_url: String,
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Section {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rss_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rss_url: rss_url.into(),
            articles: Vec::new(),
            last_updated: None,
        }
    }
}

/// Dated, capped projection of all sections. Recomputed, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDigest {
    pub date: String,
    pub sections: Vec<Section>,
}

impl DailyDigest {
    pub fn article_count(&self) -> usize {
        self.sections.iter().map(|s| s.articles.len()).sum()
    }

    /// Sections with nothing to show.
    pub fn empty_sections(&self) -> usize {
        self.sections.iter().filter(|s| s.articles.is_empty()).count()
    }
}
