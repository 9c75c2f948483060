//! Refresh pipeline and digest projection.
//!
//! ```text
//! sections ─▶ ParallelFetcher ─▶ Normalizer ─▶ merge ─▶ retain ─▶ rank ─▶ cap
//!                                                                        │
//!                                     NewsStore (one batched write) ◀────┘
//! ```
//!
//! Fetches run concurrently; everything after the fetches resolve happens
//! sequentially in input order.

pub mod ranking;

use chrono::{DateTime, Utc};

use crate::app::CalmError;
use crate::domain::{AppSettings, Article, DailyDigest, Section};
use crate::fetcher::ParallelFetcher;
use crate::normalizer::Normalizer;
use crate::store::{retention_cutoff, NewsStore};

/// Result of one refresh pass.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    /// Updated sections, in input order.
    pub sections: Vec<Section>,
    /// Ids of sections that could not be fetched or parsed and were returned unchanged.
    pub failed: Vec<String>,
}

impl RefreshReport {
    /// Sections the reader cannot see fresh content for: failed or empty.
    pub fn degraded_count(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| s.articles.is_empty() || self.failed.contains(&s.id))
            .count()
    }
}

#[derive(Clone)]
pub struct DigestEngine {
    fetcher: ParallelFetcher,
    store: NewsStore,
    normalizer: Normalizer,
}

impl DigestEngine {
    pub fn new(fetcher: ParallelFetcher, store: NewsStore) -> Self {
        Self {
            fetcher,
            store,
            normalizer: Normalizer::new(),
        }
    }

    pub fn store(&self) -> &NewsStore {
        &self.store
    }

    /// Refresh every section and return the updated list.
    pub async fn refresh(&self, sections: Vec<Section>) -> Vec<Section> {
        self.refresh_with_report(sections).await.sections
    }

    /// Refresh every section, reporting which ones degraded.
    ///
    /// A section whose fetch or parse fails comes back unchanged. Articles
    /// and section snapshots are persisted once, after every section has
    /// been processed.
    pub async fn refresh_with_report(&self, sections: Vec<Section>) -> RefreshReport {
        let settings = self.store.load_settings();
        let urls = sections.iter().map(|s| s.rss_url.clone()).collect();

        let bodies = self.fetcher.fetch_all(urls).await;

        let now = Utc::now();
        let mut failed = Vec::new();
        let updated: Vec<Section> = sections
            .into_iter()
            .zip(bodies)
            .map(|(section, body)| {
                let parsed = body.and_then(|xml| {
                    self.normalizer
                        .try_parse(&xml, &section.name)
                        .map_err(CalmError::from)
                });

                match parsed {
                    Ok(fetched) => {
                        tracing::debug!(
                            section = %section.id,
                            fetched = fetched.len(),
                            "Section refreshed"
                        );
                        update_section(section, fetched, &settings, now)
                    }
                    Err(e) => {
                        tracing::warn!(section = %section.id, error = %e, "Failed to refresh section");
                        failed.push(section.id.clone());
                        section
                    }
                }
            })
            .collect();

        let all_articles: Vec<Article> = updated
            .iter()
            .flat_map(|s| s.articles.iter().cloned())
            .collect();
        self.store.save_articles(&all_articles);
        self.store.save_sections(&updated);

        tracing::info!(
            sections = updated.len(),
            failed = failed.len(),
            "Refresh complete"
        );

        RefreshReport {
            sections: updated,
            failed,
        }
    }

    /// Project sections into a dated digest using the current settings.
    pub fn build_digest(&self, sections: &[Section]) -> DailyDigest {
        let settings = self.store.load_settings();
        build_digest(sections, &settings, Utc::now())
    }
}

fn update_section(
    section: Section,
    fetched: Vec<Article>,
    settings: &AppSettings,
    now: DateTime<Utc>,
) -> Section {
    let cutoff = retention_cutoff(settings, now);

    let merged = ranking::merge(section.articles, fetched);
    let mut articles = ranking::retain_recent(merged, cutoff);
    ranking::rank(&mut articles, now);
    articles.truncate(settings.max_articles_per_section);

    Section {
        articles,
        last_updated: Some(now),
        ..section
    }
}

/// Pure digest projection: date stamp, re-ranked and capped sections.
pub fn build_digest(sections: &[Section], settings: &AppSettings, now: DateTime<Utc>) -> DailyDigest {
    let sections = sections
        .iter()
        .map(|section| {
            let mut articles = section.articles.clone();
            ranking::rank(&mut articles, now);
            articles.truncate(settings.max_articles_per_section);
            Section {
                articles,
                ..section.clone()
            }
        })
        .collect();

    DailyDigest {
        date: now.format("%Y-%m-%d").to_string(),
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Duration;

    use crate::fetcher::testing::ScriptedFetcher;

    struct Item<'a> {
        title: &'a str,
        link: &'a str,
        content: String,
        at: DateTime<Utc>,
    }

    fn rss(items: &[Item<'_>]) -> String {
        let body: String = items
            .iter()
            .map(|i| {
                format!(
                    "<item><title>{}</title><link>{}</link><description><![CDATA[{}]]></description><pubDate>{}</pubDate></item>",
                    i.title,
                    i.link,
                    i.content,
                    i.at.to_rfc2822()
                )
            })
            .collect();
        format!("<rss version=\"2.0\"><channel><title>T</title>{}</channel></rss>", body)
    }

    fn engine(fetcher: ScriptedFetcher) -> DigestEngine {
        DigestEngine::new(
            ParallelFetcher::with_workers(Arc::new(fetcher), 4),
            NewsStore::in_memory(),
        )
    }

    fn stored_article(id: &str, content: &str, at: DateTime<Utc>) -> Article {
        Article {
            id: id.into(),
            title: id.into(),
            link: id.into(),
            content: content.into(),
            pub_date: at.to_rfc3339(),
            source: "A".into(),
            author: None,
            thumbnail: None,
        }
    }

    fn feed_a(now: DateTime<Utc>) -> String {
        rss(&[
            Item {
                title: "Full",
                link: "https://a.test/full",
                content: "A".repeat(1000),
                at: now - Duration::days(1),
            },
            Item {
                title: "Snippet",
                link: "https://a.test/snippet",
                content: "S".repeat(50),
                at: now - Duration::hours(1),
            },
        ])
    }

    #[tokio::test]
    async fn test_refresh_ranks_full_articles_first() {
        let now = Utc::now();
        let engine = engine(ScriptedFetcher::new().with_body("https://a.test/rss", &feed_a(now)));

        let sections = engine
            .refresh(vec![Section::new("a", "Feed A", "https://a.test/rss")])
            .await;

        assert_eq!(sections.len(), 1);
        let ids: Vec<_> = sections[0].articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["https://a.test/full", "https://a.test/snippet"]);
        assert!(sections[0].last_updated.is_some());
        assert_eq!(sections[0].articles[0].source, "Feed A");

        let digest = engine.build_digest(&sections);
        assert_eq!(digest.sections[0].articles.len(), 2);
        assert_eq!(digest.sections[0].articles[0].id, "https://a.test/full");
    }

    #[tokio::test]
    async fn test_failing_section_returned_unchanged() {
        let now = Utc::now();
        let engine = engine(ScriptedFetcher::new().with_body("https://a.test/rss", &feed_a(now)));

        let mut broken = Section::new("b", "Feed B", "https://b.test/rss");
        broken.articles = vec![stored_article("kept", "x", now - Duration::days(30))];

        let report = engine
            .refresh_with_report(vec![
                Section::new("a", "Feed A", "https://a.test/rss"),
                broken.clone(),
            ])
            .await;

        assert_eq!(report.sections.len(), 2);
        assert_eq!(report.sections[0].articles.len(), 2);
        assert_eq!(report.sections[1], broken);
        assert_eq!(report.failed, vec!["b".to_string()]);
        assert_eq!(report.degraded_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_feed_treated_as_failure() {
        let now = Utc::now();
        let engine = engine(ScriptedFetcher::new().with_body("https://a.test/rss", "<rss><channel>"));

        let mut section = Section::new("a", "Feed A", "https://a.test/rss");
        section.articles = vec![stored_article("kept", "x", now - Duration::hours(2))];

        let report = engine.refresh_with_report(vec![section.clone()]).await;
        assert_eq!(report.sections[0], section);
        assert_eq!(report.failed, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_merge_keeps_previous_and_updates_existing() {
        let now = Utc::now();
        let xml = rss(&[Item {
            title: "Updated headline",
            link: "https://a.test/1",
            content: "new body".into(),
            at: now - Duration::hours(3),
        }]);
        let engine = engine(ScriptedFetcher::new().with_body("https://a.test/rss", &xml));

        let mut section = Section::new("a", "Feed A", "https://a.test/rss");
        section.articles = vec![
            stored_article("https://a.test/1", "old body", now - Duration::hours(3)),
            stored_article("https://a.test/0", "paged away", now - Duration::hours(6)),
        ];

        let sections = engine.refresh(vec![section]).await;
        let articles = &sections[0].articles;
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].id, "https://a.test/1");
        assert_eq!(articles[0].title, "Updated headline");
        assert_eq!(articles[0].content, "new body");
        assert_eq!(articles[1].id, "https://a.test/0");
    }

    #[tokio::test]
    async fn test_retention_and_cap() {
        let now = Utc::now();
        let xml = rss(&[
            Item { title: "1", link: "https://a.test/1", content: "x".into(), at: now - Duration::hours(1) },
            Item { title: "2", link: "https://a.test/2", content: "x".into(), at: now - Duration::hours(2) },
            Item { title: "3", link: "https://a.test/3", content: "x".into(), at: now - Duration::hours(3) },
            Item { title: "old", link: "https://a.test/old", content: "x".into(), at: now - Duration::days(10) },
        ]);
        let engine = engine(ScriptedFetcher::new().with_body("https://a.test/rss", &xml));
        engine.store().save_settings(&AppSettings {
            retention_days: 7,
            max_articles_per_section: 2,
        });

        let sections = engine
            .refresh(vec![Section::new("a", "Feed A", "https://a.test/rss")])
            .await;

        let ids: Vec<_> = sections[0].articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["https://a.test/1", "https://a.test/2"]);
    }

    #[tokio::test]
    async fn test_refresh_persists_sections_and_articles() {
        let now = Utc::now();
        let engine = engine(ScriptedFetcher::new().with_body("https://a.test/rss", &feed_a(now)));

        let sections = engine
            .refresh(vec![
                Section::new("a", "Feed A", "https://a.test/rss"),
                Section::new("b", "Feed B", "https://b.test/rss"),
            ])
            .await;

        assert_eq!(engine.store().load_sections(), sections);
        let stored: Vec<_> = engine
            .store()
            .load_articles()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(stored, vec!["https://a.test/snippet", "https://a.test/full"]);
    }

    #[test]
    fn test_digest_caps_with_current_settings() {
        let now = Utc::now();
        let mut section = Section::new("1", "Section 1", "");
        section.articles = (0..10)
            .map(|i| {
                let mut a = stored_article(&format!("a{}", i), "", now);
                a.pub_date = String::new();
                a
            })
            .collect();

        let digest = build_digest(
            std::slice::from_ref(&section),
            &AppSettings::default(),
            now,
        );
        assert_eq!(digest.sections[0].articles.len(), 10);
        assert_eq!(digest.date, now.format("%Y-%m-%d").to_string());

        let smaller = AppSettings {
            max_articles_per_section: 3,
            ..Default::default()
        };
        let digest = build_digest(&[section], &smaller, now);
        assert_eq!(digest.sections[0].articles.len(), 3);
        assert_eq!(digest.article_count(), 3);
    }

    #[test]
    fn test_digest_prioritizes_readable() {
        let mut section = Section::new("1", "Section 1", "");
        section.articles = vec![
            Article {
                pub_date: "2023-01-02".into(),
                ..stored_article("1", "Short", Utc::now())
            },
            Article {
                pub_date: "2023-01-01".into(),
                ..stored_article("2", &"A".repeat(1000), Utc::now())
            },
        ];

        let engine = engine(ScriptedFetcher::new());
        let digest = engine.build_digest(&[section]);

        assert_eq!(digest.sections[0].articles[0].id, "2");
        assert_eq!(digest.sections[0].articles[1].id, "1");
    }
}
