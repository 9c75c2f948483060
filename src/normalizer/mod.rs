//! Feed parsing and normalization.
//!
//! Turns an RSS 2.0 or Atom document into [`Article`]s. Every logical field
//! is resolved by probing an ordered list of tag names, so feeds that mix,
//! rename or omit namespace prefixes still yield the same article shape.

pub mod tree;

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::{SecondsFormat, Utc};
use html_escape::decode_html_entities;
use url::Url;

use crate::domain::{parse_timestamp, Article};
use crate::sanitizer::sanitize;
use tree::{TreeError, XmlTree};

pub const NO_TITLE: &str = "No Title";

const ITEM_NAMES: &[&str] = &["item", "entry"];

const TITLE_TAGS: &[&str] = &["title", "atom:title"];
const LINK_TAGS: &[&str] = &["link"];
const DESCRIPTION_TAGS: &[&str] = &["description", "summary", "atom:summary"];
const CONTENT_TAGS: &[&str] = &["content:encoded", "content", "body", "atom:content"];
const DATE_TAGS: &[&str] = &["pubDate", "published", "updated", "dc:date"];
const AUTHOR_TAGS: &[&str] = &["dc:creator", "author", "creator"];

/// Media RSS elements describe attachments, never the item's own fields.
const MEDIA_PREFIX: &str = "media:";

/// Thumbnail sources in priority order.
const THUMBNAIL_TAGS: &[&[&str]] = &[
    &["media:content", "content"],
    &["media:thumbnail", "thumbnail"],
];

#[derive(Debug, Clone, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse one feed document into articles, in source order.
    ///
    /// Never fails: empty input, malformed XML and documents without items
    /// all produce an empty list. An item whose extraction panics is skipped
    /// without affecting the rest of the feed.
    pub fn parse(&self, xml: &str, source: &str) -> Vec<Article> {
        match self.try_parse(xml, source) {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!(source, error = %e, "Discarding malformed feed");
                Vec::new()
            }
        }
    }

    /// Like [`parse`](Self::parse), but reports malformed XML so callers
    /// can tell a broken document from an empty one.
    pub fn try_parse(&self, xml: &str, source: &str) -> Result<Vec<Article>, TreeError> {
        let xml = xml.trim();
        if xml.is_empty() {
            return Ok(Vec::new());
        }

        let tree = XmlTree::parse(xml)?;
        Ok(collect_items(&tree, source, extract_article))
    }
}

/// Run `extract` over every item; an item whose extraction panics is skipped.
fn collect_items<F>(tree: &XmlTree, source: &str, extract: F) -> Vec<Article>
where
    F: Fn(&XmlTree, usize, &str) -> Article,
{
    tree.find_all_local(ITEM_NAMES)
        .into_iter()
        .filter_map(|item| {
            match catch_unwind(AssertUnwindSafe(|| extract(tree, item, source))) {
                Ok(article) => Some(article),
                Err(_) => {
                    tracing::warn!(source, item, "Skipping item that failed to parse");
                    None
                }
            }
        })
        .collect()
}

/// Shorthand for [`Normalizer::parse`].
pub fn parse(xml: &str, source: &str) -> Vec<Article> {
    Normalizer::new().parse(xml, source)
}

fn extract_article(tree: &XmlTree, item: usize, source: &str) -> Article {
    let title = first_text(tree, item, TITLE_TAGS)
        .map(|(_, t)| decode_html_entities(&t).trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let link = first_text(tree, item, LINK_TAGS)
        .map(|(_, t)| t)
        .or_else(|| link_href(tree, item))
        .unwrap_or_default();

    let body = first_text(tree, item, CONTENT_TAGS)
        .or_else(|| first_text(tree, item, DESCRIPTION_TAGS))
        .map(|(_, t)| t);
    let content = body.map(|raw| sanitize(&raw)).unwrap_or_default();

    let pub_date = first_text(tree, item, DATE_TAGS)
        .and_then(|(_, t)| parse_timestamp(&t))
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    let author = first_text(tree, item, AUTHOR_TAGS).map(|(idx, text)| {
        // Atom nests the display name inside <author>.
        first_text(tree, idx, &["name"])
            .map(|(_, name)| name)
            .unwrap_or(text)
    });

    let thumbnail = thumbnail(tree, item);
    let id = Article::derive_id(&link, &title, source);

    Article {
        id,
        title,
        link,
        content,
        pub_date,
        source: source.to_string(),
        author,
        thumbnail,
    }
}

/// First descendant of `item` matching a candidate whose text is non-empty.
/// Returns the element index and trimmed text.
///
/// Every candidate is tried by exact qualified name before any is tried by
/// local name, so `title` never resolves to an earlier `media:title` while
/// `link` still finds `atom:link`.
fn first_text(tree: &XmlTree, item: usize, candidates: &[&str]) -> Option<(usize, String)> {
    let non_empty = |idx: usize| {
        let text = tree.text_content(idx);
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| (idx, trimmed.to_string()))
    };

    candidates
        .iter()
        .find_map(|name| tree.descendants_named(item, name).find_map(non_empty))
        .or_else(|| {
            candidates.iter().find_map(|name| {
                tree.descendants_local(item, name)
                    .filter(|&idx| !tree.element(idx).name.starts_with(MEDIA_PREFIX))
                    .find_map(non_empty)
            })
        })
}

/// Atom-style `<link href="..."/>`, preferring the alternate link.
fn link_href(tree: &XmlTree, item: usize) -> Option<String> {
    let links: Vec<_> = tree
        .descendants_matching(item, "link")
        .map(|idx| tree.element(idx))
        .filter(|el| el.attr("href").is_some_and(|h| !h.trim().is_empty()))
        .collect();

    links
        .iter()
        .find(|el| matches!(el.attr("rel"), None | Some("alternate")))
        .or_else(|| links.first())
        .and_then(|el| el.attr("href"))
        .map(|h| h.trim().to_string())
}

fn thumbnail(tree: &XmlTree, item: usize) -> Option<String> {
    for group in THUMBNAIL_TAGS {
        for name in group.iter() {
            let found = tree.descendants_matching(item, name).find_map(|idx| {
                let el = tree.element(idx);
                let is_image = el.attr("medium").is_none_or(|m| m == "image")
                    && el.attr("type").is_none_or(|t| t.starts_with("image"));
                if !is_image {
                    return None;
                }
                el.attr("url").and_then(absolute_url)
            });
            if found.is_some() {
                return found;
            }
        }
    }

    tree.descendants_matching(item, "enclosure").find_map(|idx| {
        let el = tree.element(idx);
        if el.attr("type").is_some_and(|t| t.starts_with("image")) {
            el.attr("url").and_then(absolute_url)
        } else {
            None
        }
    })
}

fn absolute_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    Url::parse(raw).ok().map(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::article::GENERATED_ID_PREFIX;

    const RSS_SAMPLE: &str = r#"
<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Mock Feed</title>
    <item>
      <title>Article 1</title>
      <link>https://example.com/1</link>
      <description>Description 1</description>
      <pubDate>Thu, 25 Dec 2025 12:00:00 GMT</pubDate>
      <dc:creator>Author 1</dc:creator>
    </item>
    <item>
      <title>Article 2</title>
      <link>https://example.com/2</link>
      <content:encoded>Full content 2</content:encoded>
      <pubDate>Thu, 25 Dec 2025 13:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>
"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test Feed</title>
  <entry>
    <title type="html">Fish &amp;amp; Chips</title>
    <link rel="self" href="https://example.com/atom1.xml"/>
    <link rel="alternate" href="https://example.com/atom1"/>
    <id>atom-entry-1</id>
    <published>2024-01-01T00:00:00Z</published>
    <summary>Short summary</summary>
    <content type="html">&lt;p onclick="x()"&gt;Full body&lt;/p&gt;</content>
    <author><name>Jane Doe</name><email>jane@example.com</email></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let articles = parse(RSS_SAMPLE, "Mock Source");

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Article 1");
        assert_eq!(articles[0].link, "https://example.com/1");
        assert_eq!(articles[0].id, "https://example.com/1");
        assert_eq!(articles[0].source, "Mock Source");
        assert_eq!(articles[0].author.as_deref(), Some("Author 1"));
        assert_eq!(articles[0].content, "Description 1");
        assert_eq!(articles[0].pub_date, "2025-12-25T12:00:00.000Z");

        assert_eq!(articles[1].title, "Article 2");
        assert_eq!(articles[1].content, "Full content 2");
        assert_eq!(articles[1].author, None);
    }

    #[test]
    fn test_parse_atom() {
        let articles = parse(ATOM_SAMPLE, "Atom");

        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.title, "Fish & Chips");
        assert_eq!(a.link, "https://example.com/atom1");
        assert_eq!(a.content, "<p>Full body</p>");
        assert_eq!(a.author.as_deref(), Some("Jane Doe"));
        assert_eq!(a.pub_date, "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_missing_fields() {
        let articles = parse("<rss><channel><item></item></channel></rss>", "Empty");

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, NO_TITLE);
        assert_eq!(articles[0].source, "Empty");
        assert_eq!(articles[0].link, "");
        assert_eq!(articles[0].content, "");
        assert_eq!(articles[0].thumbnail, None);
        assert!(articles[0].published_at().is_some());
        assert!(articles[0].id.starts_with(GENERATED_ID_PREFIX));
    }

    #[test]
    fn test_invalid_date_becomes_now() {
        let xml = "<rss><channel><item><title>T</title><pubDate>not a date</pubDate></item></channel></rss>";
        let before = Utc::now() - chrono::Duration::seconds(1);
        let articles = parse(xml, "S");
        let after = Utc::now() + chrono::Duration::seconds(1);

        let published = articles[0].published_at().unwrap();
        assert!(published >= before && published <= after);
    }

    #[test]
    fn test_date_candidates_in_order() {
        let xml = r#"<feed><entry><title>T</title><updated>2024-02-02T00:00:00Z</updated><published>2024-01-01T00:00:00Z</published></entry></feed>"#;
        let articles = parse(xml, "S");
        assert_eq!(articles[0].pub_date, "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_malformed_xml_yields_empty() {
        assert!(parse("<rss><channel><item><title>x</item></rss>", "S").is_empty());
        assert!(parse("this is not xml <<<", "S").is_empty());
    }

    #[test]
    fn test_try_parse_reports_malformed() {
        let normalizer = Normalizer::new();
        assert!(normalizer.try_parse("<rss><item></rss>", "S").is_err());
        assert!(normalizer.try_parse("", "S").unwrap().is_empty());
        assert!(normalizer
            .try_parse("<rss><channel></channel></rss>", "S")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty() {
        assert!(parse("", "S").is_empty());
        assert!(parse("   \n", "S").is_empty());
    }

    #[test]
    fn test_ids_stable_across_parses() {
        let xml = r#"<rss><channel>
            <item><title>No link here</title></item>
            <item><title>Linked</title><link>https://example.com/x</link></item>
        </channel></rss>"#;
        let first = parse(xml, "S");
        let second = parse(xml, "S");

        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first[1].id, second[1].id);
        assert!(first[0].id.starts_with(GENERATED_ID_PREFIX));
        assert_eq!(first[1].id, "https://example.com/x");
    }

    #[test]
    fn test_content_is_sanitized() {
        let xml = r#"<rss><channel><item><title>T</title>
            <content:encoded><![CDATA[<p style="color:red">Body</p><script>evil()</script><iframe src="x"></iframe>]]></content:encoded>
        </item></channel></rss>"#;
        let articles = parse(xml, "S");
        let content = &articles[0].content;
        assert_eq!(content, "<p>Body</p>");
        assert!(!content.contains("<script"));
        assert!(!content.contains("style="));
    }

    #[test]
    fn test_full_content_preferred_over_description() {
        let xml = r#"<rss><channel><item><title>T</title>
            <description>Teaser</description>
            <body>Whole story</body>
        </item></channel></rss>"#;
        assert_eq!(parse(xml, "S")[0].content, "Whole story");
    }

    #[test]
    fn test_thumbnail_priority() {
        let xml = r#"<rss><channel><item><title>T</title>
            <enclosure url="https://example.com/enc.jpg" type="image/jpeg"/>
            <media:thumbnail url="https://example.com/thumb.jpg"/>
            <media:content url="https://example.com/full.jpg" medium="image"/>
        </item></channel></rss>"#;
        assert_eq!(
            parse(xml, "S")[0].thumbnail.as_deref(),
            Some("https://example.com/full.jpg")
        );
    }

    #[test]
    fn test_thumbnail_from_image_enclosure_only() {
        let xml = r#"<rss><channel>
            <item><title>A</title><enclosure url="https://example.com/a.mp3" type="audio/mpeg"/></item>
            <item><title>B</title><enclosure url="https://example.com/b.png" type="image/png"/></item>
        </channel></rss>"#;
        let articles = parse(xml, "S");
        assert_eq!(articles[0].thumbnail, None);
        assert_eq!(articles[1].thumbnail.as_deref(), Some("https://example.com/b.png"));
    }

    #[test]
    fn test_thumbnail_skips_video_media() {
        let xml = r#"<rss><channel><item><title>T</title>
            <media:content url="https://example.com/clip.mp4" medium="video"/>
            <media:thumbnail url="https://example.com/still.jpg"/>
        </item></channel></rss>"#;
        assert_eq!(
            parse(xml, "S")[0].thumbnail.as_deref(),
            Some("https://example.com/still.jpg")
        );
    }

    #[test]
    fn test_items_in_source_order() {
        let xml = r#"<rss><channel>
            <item><title>First</title></item>
            <item><title>Second</title></item>
            <item><title>Third</title></item>
        </channel></rss>"#;
        let titles: Vec<_> = parse(xml, "S").into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_prefixed_atom_entries() {
        let xml = r#"<atom:feed xmlns:atom="http://www.w3.org/2005/Atom">
            <atom:entry>
                <atom:title>Prefixed</atom:title>
                <atom:link rel="alternate" href="https://example.com/p1"/>
                <atom:published>2024-01-01T00:00:00Z</atom:published>
                <atom:author><atom:name>Ann</atom:name></atom:author>
                <atom:summary>Summary text</atom:summary>
            </atom:entry>
        </atom:feed>"#;
        let articles = parse(xml, "S");
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Prefixed");
        assert_eq!(articles[0].link, "https://example.com/p1");
        assert_eq!(articles[0].id, "https://example.com/p1");
        assert_eq!(articles[0].pub_date, "2024-01-01T00:00:00.000Z");
        assert_eq!(articles[0].author.as_deref(), Some("Ann"));
        assert_eq!(articles[0].content, "Summary text");
    }

    #[test]
    fn test_panicking_item_is_skipped() {
        let tree = XmlTree::parse(RSS_SAMPLE.trim()).unwrap();

        let articles = collect_items(&tree, "S", |tree, item, source| {
            let article = extract_article(tree, item, source);
            if article.title == "Article 1" {
                panic!("extraction failed");
            }
            article
        });

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Article 2");
    }

    #[test]
    fn test_media_elements_do_not_stand_in_for_fields() {
        let xml = r#"<rss xmlns:media="http://search.yahoo.com/mrss/"><channel><item>
            <media:title>Media title</media:title>
            <title>Real title</title>
            <link>https://example.com/m</link>
            <media:content url="https://example.com/m.jpg" medium="image">
                <media:description>Caption</media:description>
            </media:content>
            <description>Real description</description>
        </item></channel></rss>"#;
        let articles = parse(xml, "S");
        assert_eq!(articles[0].title, "Real title");
        assert_eq!(articles[0].content, "Real description");
        assert_eq!(articles[0].thumbnail.as_deref(), Some("https://example.com/m.jpg"));
    }
}
