use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Prefix for ids derived from title and source when an item has no link.
pub const GENERATED_ID_PREFIX: &str = "gen-";

/// Content shorter than this is only readable when it carries no truncation marker.
const TEASER_LIMIT: usize = 1200;
/// Content longer than this is considered a full article.
const READABLE_LENGTH: usize = 600;
/// Paragraph openings that mark structured body text.
const READABLE_PARAGRAPHS: usize = 2;

const WORDS_PER_MINUTE: usize = 200;

const TRUNCATION_MARKERS: &[&str] = &[
    "\u{2026}",
    "...",
    "&hellip;",
    "[&#8230;]",
    "read more",
    "continue reading",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub link: String,
    pub content: String,
    pub pub_date: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl Article {
    /// Derive a stable identity for an item.
    ///
    /// The link is used verbatim when present. Otherwise the id is a
    /// truncated SHA256 over the title and source, so the same unlinked item
    /// maps to the same id across runs.
    pub fn derive_id(link: &str, title: &str, source: &str) -> String {
        if !link.is_empty() {
            return link.to_string();
        }

        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update(b"\n");
        hasher.update(source.as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("{}{}", GENERATED_ID_PREFIX, &digest[..16])
    }

    /// Publish date as a timestamp, if it parses.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.pub_date)
    }

    /// Heuristic split between full-length articles and short teasers.
    ///
    /// Truncated teasers under [`TEASER_LIMIT`] characters are never
    /// readable; anything else is readable when it is longer than
    /// [`READABLE_LENGTH`] characters or has at least two paragraphs.
    pub fn is_readable(&self) -> bool {
        is_readable(&self.content)
    }

    pub fn reading_time(&self) -> String {
        reading_time(&self.content)
    }
}

pub fn is_readable(content: &str) -> bool {
    let length = content.chars().count();
    let lowered = content.to_lowercase();

    let truncated = TRUNCATION_MARKERS.iter().any(|m| lowered.contains(m));
    if truncated && length < TEASER_LIMIT {
        return false;
    }

    length > READABLE_LENGTH || count_paragraphs(&lowered) >= READABLE_PARAGRAPHS
}

fn count_paragraphs(lowered: &str) -> usize {
    lowered
        .match_indices("<p")
        .filter(|(idx, _)| {
            matches!(
                lowered[idx + 2..].chars().next(),
                Some('>') | Some(' ') | Some('\t') | Some('\n') | Some('/')
            )
        })
        .count()
}

pub fn reading_time(text: &str) -> String {
    let words = text.split_whitespace().count();
    if words == 0 {
        return "0 min read".to_string();
    }
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    format!("{} min read", minutes)
}

/// Parse the date formats found in feeds: RFC 3339, RFC 2822, and bare
/// ISO date-times or dates (taken as UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
