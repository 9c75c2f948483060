//! Merge, retention and ordering rules shared by refresh and digest building.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::Article;

/// Merge freshly fetched articles over previously held ones.
///
/// Previous articles keep their position; a fetched article with the same
/// id replaces the old value in place, new ids are appended.
pub fn merge(previous: Vec<Article>, fetched: Vec<Article>) -> Vec<Article> {
    let mut merged = previous;
    let mut index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id.clone(), i))
        .collect();

    for article in fetched {
        match index.get(&article.id) {
            Some(&i) => merged[i] = article,
            None => {
                index.insert(article.id.clone(), merged.len());
                merged.push(article);
            }
        }
    }

    merged
}

/// Keep articles published strictly after `cutoff`. Unparseable dates are dropped.
pub fn retain_recent(articles: Vec<Article>, cutoff: DateTime<Utc>) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|a| a.published_at().is_some_and(|at| at > cutoff))
        .collect()
}

/// Readable articles first, then newest first. Stable for equal keys.
///
/// Dates that fail to parse rank as `now`.
pub fn rank(articles: &mut [Article], now: DateTime<Utc>) {
    articles.sort_by_cached_key(|a| {
        (
            Reverse(a.is_readable()),
            Reverse(a.published_at().unwrap_or(now)),
        )
    });
}
