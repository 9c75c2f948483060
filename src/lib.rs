//! # Calm News
//!
//! A calm, bounded daily news digest built from RSS and Atom feeds.
//!
//! ## Architecture
//!
//! ```text
//! Library ─▶ Sources ─▶ Fetcher ─▶ Normalizer ─▶ Digest Engine ─▶ Store
//!                                      │
//!                                  Sanitizer
//! ```
//!
//! Each section (a custom feed or a followed topic) is fetched
//! concurrently, parsed into articles, merged with what was seen before,
//! filtered to the retention window, ranked readable-first and capped.
//!
//! ## Quick Start
//!
//! ```bash
//! # Fetch everything (seeds curated feeds on first run)
//! calmnews refresh
//!
//! # Show today's digest
//! calmnews digest
//!
//! # Follow a topic
//! calmnews topics add "SpaceX"
//!
//! # Preview and add a search feed
//! calmnews discover "climate policy" --add
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// fetchers, digest engine, discovery and library.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/calmnews/config.toml`.
pub mod config;

/// Refresh pipeline and digest projection.
pub mod digest;

/// Search-feed discovery for free-text queries.
pub mod discovery;

/// Core domain models.
///
/// - [`Article`](domain::Article): normalized feed entry
/// - [`Section`](domain::Section): one feed or topic with its articles
/// - [`DailyDigest`](domain::DailyDigest): dated projection of all sections
/// - [`CustomFeed`](domain::CustomFeed), [`AppSettings`](domain::AppSettings)
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for fetching feed bodies
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::ParallelFetcher): concurrent fetching with a semaphore
pub mod fetcher;

/// Custom feeds, topics, settings and reader preferences.
pub mod library;

/// RSS 2.0 / Atom parsing into [`Article`](domain::Article)s.
pub mod normalizer;

/// Allow-list HTML sanitizer for article bodies.
pub mod sanitizer;

/// Default feeds, search URLs, proxying and section planning.
pub mod sources;

/// Key-value persistence.
///
/// - [`NewsStore`](store::NewsStore): typed, namespaced access
/// - [`SqliteStore`](store::SqliteStore), [`MemoryStore`](store::MemoryStore): backends
pub mod store;
