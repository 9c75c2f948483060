pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "calmnews")]
#[command(about = "A calm, bounded daily news digest", long_about = None)]
pub struct Cli {
    /// Number of parallel workers for fetching feeds (overrides config)
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Path to the SQLite database (overrides config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every section and update the stored digest
    Refresh,
    /// Show today's digest from stored sections
    Digest,
    /// Manage custom feeds
    Feeds {
        #[command(subcommand)]
        action: FeedsAction,
    },
    /// Manage followed topics
    Topics {
        #[command(subcommand)]
        action: TopicsAction,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Preview a search feed for a query
    Discover {
        query: String,

        /// Add the result to the library
        #[arg(long)]
        add: bool,
    },
    /// Toggle the read state of an article and print it
    Read {
        /// Article id
        id: String,
    },
    /// Remove all stored articles, sections, feeds, topics and preferences
    Reset,
}

#[derive(Subcommand)]
pub enum FeedsAction {
    /// List custom feeds
    List,
    /// Add a feed
    Add {
        /// Display name
        name: String,
        /// Feed URL
        url: String,
    },
    /// Remove a feed by id
    Remove { id: String },
    /// Append curated defaults missing from the library
    RestoreDefaults,
}

#[derive(Subcommand)]
pub enum TopicsAction {
    /// List topics
    List,
    /// Follow a topic
    Add { topic: String },
    /// Stop following a topic
    Remove { topic: String },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print current settings
    Show,
    /// Update one or more settings
    Set {
        /// Days an article stays in the digest
        #[arg(long)]
        retention_days: Option<u32>,

        /// Articles shown per section
        #[arg(long)]
        max_articles: Option<usize>,

        /// light, sepia or dark
        #[arg(long)]
        theme: Option<String>,

        /// s, m or l
        #[arg(long)]
        font_size: Option<String>,
    },
}
