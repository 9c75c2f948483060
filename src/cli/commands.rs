use scraper::Html;

use crate::app::{AppContext, CalmError, Result};
use crate::domain::{Article, DailyDigest, FontSize, SettingsUpdate, Theme};

pub async fn refresh(ctx: &AppContext) -> Result<()> {
    let sections = ctx.sections_to_refresh();

    if sections.is_empty() {
        println!("Nothing to refresh");
        return Ok(());
    }

    println!("Refreshing {} sections...", sections.len());

    let report = ctx.engine.refresh_with_report(sections).await;

    for id in &report.failed {
        if let Some(section) = report.sections.iter().find(|s| &s.id == id) {
            eprintln!("  Could not update {}", section.name);
        }
    }

    let articles: usize = report.sections.iter().map(|s| s.articles.len()).sum();
    println!(
        "Refresh complete: {} articles, {} sections degraded",
        articles,
        report.degraded_count()
    );
    Ok(())
}

pub fn show_digest(ctx: &AppContext) -> Result<()> {
    let sections = ctx.store.load_sections();
    if sections.is_empty() {
        println!("No digest yet. Run `calmnews refresh` first.");
        return Ok(());
    }

    let digest = ctx.engine.build_digest(&sections);
    print_digest(ctx, &digest);
    Ok(())
}

fn print_digest(ctx: &AppContext, digest: &DailyDigest) {
    let read = ctx.store.load_read_articles();

    println!(
        "Daily digest for {}: {} articles, {} quiet sections\n",
        digest.date,
        digest.article_count(),
        digest.empty_sections()
    );
    for section in &digest.sections {
        println!("{}", section.name);
        if section.articles.is_empty() {
            println!("  (nothing new)");
        }
        for article in &section.articles {
            let marker = if read.contains(&article.id) { " " } else { "●" };
            let kind = if article.is_readable() { "full" } else { "link" };
            println!(
                "  {} {} [{}, {}]\n    {}",
                marker,
                article.title,
                kind,
                article.reading_time(),
                article.id
            );
        }
        println!();
    }
}

pub fn list_feeds(ctx: &AppContext) -> Result<()> {
    let feeds = ctx.library.feeds();

    if feeds.is_empty() {
        println!("No feeds");
        return Ok(());
    }

    for feed in feeds {
        println!("{} [{}]\n  {}", feed.name, feed.id, feed.url);
    }
    Ok(())
}

pub fn add_feed(ctx: &AppContext, name: &str, url: &str) -> Result<()> {
    url::Url::parse(url.trim())?;

    match ctx.library.add_feed(name, url) {
        Some(feed) => println!("Added feed: {} [{}]", feed.name, feed.id),
        None => println!("Feed already exists: {}", url),
    }
    Ok(())
}

pub fn remove_feed(ctx: &AppContext, id: &str) -> Result<()> {
    if !ctx.library.remove_feed(id) {
        return Err(CalmError::Other(format!("No feed with id {}", id)));
    }
    println!("Removed feed: {}", id);
    Ok(())
}

pub fn restore_defaults(ctx: &AppContext) -> Result<()> {
    let added = ctx.library.restore_defaults();
    println!("Restored {} default feeds", added);
    Ok(())
}

pub fn list_topics(ctx: &AppContext) -> Result<()> {
    let topics = ctx.library.topics();

    if topics.is_empty() {
        println!("No topics");
        return Ok(());
    }

    for topic in topics {
        println!("{}", topic);
    }
    Ok(())
}

pub fn add_topic(ctx: &AppContext, topic: &str) -> Result<()> {
    if ctx.library.add_topic(topic) {
        println!("Following {}", topic.trim());
    } else {
        println!("Already following {}", topic.trim());
    }
    Ok(())
}

pub fn remove_topic(ctx: &AppContext, topic: &str) -> Result<()> {
    if !ctx.library.remove_topic(topic) {
        return Err(CalmError::Other(format!("Not following {}", topic)));
    }
    println!("Stopped following {}", topic);
    Ok(())
}

pub fn show_settings(ctx: &AppContext) -> Result<()> {
    let settings = ctx.library.settings();
    println!("retention_days = {}", settings.retention_days);
    println!("max_articles   = {}", settings.max_articles_per_section);
    println!("theme          = {}", ctx.library.theme().as_str());
    println!("font_size      = {}", ctx.library.font_size().as_str());
    Ok(())
}

pub fn set_settings(
    ctx: &AppContext,
    retention_days: Option<u32>,
    max_articles: Option<usize>,
    theme: Option<&str>,
    font_size: Option<&str>,
) -> Result<()> {
    if retention_days == Some(0) || max_articles == Some(0) {
        return Err(CalmError::Other("Settings must be at least 1".into()));
    }

    let theme = theme
        .map(|t| Theme::parse(t).ok_or_else(|| CalmError::Other(format!("Unknown theme: {}", t))))
        .transpose()?;
    let font_size = font_size
        .map(|s| FontSize::parse(s).ok_or_else(|| CalmError::Other(format!("Unknown font size: {}", s))))
        .transpose()?;

    ctx.library.update_settings(SettingsUpdate {
        retention_days,
        max_articles_per_section: max_articles,
    });
    if let Some(theme) = theme {
        ctx.library.set_theme(theme);
    }
    if let Some(size) = font_size {
        ctx.library.set_font_size(size);
    }

    show_settings(ctx)
}

pub async fn discover(ctx: &AppContext, query: &str, add: bool) -> Result<()> {
    let Some(result) = ctx.discovery.discover(query).await? else {
        println!("Query too short");
        return Ok(());
    };

    println!("{}\n  {}", result.name, result.url);
    if result.preview.is_empty() {
        println!("  (no stories right now)");
    }
    for article in &result.preview {
        println!("  - {}", article.title);
    }

    if add {
        let feed = result.into_custom_feed();
        match ctx.library.add_feed(&feed.name, &feed.url) {
            Some(feed) => println!("Added feed: {} [{}]", feed.name, feed.id),
            None => println!("Feed already exists"),
        }
    }
    Ok(())
}

pub fn read_article(ctx: &AppContext, id: &str) -> Result<()> {
    let article = find_article(ctx, id)
        .ok_or_else(|| CalmError::Other(format!("No article with id {}", id)))?;

    let now_read = ctx.library.toggle_read(id);

    println!("{}", article.title);
    println!(
        "{} · {} · {}",
        article.source,
        article.pub_date,
        article.reading_time()
    );
    if let Some(author) = &article.author {
        println!("by {}", author);
    }
    println!();
    println!("{}", plain_text(&article.content));
    println!();
    println!("{}", article.link);
    println!(
        "\nMarked as {}",
        if now_read { "read" } else { "unread" }
    );
    Ok(())
}

pub fn reset(ctx: &AppContext) -> Result<()> {
    ctx.store.clear();
    println!("Library reset");
    Ok(())
}

fn find_article(ctx: &AppContext, id: &str) -> Option<Article> {
    ctx.store
        .load_sections()
        .into_iter()
        .flat_map(|s| s.articles)
        .chain(ctx.store.load_articles())
        .find(|a| a.id == id)
}

fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: Vec<&str> = fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    text.join("\n")
}
