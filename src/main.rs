use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use calmnews::app::AppContext;
use calmnews::cli::{commands, Cli, Commands, FeedsAction, SettingsAction, TopicsAction};
use calmnews::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(workers) = cli.workers {
        config.fetch.workers = workers;
    }
    if let Some(db) = cli.db {
        config.storage.path = Some(db);
    }

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Refresh => {
            commands::refresh(&ctx).await?;
        }
        Commands::Digest => {
            commands::show_digest(&ctx)?;
        }
        Commands::Feeds { action } => match action {
            FeedsAction::List => commands::list_feeds(&ctx)?,
            FeedsAction::Add { name, url } => commands::add_feed(&ctx, &name, &url)?,
            FeedsAction::Remove { id } => commands::remove_feed(&ctx, &id)?,
            FeedsAction::RestoreDefaults => commands::restore_defaults(&ctx)?,
        },
        Commands::Topics { action } => match action {
            TopicsAction::List => commands::list_topics(&ctx)?,
            TopicsAction::Add { topic } => commands::add_topic(&ctx, &topic)?,
            TopicsAction::Remove { topic } => commands::remove_topic(&ctx, &topic)?,
        },
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::show_settings(&ctx)?,
            SettingsAction::Set {
                retention_days,
                max_articles,
                theme,
                font_size,
            } => commands::set_settings(
                &ctx,
                retention_days,
                max_articles,
                theme.as_deref(),
                font_size.as_deref(),
            )?,
        },
        Commands::Discover { query, add } => {
            commands::discover(&ctx, &query, add).await?;
        }
        Commands::Read { id } => {
            commands::read_article(&ctx, &id)?;
        }
        Commands::Reset => {
            commands::reset(&ctx)?;
        }
    }

    Ok(())
}
