use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use lectary::cli::{Cli, Commands};
use lectary::core::{config, init_logger};
use lectary::storage::blob::BlobStore;
use lectary::storage::create_pool;
use lectary::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, SessionStore};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, storage, database,
/// bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger()?;

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
    }
}

/// Run the Telegram bot
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    // Blob directory first: uploads land here before anything touches the DB
    let blobs = Arc::new(BlobStore::new(config::STORAGE_DIR.as_str()));
    blobs.ensure_root().await?;
    log::info!("Blob storage directory: {}", blobs.root().display());

    // Pool creation bootstraps the schema on the first connection
    let db_pool = Arc::new(create_pool(&config::DATABASE_PATH)?);
    log::info!("Database ready at {}", config::DATABASE_PATH.as_str());

    let bot = create_bot()?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let deps = HandlerDeps::new(db_pool, Arc::new(SessionStore::new()), blobs);
    let handler = schema(deps);

    log::info!("Ready to receive updates");

    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
