//! Bot initialization
//!
//! This module contains:
//! - Command enum definition (`/start` is the only command)
//! - Bot instance creation from the configured token

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
///
/// Everything else in the bot is driven by reply-keyboard buttons; `/start`
/// doubles as the universal reset for an in-progress form.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Я умею:")]
pub enum Command {
    #[command(description = "показать главное меню и сбросить текущее действие")]
    Start,
}

/// Creates a Bot instance from the configured token.
///
/// # Errors
/// Fails when no token is configured (BOT_TOKEN / TELOXIDE_TOKEN) or the
/// HTTP client cannot be built.
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.clone();
    if token.is_empty() {
        anyhow::bail!("BOT_TOKEN (or TELOXIDE_TOKEN) environment variable is not set");
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(token, client))
}

/// Sets up bot commands in the Telegram UI
///
/// # Errors
/// * `Err(RequestError)` - Failed to set commands
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![BotCommand::new(
        "start",
        "показать главное меню и сбросить текущее действие",
    )])
    .await?;

    Ok(())
}
