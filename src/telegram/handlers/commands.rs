//! Command handlers

use teloxide::prelude::*;
use teloxide::types::Message;

use super::forms::user_id_of;
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::menu;

/// Handles /start: greets, shows the main menu and unconditionally ends any
/// in-progress form (the built-in reset trigger).
pub async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = user_id_of(msg);
    deps.sessions.clear(user_id).await;

    bot.send_message(
        msg.chat.id,
        "Привет! 👋 Я помогаю делиться лекциями и конспектами.\nВыберите действие:",
    )
    .reply_markup(menu::main_menu_markup())
    .await?;

    Ok(())
}
