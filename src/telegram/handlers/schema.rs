//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::handle_start_command;
use super::forms;
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Returns a handler tree for teloxide's Dispatcher. Branch order matters:
/// commands win over everything, documents are routed before plain text so
/// the upload form sees them.
///
/// # Arguments
/// * `deps` - Handler dependencies (database pool, session store, blob store)
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_documents = deps.clone();
    let deps_text = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(document_handler(deps_documents))
        .branch(text_handler(deps_text))
}

/// Handler for bot commands (/start)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
                match cmd {
                    Command::Start => handle_start_command(&bot, &msg, &deps).await,
                }
            }
        },
    ))
}

/// Handler for messages carrying a document (the upload form's step input)
fn document_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.document().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { forms::handle_document(&bot, &msg, &deps).await }
        })
}

/// Handler for plain text: menu buttons and form step inputs
fn text_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { forms::handle_text(&bot, &msg, &deps).await }
        })
}
