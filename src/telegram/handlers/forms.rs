//! Form step handlers
//!
//! Each menu button starts a short linear form; every later message from the
//! same user advances it until a terminal step runs against the store and
//! control returns to the main menu. The session store decides which step a
//! message belongs to, so handlers stay free of ambient state.
//!
//! Shared step-input policy: a menu button label received as step input
//! re-prompts on the same step, blank text re-prompts with a form-specific
//! message, and /start ends any form unconditionally.

use std::path::{Path, PathBuf};

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{Document, InputFile, Message};
use tokio::io::AsyncWriteExt;

use super::types::{HandlerDeps, HandlerError};
use crate::core::{validation, AppError};
use crate::storage::db::{self, get_connection, DbConnection};
use crate::storage::{blob, files};
use crate::telegram::menu::{self, MenuAction};
use crate::telegram::session::FormState;

const RESULT_SEPARATOR_WIDTH: usize = 30;

/// The acting user's id; falls back to the chat id, which is the same thing
/// in the private chats this bot lives in.
pub fn user_id_of(msg: &Message) -> i64 {
    msg.from
        .as_ref()
        .and_then(|u| i64::try_from(u.id.0).ok())
        .unwrap_or(msg.chat.id.0)
}

/// Routes a plain-text message: an active form consumes it as step input,
/// otherwise a menu label starts its form and anything else gets a hint.
pub async fn handle_text(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    let user_id = user_id_of(msg);
    let text = msg.text().unwrap_or_default().trim().to_string();

    match deps.sessions.get(user_id).await {
        Some(FormState::AwaitingName) => receive_name(bot, chat_id, user_id, &text, deps).await,
        Some(FormState::AwaitingDocument) => {
            // Text reply while the upload form waits for a document
            if menu::is_menu_label(&text) {
                bot.send_message(chat_id, "Сначала завершите загрузку файла (или начните заново: /start).")
                    .await?;
            } else {
                bot.send_message(chat_id, "Пожалуйста, отправьте именно файл (не фото/текст).")
                    .await?;
            }
            Ok(())
        }
        Some(FormState::AwaitingTags {
            storage_path,
            display_name,
            owner_id,
        }) => receive_tags(bot, chat_id, user_id, &text, &storage_path, &display_name, owner_id, deps).await,
        Some(FormState::AwaitingQuery) => receive_search_query(bot, chat_id, user_id, &text, deps).await,
        Some(FormState::AwaitingRating) => receive_rating(bot, chat_id, user_id, &text, deps).await,
        Some(FormState::AwaitingDownloadId) => receive_download_id(bot, chat_id, user_id, &text, deps).await,
        None => match menu::action_for_label(&text) {
            Some(action) => start_form(bot, chat_id, user_id, action, deps).await,
            None => {
                bot.send_message(chat_id, "Выберите действие с помощью кнопок меню 👇")
                    .reply_markup(menu::main_menu_markup())
                    .await?;
                Ok(())
            }
        },
    }
}

/// Routes a document message into the upload form, or hints at the upload
/// button when no upload is in progress.
pub async fn handle_document(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    let user_id = user_id_of(msg);

    if deps.sessions.get(user_id).await != Some(FormState::AwaitingDocument) {
        bot.send_message(
            chat_id,
            format!("Чтобы загрузить файл, сначала нажмите «{}».", menu::UPLOAD_FILE),
        )
        .reply_markup(menu::main_menu_markup())
        .await?;
        return Ok(());
    }

    receive_document(bot, msg, chat_id, user_id, deps).await
}

/// Starts the form behind a menu button (or runs the immediate profile
/// action) and sends its first prompt.
async fn start_form(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    action: MenuAction,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    match action {
        MenuAction::Profile => return show_profile(bot, chat_id, user_id, deps).await,
        MenuAction::SetName => {
            deps.sessions.set(user_id, FormState::AwaitingName).await;
            bot.send_message(chat_id, "Пожалуйста, введите ваше имя или никнейм:").await?;
        }
        MenuAction::Upload => {
            deps.sessions.set(user_id, FormState::AwaitingDocument).await;
            bot.send_message(chat_id, "Отправьте файл (PDF, DOC, TXT и т.д.):").await?;
        }
        MenuAction::Search => {
            deps.sessions.set(user_id, FormState::AwaitingQuery).await;
            bot.send_message(
                chat_id,
                "Введите ключевые слова для поиска (например: матан лекция или матан, лекция):",
            )
            .await?;
        }
        MenuAction::Rate => {
            deps.sessions.set(user_id, FormState::AwaitingRating).await;
            bot.send_message(chat_id, "Введите ID файла и вашу оценку от 1 до 5 через пробел.\nПример: 3 5")
                .await?;
        }
        MenuAction::Download => {
            deps.sessions.set(user_id, FormState::AwaitingDownloadId).await;
            bot.send_message(
                chat_id,
                "Введите ID файла, который хотите скачать (указан в результатах поиска):",
            )
            .await?;
        }
    }
    Ok(())
}

/// Set-name form, terminal step: upsert the user and confirm.
async fn receive_name(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    text: &str,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    if menu::is_menu_label(text) {
        bot.send_message(chat_id, "Сначала завершите ввод имени.").await?;
        return Ok(());
    }
    if text.is_empty() {
        bot.send_message(chat_id, "Имя не может быть пустым. Попробуйте снова:").await?;
        return Ok(());
    }

    deps.sessions.clear(user_id).await;

    let Some(conn) = connection_or_report(bot, chat_id, deps, "❌ Ошибка сохранения. Попробуйте позже.").await? else {
        return Ok(());
    };

    match db::upsert_user(&conn, user_id, text) {
        Ok(()) => {
            log::info!("User {} set display name", user_id);
            bot.send_message(chat_id, format!("Отлично! Вас зовут: {}", text))
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
        Err(e) => {
            log::error!("Failed to save name for user {}: {}", user_id, e);
            bot.send_message(chat_id, "❌ Ошибка сохранения. Попробуйте позже.")
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
    }
    Ok(())
}

/// Upload form, document step: validate the extension, persist the blob and
/// advance to the tags step. Any failure keeps the user on this step.
async fn receive_document(
    bot: &Bot,
    msg: &Message,
    chat_id: ChatId,
    user_id: i64,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let Some(doc) = msg.document() else {
        return Ok(());
    };
    let original_name = doc.file_name.clone().unwrap_or_else(|| "document".to_string());

    if !validation::has_allowed_extension(&original_name) {
        bot.send_message(chat_id, "Поддерживаются только учебные форматы: PDF, DOC(X), TXT, PPT(X).")
            .await?;
        return Ok(());
    }

    let (_, ext) = validation::split_extension(&original_name);
    let ext = ext.to_lowercase();
    let clean_name = validation::clean_filename(&original_name);
    let timestamp = chrono::Utc::now().timestamp();
    let dest = deps.blobs.blob_path(&blob::blob_name(user_id, &clean_name, &ext, timestamp));

    if let Err(e) = download_to(bot, doc, &dest).await {
        // Storage or transport failure: apologize and stay on this step
        log::error!("Failed to store upload for user {}: {:#}", user_id, e);
        let _ = tokio::fs::remove_file(&dest).await;
        bot.send_message(chat_id, "😔 Не удалось сохранить файл. Попробуйте отправить его ещё раз.")
            .await?;
        return Ok(());
    }

    log::info!("Stored upload from user {} at {}", user_id, dest.display());

    deps.sessions
        .set(
            user_id,
            FormState::AwaitingTags {
                storage_path: dest.to_string_lossy().into_owned(),
                display_name: clean_name,
                owner_id: user_id,
            },
        )
        .await;

    bot.send_message(
        chat_id,
        "Отлично! Теперь введите ключевые слова через запятую (например: матан, лекция, пределы):",
    )
    .await?;
    Ok(())
}

/// Upload form, terminal step: record the file against its tags.
async fn receive_tags(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    text: &str,
    storage_path: &str,
    display_name: &str,
    owner_id: i64,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    if menu::is_menu_label(text) {
        bot.send_message(chat_id, "Пожалуйста, введите теги, а не нажимайте кнопки.")
            .await?;
        return Ok(());
    }
    if text.is_empty() {
        bot.send_message(chat_id, "Теги не могут быть пустыми. Попробуйте снова:").await?;
        return Ok(());
    }

    deps.sessions.clear(user_id).await;

    let Some(conn) = connection_or_report(bot, chat_id, deps, "❌ Не удалось сохранить файл. Попробуйте позже.").await?
    else {
        return Ok(());
    };

    match files::create_file(&conn, owner_id, storage_path, text, display_name) {
        Ok(file_id) => {
            log::info!("User {} uploaded file {} ({})", owner_id, file_id, display_name);
            bot.send_message(
                chat_id,
                format!(
                    "✅ Файл успешно загружен!\nID файла: {}\nНазвание: {}\nТеги: {}",
                    file_id, display_name, text
                ),
            )
            .reply_markup(menu::main_menu_markup())
            .await?;
        }
        Err(AppError::NotFound(_)) => {
            bot.send_message(
                chat_id,
                format!(
                    "❌ Не удалось сохранить файл: сначала укажите имя через «{}».",
                    menu::SET_NAME
                ),
            )
            .reply_markup(menu::main_menu_markup())
            .await?;
        }
        Err(AppError::Validation(reason)) => {
            bot.send_message(chat_id, format!("❌ {}", reason))
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
        Err(e) => {
            log::error!("Failed to record upload for user {}: {}", owner_id, e);
            bot.send_message(chat_id, "❌ Не удалось сохранить файл. Попробуйте позже.")
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
    }
    Ok(())
}

/// Search form, terminal step: run the tag search and render the hits.
async fn receive_search_query(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    text: &str,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    if menu::is_menu_label(text) {
        bot.send_message(chat_id, "Пожалуйста, введите поисковый запрос, а не нажимайте кнопки.")
            .await?;
        return Ok(());
    }
    if text.is_empty() {
        bot.send_message(chat_id, "Запрос не может быть пустым. Попробуйте снова:").await?;
        return Ok(());
    }

    deps.sessions.clear(user_id).await;

    let Some(conn) = connection_or_report(bot, chat_id, deps, "❌ Поиск временно недоступен. Попробуйте позже.").await?
    else {
        return Ok(());
    };

    match files::search_files(&conn, text) {
        Ok(hits) if hits.is_empty() => {
            bot.send_message(chat_id, "❌ Ничего не найдено по вашему запросу.")
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
        Ok(hits) => {
            let mut response = String::from("📄 Найденные файлы:\n\n");
            for hit in &hits {
                response.push_str(&format!(
                    "ID: {} | Название: {}\nАвтор: {}\nТеги: {}\nРейтинг: {:.1} ⭐\n{}\n",
                    hit.file_id,
                    hit.display_name,
                    hit.author_name,
                    hit.tags,
                    hit.rating,
                    "─".repeat(RESULT_SEPARATOR_WIDTH)
                ));
            }
            bot.send_message(chat_id, response)
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
        Err(e) => {
            log::error!("Search failed for user {}: {}", user_id, e);
            bot.send_message(chat_id, "❌ Поиск временно недоступен. Попробуйте позже.")
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
    }
    Ok(())
}

/// Rate form, terminal step: parse "<fileId> <score>" and store the rating.
async fn receive_rating(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    text: &str,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    if menu::is_menu_label(text) {
        bot.send_message(chat_id, "Пожалуйста, введите оценку, а не нажимайте кнопки.")
            .await?;
        return Ok(());
    }
    if text.is_empty() {
        bot.send_message(chat_id, "Введите ID файла и оценку через пробел. Попробуйте снова:")
            .await?;
        return Ok(());
    }

    deps.sessions.clear(user_id).await;

    let parts: Vec<&str> = text.split_whitespace().collect();
    let parsed = match parts.as_slice() {
        [id, score] => id.parse::<i64>().ok().zip(score.parse::<i64>().ok()),
        _ => None,
    };
    let Some((file_id, score)) = parsed.filter(|(_, score)| (1..=5).contains(score)) else {
        bot.send_message(chat_id, "❌ Неверный формат. Введите: ID_файла оценка (например: 2 4)")
            .reply_markup(menu::main_menu_markup())
            .await?;
        return Ok(());
    };

    let Some(conn) =
        connection_or_report(bot, chat_id, deps, "❌ Не удалось сохранить оценку. Попробуйте позже.").await?
    else {
        return Ok(());
    };

    match files::rate_file(&conn, file_id, user_id, score) {
        Ok(()) => {
            log::info!("User {} rated file {} with {}", user_id, file_id, score);
            bot.send_message(chat_id, format!("✅ Файл ID={} оценён на {}! Спасибо за отзыв!", file_id, score))
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
        Err(AppError::NotFound(_)) => {
            bot.send_message(chat_id, "❌ Не удалось сохранить оценку. Проверьте ID файла.")
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
        Err(AppError::Validation(reason)) => {
            bot.send_message(chat_id, format!("❌ {}", reason))
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
        Err(e) => {
            log::error!("Failed to save rating from user {}: {}", user_id, e);
            bot.send_message(chat_id, "❌ Не удалось сохранить оценку. Попробуйте позже.")
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
    }
    Ok(())
}

/// Download form, terminal step: resolve the blob and send it back.
async fn receive_download_id(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    text: &str,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    if menu::is_menu_label(text) {
        bot.send_message(chat_id, "Пожалуйста, введите ID файла.").await?;
        return Ok(());
    }
    if text.is_empty() {
        bot.send_message(chat_id, "Введите ID файла. Попробуйте снова:").await?;
        return Ok(());
    }

    deps.sessions.clear(user_id).await;

    let Some(file_id) = text.parse::<i64>().ok().filter(|id| *id > 0) else {
        bot.send_message(chat_id, "❌ Неверный ID. Введите целое положительное число.")
            .reply_markup(menu::main_menu_markup())
            .await?;
        return Ok(());
    };

    let Some(conn) = connection_or_report(bot, chat_id, deps, "❌ Не удалось отправить файл. Попробуйте позже.").await?
    else {
        return Ok(());
    };

    let path = files::get_file_path(&conn, file_id);
    drop(conn);

    let Some(path) = path else {
        bot.send_message(chat_id, "❌ Файл не найден. Проверьте ID и попробуйте снова.")
            .reply_markup(menu::main_menu_markup())
            .await?;
        return Ok(());
    };

    // The record may outlive the blob (e.g. an operator wiped the storage
    // dir); treat a missing blob the same as an unknown id.
    if !blob::blob_exists(&path).await {
        log::warn!("Blob missing for file {}: {}", file_id, path);
        bot.send_message(chat_id, "❌ Файл не найден. Проверьте ID и попробуйте снова.")
            .reply_markup(menu::main_menu_markup())
            .await?;
        return Ok(());
    }

    match bot.send_document(chat_id, InputFile::file(PathBuf::from(&path))).await {
        Ok(_) => {
            log::info!("Sent file {} to user {}", file_id, user_id);
            bot.send_message(chat_id, "✅ Файл отправлен!")
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
        Err(e) => {
            log::error!("Failed to send file {} to user {}: {}", file_id, user_id, e);
            bot.send_message(chat_id, "❌ Не удалось отправить файл. Попробуйте позже.")
                .reply_markup(menu::main_menu_markup())
                .await?;
        }
    }
    Ok(())
}

/// Immediate profile action: stored name plus owned files with ratings.
async fn show_profile(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(conn) = connection_or_report(bot, chat_id, deps, "❌ Профиль временно недоступен. Попробуйте позже.").await?
    else {
        return Ok(());
    };

    let name = match db::get_user_name(&conn, user_id) {
        Ok(name) => name,
        Err(e) => {
            log::error!("Failed to load profile for user {}: {}", user_id, e);
            None
        }
    };

    let Some(name) = name else {
        bot.send_message(
            chat_id,
            format!("Сначала укажите своё имя с помощью кнопки «{}».", menu::SET_NAME),
        )
        .reply_markup(menu::main_menu_markup())
        .await?;
        return Ok(());
    };

    let mut response = format!("👤 Ваш профиль\nИмя: {}\n\n", name);
    match files::list_user_files(&conn, user_id) {
        Ok(files) if files.is_empty() => response.push_str("📂 Вы пока ничего не загрузили."),
        Ok(files) => {
            response.push_str(&format!("📂 Ваши файлы ({}):\n\n", files.len()));
            for f in &files {
                response.push_str(&format!(
                    "ID: {} | Название: {}\nТеги: {}\nРейтинг: {:.1} ⭐\n{}\n",
                    f.file_id,
                    f.display_name,
                    f.tags,
                    f.rating,
                    "─".repeat(RESULT_SEPARATOR_WIDTH)
                ));
            }
        }
        Err(e) => {
            log::error!("Failed to list files for user {}: {}", user_id, e);
            response.push_str("📂 Не удалось загрузить список файлов.");
        }
    }

    bot.send_message(chat_id, response)
        .reply_markup(menu::main_menu_markup())
        .await?;
    Ok(())
}

/// Fetches the document behind a Telegram file id into `dest`.
async fn download_to(bot: &Bot, doc: &Document, dest: &Path) -> anyhow::Result<()> {
    let file = bot.get_file(doc.file.id.clone()).await?;
    let mut dst = tokio::fs::File::create(dest).await?;
    bot.download_file(&file.path, &mut dst).await?;
    dst.flush().await?;
    Ok(())
}

/// Pulls a pooled connection, reporting the given failure message and ending
/// the interaction when the pool is exhausted.
async fn connection_or_report(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    failure_message: &str,
) -> Result<Option<DbConnection>, HandlerError> {
    match get_connection(&deps.db_pool) {
        Ok(conn) => Ok(Some(conn)),
        Err(e) => {
            log::error!("Failed to get DB connection: {}", e);
            bot.send_message(chat_id, failure_message)
                .reply_markup(menu::main_menu_markup())
                .await?;
            Ok(None)
        }
    }
}
