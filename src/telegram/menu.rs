//! Main menu reply keyboard
//!
//! The labels are the bot's entire command surface: each one triggers a form
//! (or the immediate profile action). They are also a reserved-word set:
//! every form step checks [`is_menu_label`] before treating text as input,
//! so a stray button press is never swallowed as form data.

use teloxide::types::{KeyboardButton, KeyboardMarkup};

pub const SET_NAME: &str = "📌 Указать имя";
pub const MY_PROFILE: &str = "👤 Мой профиль";
pub const UPLOAD_FILE: &str = "📤 Загрузить файл";
pub const DOWNLOAD_FILE: &str = "📥 Скачать файл";
pub const FIND_FILE: &str = "🔍 Найти файл";
pub const RATE_FILE: &str = "⭐ Оценить файл";

const ALL_LABELS: [&str; 6] = [SET_NAME, MY_PROFILE, UPLOAD_FILE, DOWNLOAD_FILE, FIND_FILE, RATE_FILE];

/// Action behind a menu button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    SetName,
    Profile,
    Upload,
    Download,
    Search,
    Rate,
}

/// Returns true if the text is exactly one of the menu button labels.
pub fn is_menu_label(text: &str) -> bool {
    ALL_LABELS.contains(&text)
}

/// Maps a button label to its action, `None` for free-form text.
pub fn action_for_label(text: &str) -> Option<MenuAction> {
    match text {
        SET_NAME => Some(MenuAction::SetName),
        MY_PROFILE => Some(MenuAction::Profile),
        UPLOAD_FILE => Some(MenuAction::Upload),
        DOWNLOAD_FILE => Some(MenuAction::Download),
        FIND_FILE => Some(MenuAction::Search),
        RATE_FILE => Some(MenuAction::Rate),
        _ => None,
    }
}

/// Builds the persistent 2x3 main menu keyboard.
pub fn main_menu_markup() -> KeyboardMarkup {
    KeyboardMarkup::new([
        [KeyboardButton::new(SET_NAME), KeyboardButton::new(MY_PROFILE)],
        [KeyboardButton::new(UPLOAD_FILE), KeyboardButton::new(DOWNLOAD_FILE)],
        [KeyboardButton::new(FIND_FILE), KeyboardButton::new(RATE_FILE)],
    ])
    .resize_keyboard()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_label_is_reserved() {
        for label in ALL_LABELS {
            assert!(is_menu_label(label), "Label not reserved: {}", label);
            assert!(action_for_label(label).is_some(), "Label has no action: {}", label);
        }
    }

    #[test]
    fn test_free_text_is_not_reserved() {
        for text in ["матан лекция", "Указать имя", "3 5", ""] {
            assert!(!is_menu_label(text), "Should not be reserved: {}", text);
            assert!(action_for_label(text).is_none());
        }
    }

    #[test]
    fn test_keyboard_layout() {
        let markup = main_menu_markup();
        assert_eq!(markup.keyboard.len(), 3);
        for row in &markup.keyboard {
            assert_eq!(row.len(), 2);
        }
    }
}
