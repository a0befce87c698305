use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable.
/// Required: the process refuses to start when neither is set.
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: lectary.db
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "lectary.db".to_string()));

/// Blob storage directory for uploaded documents
/// Read from STORAGE_DIR environment variable
/// Default: storage
pub static STORAGE_DIR: Lazy<String> = Lazy::new(|| env::var("STORAGE_DIR").unwrap_or_else(|_| "storage".to_string()));

/// Upload constraints
pub mod upload {
    /// Document extensions accepted by the upload form (case-insensitive)
    pub const ALLOWED_EXTENSIONS: [&str; 6] = [".pdf", ".doc", ".docx", ".txt", ".ppt", ".pptx"];

    /// Maximum length of a sanitized display name, in characters
    pub const MAX_NAME_CHARS: usize = 100;

    /// Characters of the stem kept when a sanitized name is truncated
    pub const KEPT_STEM_CHARS: usize = 90;

    /// Display name used when sanitization leaves nothing
    pub const FALLBACK_NAME: &str = "unnamed_file";
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Telegram HTTP requests (in seconds)
    /// Generous because document uploads/downloads go through the same client
    pub const REQUEST_TIMEOUT_SECS: u64 = 300;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
