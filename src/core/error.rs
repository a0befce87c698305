use thiserror::Error;

/// Centralized error types for the application
///
/// Store operations return these so that callers can pattern-match the
/// outcome instead of inspecting error classes. `Validation` and `NotFound`
/// carry a user-facing message; the remaining variants wrap infrastructure
/// errors and are never shown to users verbatim.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad caller input (blank strings, out-of-range ids or scores)
    #[error("{0}")]
    Validation(String),

    /// A referenced user or file does not exist
    #[error("{0}")]
    NotFound(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Shorthand for a `Validation` error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Shorthand for a `NotFound` error with the given message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
