//! File and rating operations
//!
//! Files are created once per successful upload and immutable thereafter.
//! Ratings are upserted by (file_id, rater_id); search is an in-memory
//! word-intersection over the tag strings of all files.

use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::{AppError, AppResult};

/// A search result row with its author and computed average rating
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub file_id: i64,
    pub display_name: String,
    pub tags: String,
    pub author_name: String,
    pub rating: f64,
}

/// A file owned by a user, as rendered in the profile
#[derive(Debug, Clone)]
pub struct UserFile {
    pub file_id: i64,
    pub display_name: String,
    pub tags: String,
    pub rating: f64,
}

/// Records an uploaded file.
///
/// # Arguments
///
/// * `owner_id` - id of the uploader; must already exist in `users`
/// * `storage_path` - where the blob was persisted
/// * `tags` - comma-separated keywords as entered by the user
/// * `display_name` - sanitized human-readable name
///
/// # Errors
///
/// * `Validation` - non-positive owner id or blank fields
/// * `NotFound` - the owner has no user record yet
///
/// Returns the auto-incremented file id.
pub fn create_file(
    conn: &Connection,
    owner_id: i64,
    storage_path: &str,
    tags: &str,
    display_name: &str,
) -> AppResult<i64> {
    if owner_id <= 0 {
        return Err(AppError::validation(
            "Идентификатор пользователя должен быть положительным числом.",
        ));
    }
    let storage_path = storage_path.trim();
    if storage_path.is_empty() {
        return Err(AppError::validation("Путь к файлу не может быть пустым."));
    }
    let tags = tags.trim();
    if tags.is_empty() {
        return Err(AppError::validation("Теги не могут быть пустыми."));
    }
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::validation("Название файла не может быть пустым."));
    }

    if !user_exists(conn, owner_id)? {
        return Err(AppError::not_found(format!(
            "Пользователь {} не найден. Сначала укажите имя.",
            owner_id
        )));
    }

    conn.execute(
        "INSERT INTO files (owner_id, storage_path, tags, display_name) VALUES (?1, ?2, ?3, ?4)",
        params![owner_id, storage_path, tags, display_name],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Searches files whose tags share at least one word with the query.
///
/// The query is split on whitespace, tag strings on commas; both sides are
/// lowercased, so matching is case-insensitive and word-boundary based, not
/// substring. Any shared word is a match (OR semantics).
///
/// # Errors
///
/// * `Validation` - blank query
pub fn search_files(conn: &Connection, query: &str) -> AppResult<Vec<SearchHit>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::validation("Запрос для поиска не может быть пустым."));
    }

    let query_words: HashSet<String> = query.split_whitespace().map(|w| w.to_lowercase()).collect();

    let mut stmt = conn.prepare(
        "SELECT f.id, f.display_name, f.tags, u.display_name
         FROM files f
         JOIN users u ON f.owner_id = u.id
         ORDER BY f.id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut hits = Vec::new();
    for (file_id, display_name, tags, author_name) in rows {
        if !tags_match(&query_words, &tags) {
            continue;
        }
        let rating = average_rating(conn, file_id)?;
        hits.push(SearchHit {
            file_id,
            display_name,
            tags,
            author_name,
            rating,
        });
    }

    Ok(hits)
}

/// Returns the stored blob path for a file, or `None` if the id is unknown.
///
/// Total by design: invalid ids and storage errors all resolve to `None`,
/// because the download form's only failure mode is "not found".
pub fn get_file_path(conn: &Connection, file_id: i64) -> Option<String> {
    if file_id <= 0 {
        return None;
    }

    match conn
        .query_row(
            "SELECT storage_path FROM files WHERE id = ?1",
            params![file_id],
            |row| row.get(0),
        )
        .optional()
    {
        Ok(path) => path,
        Err(e) => {
            log::error!("Failed to look up path for file {}: {}", file_id, e);
            None
        }
    }
}

/// Returns all files owned by a user, each with its average rating.
///
/// Non-positive and unknown ids yield an empty vec.
pub fn list_user_files(conn: &Connection, user_id: i64) -> AppResult<Vec<UserFile>> {
    if user_id <= 0 {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare("SELECT id, display_name, tags FROM files WHERE owner_id = ?1 ORDER BY id")?;
    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut files = Vec::new();
    for (file_id, display_name, tags) in rows {
        let rating = average_rating(conn, file_id)?;
        files.push(UserFile {
            file_id,
            display_name,
            tags,
            rating,
        });
    }

    Ok(files)
}

/// Stores a rating, replacing the rater's previous score for the same file.
///
/// # Errors
///
/// * `Validation` - non-positive ids or score outside 1..=5
/// * `NotFound` - unknown file id
pub fn rate_file(conn: &Connection, file_id: i64, rater_id: i64, score: i64) -> AppResult<()> {
    if file_id <= 0 || rater_id <= 0 {
        return Err(AppError::validation(
            "Идентификаторы должны быть положительными числами.",
        ));
    }
    if !(1..=5).contains(&score) {
        return Err(AppError::validation("Оценка должна быть целым числом от 1 до 5."));
    }

    if !file_exists(conn, file_id)? {
        return Err(AppError::not_found(format!("Файл с ID={} не найден.", file_id)));
    }

    conn.execute(
        "INSERT INTO ratings (file_id, rater_id, score) VALUES (?1, ?2, ?3)
         ON CONFLICT (file_id, rater_id) DO UPDATE SET score = excluded.score",
        params![file_id, rater_id, score],
    )?;
    Ok(())
}

/// Arithmetic mean of a file's scores, or `0.0` when it has none.
///
/// # Errors
///
/// * `Validation` - non-positive file id
pub fn average_rating(conn: &Connection, file_id: i64) -> AppResult<f64> {
    if file_id <= 0 {
        return Err(AppError::validation(
            "Идентификатор файла должен быть положительным числом.",
        ));
    }

    let avg: Option<f64> = conn.query_row(
        "SELECT AVG(score) FROM ratings WHERE file_id = ?1",
        params![file_id],
        |row| row.get(0),
    )?;
    Ok(avg.unwrap_or(0.0))
}

fn user_exists(conn: &Connection, user_id: i64) -> AppResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM users WHERE id = ?1", params![user_id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn file_exists(conn: &Connection, file_id: i64) -> AppResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM files WHERE id = ?1", params![file_id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn tags_match(query_words: &HashSet<String>, tags: &str) -> bool {
    tags.split(',')
        .map(|w| w.trim().to_lowercase())
        .any(|w| !w.is_empty() && query_words.contains(&w))
}

// Store behavior is covered by the integration test suite against a real
// pool. See tests/store_test.rs
