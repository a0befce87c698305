//! Connection pool, schema bootstrap and user operations

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::{AppError, AppResult};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and ensures the
/// schema exists on the first connection.
///
/// # Arguments
///
/// * `database_path` - Path to the SQLite database file
///
/// # Errors
///
/// Fails if the pool cannot be built or the schema cannot be created.
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder().max_size(10).build(manager)?;

    let conn = pool.get()?;
    init_schema(&conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Creates the users, files and ratings tables if they do not exist yet.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id           INTEGER PRIMARY KEY,
            display_name TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS files (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id     INTEGER NOT NULL,
            storage_path TEXT NOT NULL,
            tags         TEXT NOT NULL,
            display_name TEXT NOT NULL,
            FOREIGN KEY (owner_id) REFERENCES users (id)
        );
        CREATE TABLE IF NOT EXISTS ratings (
            file_id  INTEGER,
            rater_id INTEGER,
            score    INTEGER CHECK (score BETWEEN 1 AND 5),
            PRIMARY KEY (file_id, rater_id),
            FOREIGN KEY (file_id) REFERENCES files (id)
        );",
    )
}

/// Inserts a user or replaces the stored name for an existing id.
///
/// The id is the external Telegram identity, so it is never generated here.
///
/// # Errors
///
/// * `Validation` - non-positive id or blank name
/// * `Database` - underlying SQLite failure
pub fn upsert_user(conn: &Connection, id: i64, name: &str) -> AppResult<()> {
    if id <= 0 {
        return Err(AppError::validation(
            "Идентификатор пользователя должен быть положительным числом.",
        ));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Имя не может быть пустым."));
    }

    conn.execute(
        "INSERT OR REPLACE INTO users (id, display_name) VALUES (?1, ?2)",
        params![id, name],
    )?;
    Ok(())
}

/// Returns the stored display name for a user, or `None` if the user has
/// never set one. Non-positive ids resolve to `None` without touching the
/// database.
pub fn get_user_name(conn: &Connection, id: i64) -> AppResult<Option<String>> {
    if id <= 0 {
        return Ok(None);
    }

    let name = conn
        .query_row("SELECT display_name FROM users WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(name)
}
