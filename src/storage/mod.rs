//! Database and blob storage

pub mod blob;
pub mod db;
pub mod files;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
