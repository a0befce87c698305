//! Update handlers: dispatcher schema, commands and form steps

pub mod commands;
pub mod forms;
pub mod schema;
pub mod types;

// Re-exports for convenience
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
