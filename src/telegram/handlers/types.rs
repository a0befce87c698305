//! Handler types and dependencies

use std::sync::Arc;

use crate::storage::blob::BlobStore;
use crate::storage::db::DbPool;
use crate::telegram::session::SessionStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub sessions: Arc<SessionStore>,
    pub blobs: Arc<BlobStore>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(db_pool: Arc<DbPool>, sessions: Arc<SessionStore>, blobs: Arc<BlobStore>) -> Self {
        Self {
            db_pool,
            sessions,
            blobs,
        }
    }
}
