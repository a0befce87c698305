//! Per-user dialogue state
//!
//! Each user has at most one in-progress form; the state lives only for the
//! duration of that form. The store is passed explicitly through
//! `HandlerDeps` instead of living in a global.

use std::collections::HashMap;

use tokio::sync::Mutex;

/// Which step of which form a user is on
///
/// Absence from the store means no active form. `AwaitingTags` carries the
/// upload form's transient data so nothing about the in-flight upload is
/// kept anywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// Set-name form: waiting for the display name text
    AwaitingName,
    /// Upload form: waiting for the document itself
    AwaitingDocument,
    /// Upload form: blob persisted, waiting for the tags text
    AwaitingTags {
        storage_path: String,
        display_name: String,
        owner_id: i64,
    },
    /// Search form: waiting for the query text
    AwaitingQuery,
    /// Rate form: waiting for "<fileId> <score>" text
    AwaitingRating,
    /// Download form: waiting for the file id text
    AwaitingDownloadId,
}

/// Maps user id to the in-progress form state
#[derive(Debug, Default)]
pub struct SessionStore {
    forms: Mutex<HashMap<i64, FormState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts or advances a user's form.
    pub async fn set(&self, user_id: i64, state: FormState) {
        let mut forms = self.forms.lock().await;
        forms.insert(user_id, state);
    }

    /// Current state, if a form is in progress.
    pub async fn get(&self, user_id: i64) -> Option<FormState> {
        let forms = self.forms.lock().await;
        forms.get(&user_id).cloned()
    }

    /// Ends the user's form, returning the final state.
    pub async fn take(&self, user_id: i64) -> Option<FormState> {
        let mut forms = self.forms.lock().await;
        forms.remove(&user_id)
    }

    /// Ends the user's form unconditionally (the reset trigger).
    pub async fn clear(&self, user_id: i64) {
        let mut forms = self.forms.lock().await;
        forms.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_form_by_default() {
        let store = SessionStore::new();
        assert_eq!(store.get(1).await, None);
    }

    #[tokio::test]
    async fn test_set_then_get_then_clear() {
        let store = SessionStore::new();
        store.set(1, FormState::AwaitingName).await;
        assert_eq!(store.get(1).await, Some(FormState::AwaitingName));

        store.clear(1).await;
        assert_eq!(store.get(1).await, None);
    }

    #[tokio::test]
    async fn test_states_are_per_user() {
        let store = SessionStore::new();
        store.set(1, FormState::AwaitingQuery).await;
        store.set(2, FormState::AwaitingRating).await;

        assert_eq!(store.get(1).await, Some(FormState::AwaitingQuery));
        assert_eq!(store.get(2).await, Some(FormState::AwaitingRating));
    }

    #[tokio::test]
    async fn test_upload_state_carries_transient_data() {
        let store = SessionStore::new();
        store.set(1, FormState::AwaitingDocument).await;
        store
            .set(
                1,
                FormState::AwaitingTags {
                    storage_path: "storage/1_a.pdf_7.pdf".to_string(),
                    display_name: "a.pdf".to_string(),
                    owner_id: 1,
                },
            )
            .await;

        match store.take(1).await {
            Some(FormState::AwaitingTags {
                storage_path,
                display_name,
                owner_id,
            }) => {
                assert_eq!(storage_path, "storage/1_a.pdf_7.pdf");
                assert_eq!(display_name, "a.pdf");
                assert_eq!(owner_id, 1);
            }
            other => panic!("unexpected state: {:?}", other),
        }
        assert_eq!(store.get(1).await, None);
    }
}
