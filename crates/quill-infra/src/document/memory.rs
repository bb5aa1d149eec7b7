//! In-memory collection store - used for local development and tests.

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::Post;
use quill_core::ports::{CollectionStore, StoreError};

/// Holds the published document as serialized JSON text, the way a file host
/// would, so every read goes through the same serde path as the remote store.
///
/// Note: Data is lost on process restart.
pub struct InMemoryCollectionStore {
    document: RwLock<Option<String>>,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self {
            document: RwLock::new(None),
        }
    }

    /// Start from an already published document.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: RwLock::new(Some(document.into())),
        }
    }

    /// Raw text of the published document, if any.
    pub async fn document(&self) -> Option<String> {
        self.document.read().await.clone()
    }
}

impl Default for InMemoryCollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CollectionStore for InMemoryCollectionStore {
    async fn try_fetch(&self) -> Result<Option<Vec<Post>>, StoreError> {
        let document = self.document.read().await;
        match document.as_deref() {
            Some(text) => serde_json::from_str(text)
                .map(Some)
                .map_err(|e| StoreError::Malformed(e.to_string())),
            None => Ok(None),
        }
    }

    async fn publish_collection(&self, posts: &[Post]) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(posts)
            .map_err(|e| StoreError::Upload(e.to_string()))?;

        *self.document.write().await = Some(text);
        Ok(())
    }
}
