//! Collection store port - a remote blob holding every post as one JSON document.

use async_trait::async_trait;

use crate::domain::Post;
use crate::error::RepoError;

/// Store for the whole post collection, read and written as a single document.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Read the published collection.
    ///
    /// `Ok(None)` means nothing has been published yet.
    async fn try_fetch(&self) -> Result<Option<Vec<Post>>, StoreError>;

    /// Replace the published collection with `posts`.
    async fn publish_collection(&self, posts: &[Post]) -> Result<(), StoreError>;

    /// Read the published collection, treating "not published" and
    /// "unreachable" alike as an empty collection.
    ///
    /// A document that exists but cannot be parsed is still an error, so a
    /// following publish cannot overwrite it with an empty list.
    async fn fetch_collection(&self) -> Result<Vec<Post>, StoreError> {
        match self.try_fetch().await {
            Ok(Some(posts)) => Ok(posts),
            Ok(None) => {
                tracing::info!("No collection published yet, starting empty");
                Ok(Vec::new())
            }
            Err(StoreError::Unreachable(reason)) => {
                tracing::warn!(%reason, "Collection fetch failed, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

/// Collection store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unreachable: {0}")]
    Unreachable(String),

    #[error("Malformed collection document: {0}")]
    Malformed(String),

    #[error("Upload failed: {0}")]
    Upload(String),
}

impl From<StoreError> for RepoError {
    fn from(err: StoreError) -> Self {
        RepoError::Persistence(err.to_string())
    }
}
