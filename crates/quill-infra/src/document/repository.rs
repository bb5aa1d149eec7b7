//! Post repository backed by a single collection document.

use async_trait::async_trait;
use uuid::Uuid;

use quill_core::domain::{Post, PostChanges};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CollectionStore, PostRepository};

/// Post repository over any [`CollectionStore`].
///
/// Every write downloads the full collection, changes it in memory and
/// publishes the full collection again. The cycle is not atomic: two writers
/// working from the same snapshot both publish, and the last one wins.
pub struct CollectionPostRepository<S> {
    store: S,
}

impl<S> CollectionPostRepository<S>
where
    S: CollectionStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S> BaseRepository<Post, Uuid> for CollectionPostRepository<S>
where
    S: CollectionStore,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let posts = self.store.fetch_collection().await?;
        Ok(posts.into_iter().find(|p| p.id == id))
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        let mut posts = self.store.fetch_collection().await?;
        // Newest first
        posts.insert(0, entity.clone());
        self.store.publish_collection(&posts).await?;

        tracing::debug!(post_id = %entity.id, total = posts.len(), "Collection published");
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.store.fetch_collection().await?;
        let position = posts
            .iter()
            .position(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;

        posts.remove(position);
        self.store.publish_collection(&posts).await?;
        Ok(())
    }
}

#[async_trait]
impl<S> PostRepository for CollectionPostRepository<S>
where
    S: CollectionStore,
{
    async fn list(&self, tag: Option<&str>) -> Result<Vec<Post>, RepoError> {
        let posts = self.store.fetch_collection().await?;

        Ok(match tag {
            Some(tag) => posts.into_iter().filter(|p| p.has_tag(tag)).collect(),
            None => posts,
        })
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        let mut posts = self.store.fetch_collection().await?;
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;

        post.apply(changes);
        let updated = post.clone();

        self.store.publish_collection(&posts).await?;
        Ok(updated)
    }
}
