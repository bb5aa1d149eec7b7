use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostChanges};
use crate::error::RepoError;

/// Generic repository trait defining the CRUD operations every backend shares.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Returns `RepoError::NotFound` if nothing was removed.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// List posts, optionally keeping only those tagged with `tag`.
    async fn list(&self, tag: Option<&str>) -> Result<Vec<Post>, RepoError>;

    /// Apply `changes` to the post with the given id and return the result.
    /// Returns `RepoError::NotFound` if the post does not exist.
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError>;
}
