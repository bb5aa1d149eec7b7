//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod collection_store;
mod repository;

pub use collection_store::{CollectionStore, StoreError};
pub use repository::{BaseRepository, PostRepository};
