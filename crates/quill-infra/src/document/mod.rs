//! Collection-document storage - every post lives in one JSON document.

mod memory;
mod repository;

#[cfg(feature = "neocities")]
mod neocities;

pub use memory::InMemoryCollectionStore;
pub use repository::CollectionPostRepository;

#[cfg(feature = "neocities")]
pub use neocities::{DEFAULT_FILE_NAME, DEFAULT_UPLOAD_URL, NeocitiesConfig, NeocitiesStore};
