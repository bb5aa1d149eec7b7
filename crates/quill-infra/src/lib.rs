//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory collection store only
//! - `postgres` - PostgreSQL post repository via SeaORM
//! - `neocities` - Collection document hosted on Neocities via reqwest

pub mod database;
pub mod document;

// Re-exports - always available
pub use database::DatabaseConfig;
pub use document::{CollectionPostRepository, InMemoryCollectionStore};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, PostgresPostRepository};

#[cfg(feature = "neocities")]
pub use document::{NeocitiesConfig, NeocitiesStore};
