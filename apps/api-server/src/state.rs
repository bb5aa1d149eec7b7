//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::PostRepository;
use quill_infra::{CollectionPostRepository, InMemoryCollectionStore};

#[cfg(feature = "postgres")]
use quill_infra::{DatabaseConnections, PostgresPostRepository};

#[cfg(feature = "neocities")]
use quill_infra::NeocitiesStore;

use crate::config::StorageConfig;

/// Failures while wiring up the storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to connect to database: {0}")]
    Database(String),

    #[cfg(not(feature = "postgres"))]
    #[error("Storage backend '{0}' is not compiled into this build")]
    Unsupported(&'static str),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub backend: &'static str,
}

impl AppState {
    /// Build the state around an existing repository.
    pub fn with_repository(posts: Arc<dyn PostRepository>, backend: &'static str) -> Self {
        Self { posts, backend }
    }

    /// Build the application state for the configured backend.
    pub async fn new(storage: &StorageConfig) -> Result<Self, StateError> {
        let backend = storage.name();

        let posts: Arc<dyn PostRepository> = match storage {
            #[cfg(feature = "postgres")]
            StorageConfig::Postgres {
                database,
                run_migrations,
            } => {
                let connections = DatabaseConnections::shared(database)
                    .await
                    .map_err(|e| StateError::Database(e.to_string()))?;

                if *run_migrations {
                    use migration::MigratorTrait;

                    migration::Migrator::up(&connections.main, None)
                        .await
                        .map_err(|e| StateError::Database(e.to_string()))?;
                    tracing::info!("Database migrations applied");
                }

                Arc::new(PostgresPostRepository::new(connections.main.clone()))
            }
            #[cfg(not(feature = "postgres"))]
            StorageConfig::Postgres { .. } => return Err(StateError::Unsupported("postgres")),
            #[cfg(feature = "neocities")]
            StorageConfig::Neocities(config) => {
                tracing::info!(
                    document = %config.document_url(),
                    "Publishing posts to Neocities"
                );
                Arc::new(CollectionPostRepository::new(NeocitiesStore::new(
                    config.clone(),
                )))
            }
            StorageConfig::Memory => {
                tracing::warn!("Using in-memory storage - posts are lost on restart");
                Arc::new(CollectionPostRepository::new(InMemoryCollectionStore::new()))
            }
        };

        tracing::info!(backend, "Application state initialized");

        Ok(Self::with_repository(posts, backend))
    }
}
