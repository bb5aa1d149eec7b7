use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};
#[cfg(feature = "postgres")]
use tokio::sync::OnceCell;

/// Configuration for the posts database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

/// Process-wide pool, shared by every caller of [`DatabaseConnections::shared`].
#[cfg(feature = "postgres")]
static SHARED: OnceCell<DatabaseConnections> = OnceCell::const_new();

/// Database connection pool holder.
///
/// # Example
/// ```ignore
/// let db = DatabaseConnections::shared(&config).await?;
/// let repo = PostgresPostRepository::new(db.main.clone());
/// ```
#[cfg(feature = "postgres")]
pub struct DatabaseConnections {
    pub main: DbConn,
}

#[cfg(feature = "postgres")]
impl DatabaseConnections {
    /// Open a new connection pool from configuration.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let main = Database::connect(opts).await?;
        tracing::info!("Database connected (pool: {})", config.max_connections);

        Ok(Self { main })
    }

    /// Return the process-wide pool, connecting on first use.
    ///
    /// Concurrent first callers share a single connect attempt. A failed
    /// attempt leaves the cell empty so the next call retries.
    pub async fn shared(config: &DatabaseConfig) -> Result<&'static Self, DbErr> {
        SHARED.get_or_try_init(|| Self::init(config)).await
    }
}
