//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use quill_infra::DatabaseConfig;

#[cfg(feature = "neocities")]
use quill_infra::NeocitiesConfig;

/// Startup configuration errors. Any of these stops the server before it binds.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing env vars for the {backend} backend: set {}", .names.join(", "))]
    Missing {
        backend: &'static str,
        names: Vec<&'static str>,
    },

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[cfg(not(feature = "neocities"))]
    #[error("Storage backend '{0}' is not compiled into this build")]
    Unsupported(&'static str),
}

/// Where posts are stored.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// One row per post in PostgreSQL.
    Postgres {
        database: DatabaseConfig,
        run_migrations: bool,
    },
    /// The whole collection as `posts.json` on a Neocities site.
    #[cfg(feature = "neocities")]
    Neocities(NeocitiesConfig),
    /// The whole collection as a JSON document held in process memory.
    Memory,
}

impl StorageConfig {
    pub fn name(&self) -> &'static str {
        match self {
            StorageConfig::Postgres { .. } => "postgres",
            #[cfg(feature = "neocities")]
            StorageConfig::Neocities(_) => "neocities",
            StorageConfig::Memory => "memory",
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_var(&lookup, "PORT", 3000)?,
            storage: Self::parse_storage(&lookup)?,
        })
    }

    /// Pick the backend from `STORAGE_BACKEND`, falling back to postgres when
    /// `DATABASE_URL` is set and neocities otherwise.
    fn parse_storage<F>(lookup: &F) -> Result<StorageConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = lookup("STORAGE_BACKEND")
            .map(|b| b.to_lowercase())
            .unwrap_or_else(|| {
                if lookup("DATABASE_URL").is_some() {
                    "postgres".to_string()
                } else {
                    "neocities".to_string()
                }
            });

        match backend.as_str() {
            "postgres" => Self::parse_postgres(lookup),
            "neocities" => Self::parse_neocities(lookup),
            "memory" => Ok(StorageConfig::Memory),
            _ => Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                value: backend,
            }),
        }
    }

    fn parse_postgres<F>(lookup: &F) -> Result<StorageConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").ok_or_else(|| ConfigError::Missing {
            backend: "postgres",
            names: vec!["DATABASE_URL"],
        })?;

        Ok(StorageConfig::Postgres {
            database: DatabaseConfig {
                url,
                max_connections: parse_var(lookup, "DB_MAX_CONNECTIONS", 10)?,
                min_connections: parse_var(lookup, "DB_MIN_CONNECTIONS", 1)?,
                connect_timeout: Duration::from_secs(parse_var(
                    lookup,
                    "DB_CONNECT_TIMEOUT_SECS",
                    8,
                )?),
            },
            run_migrations: lookup("DB_RUN_MIGRATIONS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    #[cfg(feature = "neocities")]
    fn parse_neocities<F>(lookup: &F) -> Result<StorageConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        use quill_infra::document::{DEFAULT_FILE_NAME, DEFAULT_UPLOAD_URL};

        let required = ["NEOCITIES_API_KEY", "NEOCITIES_USERNAME", "BLOG_URL"];
        let missing: Vec<&'static str> = required
            .into_iter()
            .filter(|name| lookup(name).is_none_or(|v| v.is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing {
                backend: "neocities",
                names: missing,
            });
        }

        Ok(StorageConfig::Neocities(NeocitiesConfig {
            api_key: lookup("NEOCITIES_API_KEY").unwrap_or_default(),
            username: lookup("NEOCITIES_USERNAME").unwrap_or_default(),
            site_url: lookup("BLOG_URL").unwrap_or_default(),
            upload_url: lookup("NEOCITIES_UPLOAD_URL")
                .unwrap_or_else(|| DEFAULT_UPLOAD_URL.to_string()),
            file_name: lookup("POSTS_FILE").unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
        }))
    }

    #[cfg(not(feature = "neocities"))]
    fn parse_neocities<F>(_lookup: &F) -> Result<StorageConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Err(ConfigError::Unsupported("neocities"))
    }
}

/// Parse an optional variable, rejecting values that do not fit `T`.
fn parse_var<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}
