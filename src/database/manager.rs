use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owns the connection pool for the profile database
pub struct DatabaseManager {
    pool: OnceCell<PgPool>,
    settings: DatabaseConfig,
}

impl DatabaseManager {
    pub fn new(settings: DatabaseConfig) -> Self {
        Self {
            pool: OnceCell::new(),
            settings,
        }
    }

    /// Get the pool, connecting lazily on first use
    pub async fn pool(&self) -> Result<PgPool, DatabaseError> {
        let pool = self
            .pool
            .get_or_try_init(|| async {
                let connection_string = Self::connection_string()?;
                let pool = PgPoolOptions::new()
                    .max_connections(self.settings.max_connections)
                    .acquire_timeout(Duration::from_secs(self.settings.connection_timeout))
                    .connect(&connection_string)
                    .await?;
                info!("Created database pool (max {} connections)", self.settings.max_connections);
                Ok::<_, DatabaseError>(pool)
            })
            .await?;
        Ok(pool.clone())
    }

    fn connection_string() -> Result<String, DatabaseError> {
        let raw = std::env::var("DATABASE_URL").map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let url = url::Url::parse(&raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url.into()),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        let pool = self.pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }
}
