use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::config::{self, DatabaseConfig, StoreBackend};
use crate::server;
use crate::services::{AssetSettings, ProfileService};

/// Signup-time initialization: talks to the store directly, no HTTP
pub async fn handle(username: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    require_persistent_store(&config.database)?;

    let store = server::build_store(&config.database).await?;
    let uploader = server::build_uploader(&config.storage)?;
    let service = ProfileService::new(store, uploader, AssetSettings::from(&config.storage));

    let profile = service.ensure_profile(username).await?;

    utils::output_success(
        &output_format,
        &format!("Profile ready for '{}'", profile.username),
        Some(json!({ "version": profile.version, "blocks": profile.blocks.len() })),
    )
}

/// A memory store lives only as long as this process, so init would be a no-op
fn require_persistent_store(database: &DatabaseConfig) -> anyhow::Result<()> {
    match database.backend {
        StoreBackend::Postgres => Ok(()),
        StoreBackend::Memory => anyhow::bail!(
            "init writes to the profile database directly; set STORE_BACKEND=postgres and DATABASE_URL"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database(backend: StoreBackend) -> DatabaseConfig {
        DatabaseConfig {
            backend,
            seed_users: vec!["alice".to_string()],
            max_connections: 1,
            connection_timeout: 1,
        }
    }

    #[test]
    fn init_refuses_the_memory_store() {
        let err = require_persistent_store(&database(StoreBackend::Memory)).unwrap_err();
        assert!(err.to_string().contains("STORE_BACKEND=postgres"));
        assert!(require_persistent_store(&database(StoreBackend::Postgres)).is_ok());
    }
}
