use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::AuthGuard;
use crate::config::{AppConfig, AssetBackend, DatabaseConfig, StorageConfig, StoreBackend};
use crate::database::{DatabaseManager, MemoryProfileStore, PgProfileStore, ProfileStore};
use crate::handlers::{profile, system};
use crate::services::{AssetSettings, ProfileService};
use crate::storage::{HttpImageUploader, ImageAssetUploader, LocalImageUploader, MemoryImageUploader};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<ProfileService>,
    pub guard: Arc<AuthGuard>,
}

impl FromRef<AppState> for Arc<AuthGuard> {
    fn from_ref(state: &AppState) -> Self {
        state.guard.clone()
    }
}

impl AppState {
    pub fn new(profiles: Arc<ProfileService>, guard: Arc<AuthGuard>) -> Self {
        Self { profiles, guard }
    }

    /// Wire store, uploader and guard from configuration
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let guard = AuthGuard::from_secret(&config.security.jwt_secret).context("JWT_SECRET must be set")?;
        let store = build_store(&config.database).await?;
        let uploader = build_uploader(&config.storage)?;
        let profiles = ProfileService::new(store, uploader, AssetSettings::from(&config.storage));

        Ok(Self::new(Arc::new(profiles), Arc::new(guard)))
    }
}

pub async fn build_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn ProfileStore>> {
    match config.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory profile store, data is lost on restart");
            let store = MemoryProfileStore::new();
            for username in &config.seed_users {
                store.insert_user(username).await;
            }
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let db = Arc::new(DatabaseManager::new(config.clone()));
            let store = PgProfileStore::new(db);
            store.ensure_schema().await.context("failed to prepare profile schema")?;
            Ok(Arc::new(store))
        }
    }
}

pub fn build_uploader(config: &StorageConfig) -> anyhow::Result<Arc<dyn ImageAssetUploader>> {
    let uploader: Arc<dyn ImageAssetUploader> = match config.backend {
        AssetBackend::Local => {
            info!("Storing assets under {}", config.local_root.display());
            Arc::new(LocalImageUploader::new(config.local_root.clone(), config.public_base_url.clone()))
        }
        AssetBackend::Http => {
            let endpoint = config
                .http_endpoint
                .clone()
                .context("ASSET_HTTP_ENDPOINT must be set for the http asset backend")?;
            Arc::new(HttpImageUploader::new(endpoint, config.http_api_key.clone()))
        }
        AssetBackend::Memory if config.public_base_url.is_empty() => Arc::new(MemoryImageUploader::default()),
        AssetBackend::Memory => Arc::new(MemoryImageUploader::new(config.public_base_url.clone())),
    };
    Ok(uploader)
}

/// Routes only, no global layers
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(profile_routes())
        .with_state(state)
}

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/:username", get(profile::get_profile).put(profile::replace_blocks))
        .route("/profile/:username/block", post(profile::add_block).put(profile::update_block))
        .route("/profile/:username/block/:object_id", delete(profile::delete_block))
        .route("/profile/:username/displayname", patch(profile::update_display_name))
        .route("/profile/:username/bio", patch(profile::update_bio))
        .route("/profile/:username/avatar", post(profile::upload_avatar))
}

/// Full application: routes plus body limit, local assets, CORS and tracing
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut app = router(state).layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.storage.backend == AssetBackend::Local {
        app = app.nest_service("/assets", ServeDir::new(&config.storage.local_root));
    }
    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    app
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
