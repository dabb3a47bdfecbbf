use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Usernames registered at startup by the memory store
    pub seed_users: Vec<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetBackend {
    Local,
    Http,
    Memory,
}

/// What happens to the previous avatar asset when a new one is uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvatarPolicy {
    /// Fixed object name `avatar`; the asset store overwrites by name, nothing is deleted
    Overwrite,
    /// Unique object name per upload; the prior asset is deleted once the profile is saved
    ReplaceAndDelete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: AssetBackend,
    pub namespace: String,
    pub local_root: PathBuf,
    pub public_base_url: String,
    pub http_endpoint: Option<String>,
    pub http_api_key: Option<String>,
    pub upload_timeout_secs: u64,
    pub avatar_policy: AvatarPolicy,
}

impl StorageConfig {
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Some(port) = env::var("BENTO_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Database overrides
        if let Ok(v) = env::var("STORE_BACKEND") {
            self.database.backend = match v.as_str() {
                "memory" => StoreBackend::Memory,
                "postgres" => StoreBackend::Postgres,
                _ => self.database.backend,
            };
        }
        if let Ok(v) = env::var("STORE_SEED_USERS") {
            self.database.seed_users = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Storage overrides
        if let Ok(v) = env::var("ASSET_BACKEND") {
            self.storage.backend = match v.as_str() {
                "local" => AssetBackend::Local,
                "http" => AssetBackend::Http,
                "memory" => AssetBackend::Memory,
                _ => self.storage.backend,
            };
        }
        if let Ok(v) = env::var("ASSET_NAMESPACE") {
            self.storage.namespace = v;
        }
        if let Ok(v) = env::var("ASSET_LOCAL_ROOT") {
            self.storage.local_root = PathBuf::from(v);
        }
        if let Ok(v) = env::var("ASSET_PUBLIC_BASE_URL") {
            self.storage.public_base_url = v;
        }
        if let Ok(v) = env::var("ASSET_HTTP_ENDPOINT") {
            self.storage.http_endpoint = Some(v);
        }
        if let Ok(v) = env::var("ASSET_HTTP_API_KEY") {
            self.storage.http_api_key = Some(v);
        }
        if let Ok(v) = env::var("ASSET_UPLOAD_TIMEOUT_SECS") {
            self.storage.upload_timeout_secs = v.parse().unwrap_or(self.storage.upload_timeout_secs);
        }
        if let Ok(v) = env::var("ASSET_AVATAR_POLICY") {
            self.storage.avatar_policy = match v.as_str() {
                "overwrite" => AvatarPolicy::Overwrite,
                "replace_and_delete" => AvatarPolicy::ReplaceAndDelete,
                _ => self.storage.avatar_policy,
            };
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                seed_users: Vec::new(),
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: "bento-development-secret".to_string(),
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            storage: StorageConfig {
                backend: AssetBackend::Local,
                namespace: "bento".to_string(),
                local_root: PathBuf::from("./assets"),
                public_base_url: "http://localhost:3000/assets".to_string(),
                http_endpoint: None,
                http_api_key: None,
                upload_timeout_secs: 30,
                avatar_policy: AvatarPolicy::Overwrite,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 8 * 1024 * 1024, // 8MB
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                seed_users: Vec::new(),
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["https://staging.bento.example.com".to_string()],
            },
            storage: StorageConfig {
                backend: AssetBackend::Http,
                namespace: "bento".to_string(),
                local_root: PathBuf::from("./assets"),
                public_base_url: String::new(),
                http_endpoint: None,
                http_api_key: None,
                upload_timeout_secs: 20,
                avatar_policy: AvatarPolicy::Overwrite,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                seed_users: Vec::new(),
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["https://bento.example.com".to_string()],
            },
            storage: StorageConfig {
                backend: AssetBackend::Http,
                namespace: "bento".to_string(),
                local_root: PathBuf::from("./assets"),
                public_base_url: String::new(),
                http_endpoint: None,
                http_api_key: None,
                upload_timeout_secs: 15,
                avatar_policy: AvatarPolicy::Overwrite,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
