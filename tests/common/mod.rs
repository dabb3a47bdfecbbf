#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;

use bento_profile_api::auth::{AuthGuard, Claims};
use bento_profile_api::database::MemoryProfileStore;
use bento_profile_api::server::{self, AppState};
use bento_profile_api::services::{AssetSettings, ProfileService};
use bento_profile_api::storage::MemoryImageUploader;

pub const SECRET: &str = "bento-test-secret";
pub const PIXEL: &str = "data:image/png;base64,iVBORw0KGgo=";

/// In-memory wiring of the whole service, with handles on the fakes
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryProfileStore>,
    pub uploader: Arc<MemoryImageUploader>,
}

impl TestApp {
    pub async fn new(usernames: &[&str]) -> Self {
        let store = Arc::new(MemoryProfileStore::with_users(usernames).await);
        let uploader = Arc::new(MemoryImageUploader::default());
        let profiles = ProfileService::new(store.clone(), uploader.clone(), AssetSettings::default());
        let guard = AuthGuard::from_secret(SECRET).expect("test secret is not empty");

        Self {
            state: AppState::new(Arc::new(profiles), Arc::new(guard)),
            store,
            uploader,
        }
    }

    pub fn router(&self) -> Router {
        server::router(self.state.clone())
    }

    /// Drive one request through the router, returning status and JSON body
    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        self.call_raw(method, uri, token, body.map(|b| b.to_string())).await
    }

    /// Same as `call` with the body sent verbatim as `application/json`
    pub async fn call_raw(&self, method: Method, uri: &str, token: Option<&str>, body: Option<String>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => request.body(Body::empty()),
        }
        .expect("valid request");

        let response = self.router().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("readable body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

fn sign(claims: &Claims) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(SECRET.as_bytes())).expect("token encodes")
}

pub fn token_for(username: &str) -> String {
    sign(&Claims {
        username: username.to_string(),
        sub: None,
        exp: chrono::Utc::now().timestamp() + 3600,
        iat: Some(chrono::Utc::now().timestamp()),
    })
}

pub fn expired_token_for(username: &str) -> String {
    sign(&Claims {
        username: username.to_string(),
        sub: None,
        exp: chrono::Utc::now().timestamp() - 3600,
        iat: None,
    })
}

pub fn token_with_secret(username: &str, secret: &str) -> String {
    let claims = Claims {
        username: username.to_string(),
        sub: None,
        exp: chrono::Utc::now().timestamp() + 3600,
        iat: None,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).expect("token encodes")
}

/// A real listener on a free port, for tests that go through reqwest
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub app: TestApp,
}

impl TestServer {
    pub async fn spawn(usernames: &[&str]) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let app = TestApp::new(usernames).await;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        let router = app.router();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self { port, base_url, app };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}
