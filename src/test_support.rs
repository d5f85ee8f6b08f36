//! Shared fixtures for unit and router tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;

use crate::repos::memory::MemoryDirectory;
use crate::services::auth::{AuthService, ClaimsParser};
use crate::services::forward::Forwarder;
use crate::state::AppState;

pub const SECRET: &[u8] = b"test-secret-with-at-least-32-bytes!!";

pub fn auth_service() -> AuthService {
    AuthService::new(
        SECRET,
        Algorithm::HS256,
        None,
        None,
        0,
        ClaimsParser::new("flipdocs"),
    )
}

/// HS256 token in the legacy layout: grants live under `roles.flipdocs`.
pub fn mint_token(secret: &[u8], grants: Value, ttl_secs: i64) -> String {
    let claims = json!({
        "sub": "user-1",
        "exp": chrono::Utc::now().timestamp() + ttl_secs,
        "roles": { "flipdocs": grants },
    });
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

/// `{"flipdocs.<team>.<cap>": true, ...}`
pub fn team_grants(team: &str, caps: &[&str]) -> Value {
    let mut map = Map::new();
    for cap in caps {
        map.insert(format!("flipdocs.{team}.{cap}"), Value::Bool(true));
    }
    Value::Object(map)
}

/// Ready-to-use `authorization` header value.
pub fn bearer(team: &str, caps: &[&str]) -> String {
    format!("Bearer {}", mint_token(SECRET, team_grants(team, caps), 600))
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .no_proxy()
        .build()
        .unwrap()
}

pub fn test_state(directory: Arc<MemoryDirectory>) -> AppState {
    AppState::new(
        directory,
        Arc::new(auth_service()),
        Forwarder::new(Duration::from_secs(5)).unwrap(),
    )
}

/// Serves `router` on an ephemeral loopback port for the rest of the test.
pub async fn spawn_upstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A loopback port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
