/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - directory: ProjectDirectory (Postgres / テスト時はインメモリ)
 *   - auth: AuthService (JWT 検証 + claims → Principal)
 *   - forwarder: 下流 API への転送 (reqwest::Client を共有)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::ProjectDirectory;
use crate::services::{auth::AuthService, forward::Forwarder};

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn ProjectDirectory>,
    pub auth: Arc<AuthService>,
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(
        directory: Arc<dyn ProjectDirectory>,
        auth: Arc<AuthService>,
        forwarder: Forwarder,
    ) -> Self {
        Self {
            directory,
            auth,
            forwarder,
        }
    }

    /// Shared pool for plain GETs (swagger documents, URL probes).
    pub fn http(&self) -> &reqwest::Client {
        self.forwarder.client()
    }
}
