//! Factory: build `AuthService` from application `Config`.

use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{AuthService, ClaimsParser};

pub fn build_auth_service(config: &Config) -> Arc<AuthService> {
    let auth = AuthService::new(
        config.jwt_secret.as_bytes(),
        config.jwt_algorithm,
        config.auth_issuer.as_deref(),
        config.auth_audience.as_deref(),
        config.access_token_leeway_seconds,
        ClaimsParser::new(config.claims_namespace.clone()),
    );

    Arc::new(auth)
}
