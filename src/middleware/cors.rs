//! CORS for the browser dashboard.
//!
//! The dashboard calls `/swagger-fetch` with the downstream target in the
//! `swagger_url` header, so that header must survive preflight. The request id
//! is exposed so the dashboard can quote it when reporting a failed proxy call.
//!
//! Development allows any origin; production allows only `CORS_ALLOWED_ORIGINS`
//! (exact match, empty list allows nothing). Credentials are never allowed.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AppEnv;
use crate::middleware::http::REQUEST_ID_HEADER;
use crate::services::forward::TARGET_HEADER;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(600);

pub fn apply(router: Router, app_env: AppEnv, allowed_origins: &[String]) -> Router {
    router.layer(policy(app_env, allowed_origins))
}

fn policy(app_env: AppEnv, allowed_origins: &[String]) -> CorsLayer {
    let base = if app_env.is_production() {
        let allowed: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        CorsLayer::new().allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _req| allowed.iter().any(|v| v == origin),
        ))
    } else {
        CorsLayer::new().allow_origin(Any)
    };

    base.allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        HeaderName::from_static(REQUEST_ID_HEADER),
        HeaderName::from_static(TARGET_HEADER),
    ])
    .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
    .max_age(PREFLIGHT_MAX_AGE)
}
