//! access token (HMAC JWT) 検証 → Principal を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` 以外は 403 (Unauthenticated)
//! - 署名/exp (設定があれば iss/aud) は AuthService 側で検証
//! - `roles.<namespace>` の grants から active team を決め、Principal として格納
//! - capability の判定はここではしない (extractor 側の PermissionGate)

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::Principal;
use crate::state::AppState;

/// 保護対象の router に認証を掛ける。`/health` はこの外側に置く。
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    // route_layer: マッチしたルートだけに掛ける (未定義パスは 404 のまま)
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let principal = authenticate(&state, &req)?;

    if let Principal::Active(team) = &principal {
        tracing::debug!(team = %team.team, admin = team.is_admin(), "request authenticated");
    }

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

fn authenticate(state: &AppState, req: &Request<Body>) -> Result<Principal, AppError> {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthenticated("Not authenticated"))?;

    let token = bearer_token(auth)
        .ok_or_else(|| AppError::unauthenticated("Invalid authentication scheme."))?;

    state.auth.resolve_principal(token).map_err(|err| {
        tracing::warn!(error = %err, "access token verification failed");
        AppError::from(err)
    })
}

// scheme は大文字小文字を区別しない (RFC 7235)
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
