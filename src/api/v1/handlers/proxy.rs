/*
 * Responsibility
 * - /swagger-fetch: swagger_url ヘッダの宛先へ 1 回だけ転送する
 * - GET は read、それ以外 (POST/PUT/PATCH/DELETE) は write 権限が必要
 * - 下流の呼び出しは handler の future 内で await する (接続が切れたら一緒に drop)
 */
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
};

use crate::{
    api::v1::extractors::{RequireRead, RequireWrite},
    error::AppError,
    services::forward::ForwardResult,
    state::AppState,
};

pub async fn forward_read(
    _auth: RequireRead,
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ForwardResult, AppError> {
    forward(&state, method, &headers, body).await
}

pub async fn forward_write(
    _auth: RequireWrite,
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ForwardResult, AppError> {
    forward(&state, method, &headers, body).await
}

async fn forward(
    state: &AppState,
    method: Method,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<ForwardResult, AppError> {
    let result = state
        .forwarder
        .forward(method.clone(), headers, body)
        .await
        .map_err(|err| {
            tracing::warn!(method = %method, error = %err, "proxy request rejected");
            AppError::from(err)
        })?;

    match result.upstream_status() {
        Some(status) => tracing::debug!(method = %method, upstream_status = %status, "proxy request done"),
        None => tracing::debug!(method = %method, "proxy request done without upstream status"),
    }
    Ok(result)
}
