/*
 * Responsibility
 * - Authorized<R> の定義と FromRequestParts 実装
 * - Principal が無い (middleware 未設定) 場合は Unauthenticated、
 *   capability 不足は Denied → 403 に変換
 */
use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::services::auth::{Capability, PermissionGate, Principal, TeamPrincipal};
use crate::state::AppState;

/// Capability a route requires; implemented by the tag types.
pub trait Requirement: Send + Sync {
    const CAPABILITY: Capability;
}

/// The active team, already checked against `R::CAPABILITY`.
pub struct Authorized<R> {
    pub principal: TeamPrincipal,
    _marker: PhantomData<R>,
}

impl<R> Authorized<R> {
    fn new(principal: TeamPrincipal) -> Self {
        Self {
            principal,
            _marker: PhantomData,
        }
    }
}

impl<R> FromRequestParts<AppState> for Authorized<R>
where
    R: Requirement,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .ok_or_else(|| AppError::unauthenticated("Not authenticated"))?;

        let team = PermissionGate::authorize(principal, R::CAPABILITY).map_err(|denied| {
            tracing::warn!(
                required = %denied.required,
                method = %parts.method,
                path = %parts.uri.path(),
                "permission denied"
            );
            AppError::from(denied)
        })?;

        Ok(Self::new(team.clone()))
    }
}

impl<R> std::fmt::Debug for Authorized<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorized")
            .field("principal", &self.principal)
            .finish()
    }
}
