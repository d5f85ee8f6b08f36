/*
 * Responsibility
 * - GET /activities/recent?k= (新しい順, 既定 5 件)
 * - GET /statistics (スコープ内の登録プロジェクト数)
 */
use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    api::v1::{
        dto::activity::{ActivityResponse, RecentActivityQuery, StatisticsResponse},
        extractors::RequireRead,
    },
    error::AppError,
    state::AppState,
};

use super::scope::read_scope;

pub async fn recent_activity(
    auth: RequireRead,
    State(state): State<AppState>,
    Query(query): Query<RecentActivityQuery>,
) -> Result<Json<Vec<ActivityResponse>>, AppError> {
    let limit = query
        .limit()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;
    let scope = read_scope(&state, &auth.principal, None).await?;

    let rows = state.directory.recent_activity(scope, limit).await?;
    Ok(Json(rows.into_iter().map(ActivityResponse::from).collect()))
}

pub async fn statistics(
    auth: RequireRead,
    State(state): State<AppState>,
) -> Result<Json<StatisticsResponse>, AppError> {
    let scope = read_scope(&state, &auth.principal, None).await?;
    let registered_projects = state.directory.count_projects(scope).await?;

    Ok(Json(StatisticsResponse {
        registered_projects,
    }))
}
