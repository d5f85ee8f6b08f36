/*
 * Responsibility
 * - 登録済みプロジェクトの swagger (OpenAPI) ドキュメント取得
 *   - /swagger/get/all: スコープ内の全プロジェクトの prod_url を並行取得
 *   - /swagger/get/{uuid}/{env}: 1 プロジェクト・1 環境
 */
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    api::v1::extractors::RequireRead,
    error::AppError,
    repos::Environment,
    services::swagger::{SwaggerDoc, fetch_all, fetch_swagger},
    state::AppState,
};

use super::scope::{ensure_access, read_scope};

pub async fn get_all(
    auth: RequireRead,
    State(state): State<AppState>,
) -> Result<Json<Vec<SwaggerDoc>>, AppError> {
    let scope = read_scope(&state, &auth.principal, None).await?;
    let projects = state.directory.list_projects(scope).await?;

    Ok(Json(fetch_all(state.http(), &projects).await))
}

pub async fn get_by_env(
    auth: RequireRead,
    State(state): State<AppState>,
    Path((project_id, env)): Path<(Uuid, String)>,
) -> Result<Json<SwaggerDoc>, AppError> {
    let env: Environment = env
        .parse()
        .map_err(|_| AppError::bad_request("INVALID_ENVIRONMENT", "Invalid environment specified"))?;

    let project = state
        .directory
        .get_project(project_id)
        .await?
        .ok_or(AppError::not_found("Project"))?;
    ensure_access(&auth.principal, &project)?;

    let url = project.url_for(env).ok_or_else(|| {
        AppError::bad_request("MISSING_URL", format!("The '{env}' is null for this project"))
    })?;

    let doc = fetch_swagger(state.http(), &project, url).await?;
    Ok(Json(doc))
}
