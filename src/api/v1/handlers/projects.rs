/*
 * Responsibility
 * - /projects 系 CRUD handler
 * - DTO validation → URL 疎通確認 (JSON を返すこと) → ProjectDirectory
 * - 書き込みは directory 側で activity log も残る
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::projects::{ListProjectsQuery, ProjectRequest, ProjectResponse},
        extractors::{RequireRead, RequireWrite},
    },
    error::AppError,
    repos::ProjectFields,
    services::swagger::{ProbeError, probe_json},
    state::AppState,
};

use super::scope::{acting_team, ensure_access, own_team, read_scope};

// Each URL must answer 2xx with a JSON body before it is stored.
async fn probe_urls(state: &AppState, fields: &ProjectFields) -> Result<(), AppError> {
    for (env, url) in fields.urls() {
        match probe_json(state.http(), url).await {
            Ok(()) => {}
            Err(ProbeError::Unreachable) => {
                return Err(AppError::bad_request(
                    "INVALID_URL",
                    format!("Invalid {} url", env.label()),
                ));
            }
            Err(ProbeError::NotJson) => {
                return Err(AppError::bad_request(
                    "INVALID_URL",
                    format!("Invalid JSON response from {} url", env.label()),
                ));
            }
        }
    }
    Ok(())
}

fn validated(req: &ProjectRequest) -> Result<ProjectFields, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))
}

pub async fn list_projects(
    auth: RequireRead,
    State(state): State<AppState>,
    Query(query): Query<ListProjectsQuery>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    let scope = read_scope(&state, &auth.principal, query.team_name.as_deref()).await?;
    let rows = state.directory.list_projects(scope).await?;

    Ok(Json(rows.into_iter().map(ProjectResponse::from).collect()))
}

pub async fn get_project(
    auth: RequireRead,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectResponse>, AppError> {
    let project = state
        .directory
        .get_project(project_id)
        .await?
        .ok_or(AppError::not_found("Project"))?;
    ensure_access(&auth.principal, &project)?;

    Ok(Json(project.into()))
}

pub async fn create_project(
    auth: RequireWrite,
    State(state): State<AppState>,
    Json(req): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), AppError> {
    let fields = validated(&req)?;
    probe_urls(&state, &fields).await?;

    let team = acting_team(&state, &auth.principal, req.requested_team()).await?;
    let project = state.directory.create_project(&team, &fields).await?;

    tracing::info!(project = %project.project_id, team = %team.team_name, "project added");
    Ok((StatusCode::CREATED, Json(project.into())))
}

pub async fn update_project(
    auth: RequireWrite,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<ProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    let fields = validated(&req)?;

    let existing = state
        .directory
        .get_project(project_id)
        .await?
        .ok_or(AppError::not_found("Project"))?;
    ensure_access(&auth.principal, &existing)?;

    probe_urls(&state, &fields).await?;

    let team = acting_team(&state, &auth.principal, req.requested_team()).await?;
    let project = state
        .directory
        .update_project(project_id, &team, &fields)
        .await?
        .ok_or(AppError::not_found("Project"))?;

    tracing::info!(project = %project.project_id, team = %team.team_name, "project updated");
    Ok(Json(project.into()))
}

pub async fn delete_project(
    auth: RequireWrite,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let project = state
        .directory
        .get_project(project_id)
        .await?
        .ok_or(AppError::not_found("Project"))?;

    let actor = own_team(&state, &auth.principal).await?;
    if !auth.principal.is_admin() && project.team_id != actor.team_id {
        return Err(AppError::forbidden(
            "You do not have permission to delete this project",
        ));
    }

    if !state.directory.delete_project(project_id, &actor).await? {
        return Err(AppError::not_found("Project"));
    }

    tracing::info!(project = %project_id, team = %actor.team_name, "project deleted");
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}
