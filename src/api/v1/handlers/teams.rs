/*
 * Responsibility
 * - POST /teams (admin のみ)
 * - 重複名は 409
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::teams::{CreateTeamRequest, TeamResponse},
        extractors::RequireAdmin,
    },
    error::AppError,
    repos::RepoError,
    state::AppState,
};

pub async fn create_team(
    _auth: RequireAdmin,
    State(state): State<AppState>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), AppError> {
    let team_name = req
        .validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    let team = state
        .directory
        .create_team(team_name)
        .await
        .map_err(|err| match err {
            RepoError::Conflict => {
                AppError::conflict(format!("Team with name '{team_name}' already exists"))
            }
            other => AppError::from(other),
        })?;

    tracing::info!(team = %team.team_name, "team created");
    Ok((StatusCode::CREATED, Json(team.into())))
}
