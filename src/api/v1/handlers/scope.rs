/*
 * Responsibility
 * - チームスコープの解決
 *   - admin: 全チーム (または指定チーム) を対象にできる
 *   - それ以外: 常に token の active team (大文字小文字を無視して照合)
 * - 他チームのプロジェクトへのアクセス判定
 */
use crate::error::AppError;
use crate::repos::{ProjectRecord, TeamRecord, TeamScope};
use crate::services::auth::TeamPrincipal;
use crate::state::AppState;

pub(super) async fn named_team(state: &AppState, team_name: &str) -> Result<TeamRecord, AppError> {
    state
        .directory
        .find_team_by_name(team_name)
        .await?
        .ok_or_else(|| AppError::bad_request("INVALID_TEAM", "Invalid team name"))
}

pub(super) async fn own_team(
    state: &AppState,
    principal: &TeamPrincipal,
) -> Result<TeamRecord, AppError> {
    named_team(state, &principal.team).await
}

/// Team a write is attributed to.
pub(super) async fn acting_team(
    state: &AppState,
    principal: &TeamPrincipal,
    requested: Option<&str>,
) -> Result<TeamRecord, AppError> {
    match requested {
        Some(name) if principal.is_admin() => named_team(state, name).await,
        _ => own_team(state, principal).await,
    }
}

/// Visibility for list/aggregate reads.
pub(super) async fn read_scope(
    state: &AppState,
    principal: &TeamPrincipal,
    requested: Option<&str>,
) -> Result<TeamScope, AppError> {
    let requested = requested.map(str::trim).filter(|s| !s.is_empty());
    if principal.is_admin() {
        return match requested {
            Some(name) => Ok(TeamScope::Team(named_team(state, name).await?.team_id)),
            None => Ok(TeamScope::All),
        };
    }
    Ok(TeamScope::Team(own_team(state, principal).await?.team_id))
}

pub(super) fn ensure_access(
    principal: &TeamPrincipal,
    project: &ProjectRecord,
) -> Result<(), AppError> {
    if principal.is_admin() || principal.belongs_to(&project.team_name) {
        Ok(())
    } else {
        tracing::warn!(
            team = %principal.team,
            project = %project.project_id,
            "cross-team project access denied"
        );
        Err(AppError::forbidden(
            "Your team does not have access to this project",
        ))
    }
}
