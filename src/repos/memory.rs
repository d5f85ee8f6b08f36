//! In-memory `ProjectDirectory` for handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::repos::directory::{
    ActivityRecord, ProjectDirectory, ProjectFields, ProjectRecord, TeamRecord, TeamScope,
};
use crate::repos::error::{RepoError, RepoResult};

#[derive(Default)]
struct Tables {
    teams: Vec<TeamRecord>,
    projects: Vec<ProjectRecord>,
    activity: Vec<ActivityRecord>,
}

impl Tables {
    fn log(&mut self, message: String, team_id: Uuid) {
        self.activity.push(ActivityRecord {
            log_id: Uuid::new_v4(),
            message,
            logged_at: Utc::now(),
            team_id: Some(team_id),
        });
    }
}

#[derive(Default)]
pub struct MemoryDirectory {
    tables: Mutex<Tables>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activity_messages(&self) -> Vec<String> {
        let tables = self.tables.lock().unwrap();
        tables.activity.iter().map(|a| a.message.clone()).collect()
    }
}

#[async_trait]
impl ProjectDirectory for MemoryDirectory {
    async fn find_team_by_name(&self, team_name: &str) -> RepoResult<Option<TeamRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .teams
            .iter()
            .find(|t| t.team_name.eq_ignore_ascii_case(team_name))
            .cloned())
    }

    async fn create_team(&self, team_name: &str) -> RepoResult<TeamRecord> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .teams
            .iter()
            .any(|t| t.team_name.eq_ignore_ascii_case(team_name))
        {
            return Err(RepoError::Conflict);
        }
        let team = TeamRecord {
            team_id: Uuid::new_v4(),
            team_name: team_name.to_string(),
            created_at: Utc::now(),
        };
        tables.teams.push(team.clone());
        tables.log(format!("Team '{team_name}' created"), team.team_id);
        Ok(team)
    }

    async fn list_projects(&self, scope: TeamScope) -> RepoResult<Vec<ProjectRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .projects
            .iter()
            .filter(|p| scope.includes(p.team_id))
            .cloned()
            .collect())
    }

    async fn get_project(&self, project_id: Uuid) -> RepoResult<Option<ProjectRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .projects
            .iter()
            .find(|p| p.project_id == project_id)
            .cloned())
    }

    async fn create_project(
        &self,
        team: &TeamRecord,
        fields: &ProjectFields,
    ) -> RepoResult<ProjectRecord> {
        let mut tables = self.tables.lock().unwrap();
        let project = ProjectRecord::from_fields(Uuid::new_v4(), team, fields);
        tables.projects.push(project.clone());
        tables.log(
            format!("Project '{}' added", project.project_name),
            team.team_id,
        );
        Ok(project)
    }

    async fn update_project(
        &self,
        project_id: Uuid,
        team: &TeamRecord,
        fields: &ProjectFields,
    ) -> RepoResult<Option<ProjectRecord>> {
        let mut tables = self.tables.lock().unwrap();
        let updated = ProjectRecord::from_fields(project_id, team, fields);
        let Some(slot) = tables
            .projects
            .iter_mut()
            .find(|p| p.project_id == project_id)
        else {
            return Ok(None);
        };
        *slot = updated.clone();
        tables.log(
            format!("Project '{}' updated", updated.project_name),
            team.team_id,
        );
        Ok(Some(updated))
    }

    async fn delete_project(&self, project_id: Uuid, actor: &TeamRecord) -> RepoResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let Some(idx) = tables
            .projects
            .iter()
            .position(|p| p.project_id == project_id)
        else {
            return Ok(false);
        };
        let removed = tables.projects.remove(idx);
        tables.log(
            format!("Project '{}' deleted", removed.project_name),
            actor.team_id,
        );
        Ok(true)
    }

    async fn recent_activity(
        &self,
        scope: TeamScope,
        limit: i64,
    ) -> RepoResult<Vec<ActivityRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .activity
            .iter()
            .rev()
            .filter(|a| a.team_id.is_some_and(|id| scope.includes(id)))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn count_projects(&self, scope: TeamScope) -> RepoResult<i64> {
        let tables = self.tables.lock().unwrap();
        let count = tables
            .projects
            .iter()
            .filter(|p| scope.includes(p.team_id))
            .count();
        Ok(count as i64)
    }
}
