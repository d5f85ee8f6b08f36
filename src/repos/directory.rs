/*
 * Responsibility
 * - ProjectDirectory: プロジェクト URL レジストリの読み書きインターフェース
 * - 書き込み系は必ず activity log を同じトランザクションで残す
 */
use std::{fmt, str::FromStr};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TeamRecord {
    #[sqlx(rename = "teamId")]
    pub team_id: Uuid,
    #[sqlx(rename = "teamName")]
    pub team_name: String,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProjectRecord {
    #[sqlx(rename = "projectId")]
    pub project_id: Uuid,
    #[sqlx(rename = "projectName")]
    pub project_name: String,
    #[sqlx(rename = "teamId")]
    pub team_id: Uuid,
    #[sqlx(rename = "teamName")]
    pub team_name: String,
    #[sqlx(rename = "productionUrl")]
    pub prod_url: Option<String>,
    #[sqlx(rename = "preProductionUrl")]
    pub pre_prod_url: Option<String>,
    #[sqlx(rename = "playgroundUrl")]
    pub pg_url: Option<String>,
}

impl ProjectRecord {
    pub fn url_for(&self, env: Environment) -> Option<&str> {
        match env {
            Environment::Production => self.prod_url.as_deref(),
            Environment::PreProduction => self.pre_prod_url.as_deref(),
            Environment::Playground => self.pg_url.as_deref(),
        }
    }

    pub fn from_fields(project_id: Uuid, team: &TeamRecord, fields: &ProjectFields) -> Self {
        Self {
            project_id,
            project_name: fields.project_name.clone(),
            team_id: team.team_id,
            team_name: team.team_name.clone(),
            prod_url: fields.prod_url.clone(),
            pre_prod_url: fields.pre_prod_url.clone(),
            pg_url: fields.pg_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ActivityRecord {
    #[sqlx(rename = "logId")]
    pub log_id: Uuid,
    pub message: String,
    #[sqlx(rename = "loggedAt")]
    pub logged_at: DateTime<Utc>,
    #[sqlx(rename = "teamId")]
    pub team_id: Option<Uuid>,
}

/// Validated, writable project attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFields {
    pub project_name: String,
    pub prod_url: Option<String>,
    pub pre_prod_url: Option<String>,
    pub pg_url: Option<String>,
}

impl ProjectFields {
    pub fn urls(&self) -> impl Iterator<Item = (Environment, &str)> {
        Environment::ALL
            .into_iter()
            .filter_map(|env| self.url(env).map(|url| (env, url)))
    }

    fn url(&self, env: Environment) -> Option<&str> {
        match env {
            Environment::Production => self.prod_url.as_deref(),
            Environment::PreProduction => self.pre_prod_url.as_deref(),
            Environment::Playground => self.pg_url.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    PreProduction,
    Playground,
}

impl Environment {
    pub const ALL: [Environment; 3] = [
        Environment::Production,
        Environment::PreProduction,
        Environment::Playground,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Production => "prod_url",
            Self::PreProduction => "pre_prod_url",
            Self::Playground => "pg_url",
        }
    }

    /// Human label used in validation messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Production => "prod",
            Self::PreProduction => "pre prod",
            Self::Playground => "pg",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|env| env.key() == s).ok_or(())
    }
}

/// Which teams an operation may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamScope {
    All,
    Team(Uuid),
}

impl TeamScope {
    pub fn team_id(&self) -> Option<Uuid> {
        match self {
            Self::All => None,
            Self::Team(id) => Some(*id),
        }
    }

    #[cfg(test)]
    pub fn includes(&self, team_id: Uuid) -> bool {
        self.team_id().is_none_or(|id| id == team_id)
    }
}

#[async_trait]
pub trait ProjectDirectory: Send + Sync + 'static {
    // Case-insensitive lookup.
    async fn find_team_by_name(&self, team_name: &str) -> RepoResult<Option<TeamRecord>>;

    // Duplicate names → `RepoError::Conflict`.
    async fn create_team(&self, team_name: &str) -> RepoResult<TeamRecord>;

    async fn list_projects(&self, scope: TeamScope) -> RepoResult<Vec<ProjectRecord>>;

    async fn get_project(&self, project_id: Uuid) -> RepoResult<Option<ProjectRecord>>;

    async fn create_project(
        &self,
        team: &TeamRecord,
        fields: &ProjectFields,
    ) -> RepoResult<ProjectRecord>;

    // `None` when the project does not exist.
    async fn update_project(
        &self,
        project_id: Uuid,
        team: &TeamRecord,
        fields: &ProjectFields,
    ) -> RepoResult<Option<ProjectRecord>>;

    // The activity entry is attributed to `actor`.
    async fn delete_project(&self, project_id: Uuid, actor: &TeamRecord) -> RepoResult<bool>;

    // Newest first.
    async fn recent_activity(
        &self,
        scope: TeamScope,
        limit: i64,
    ) -> RepoResult<Vec<ActivityRecord>>;

    async fn count_projects(&self, scope: TeamScope) -> RepoResult<i64>;
}
