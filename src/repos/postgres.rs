/*
 * Responsibility
 * - ProjectDirectory の Postgres (SQLx) 実装
 * - teams / projects / activity_logs テーブル (migrations/0001_init.sql)
 */
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::repos::directory::{
    ActivityRecord, ProjectDirectory, ProjectFields, ProjectRecord, TeamRecord, TeamScope,
};
use crate::repos::error::{RepoError, RepoResult};

const PROJECT_COLUMNS: &str = r#"
    p."projectId", p."projectName", p."teamId", t."teamName",
    p."productionUrl", p."preProductionUrl", p."playgroundUrl"
"#;

#[derive(Clone, Debug)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn log_activity(
    tx: &mut Transaction<'_, Postgres>,
    message: String,
    team_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO activity_logs ("logId", message, "loggedAt", "teamId")
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(message)
    .bind(Utc::now())
    .bind(team_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl ProjectDirectory for PgDirectory {
    async fn find_team_by_name(&self, team_name: &str) -> RepoResult<Option<TeamRecord>> {
        let row = sqlx::query_as::<_, TeamRecord>(
            r#"
            SELECT "teamId", "teamName", "createdAt"
            FROM teams
            WHERE lower("teamName") = lower($1)
            "#,
        )
        .bind(team_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create_team(&self, team_name: &str) -> RepoResult<TeamRecord> {
        let mut tx = self.pool.begin().await?;

        let team = sqlx::query_as::<_, TeamRecord>(
            r#"
            INSERT INTO teams ("teamId", "teamName", "createdAt")
            VALUES ($1, $2, $3)
            RETURNING "teamId", "teamName", "createdAt"
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(team_name)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        log_activity(&mut tx, format!("Team '{}' created", team.team_name), team.team_id).await?;
        tx.commit().await?;

        Ok(team)
    }

    async fn list_projects(&self, scope: TeamScope) -> RepoResult<Vec<ProjectRecord>> {
        let sql = format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects p
            JOIN teams t ON t."teamId" = p."teamId"
            WHERE ($1::uuid IS NULL OR p."teamId" = $1)
            ORDER BY p."createdAt" ASC
            "#
        );
        let rows = sqlx::query_as::<_, ProjectRecord>(&sql)
            .bind(scope.team_id())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn get_project(&self, project_id: Uuid) -> RepoResult<Option<ProjectRecord>> {
        let sql = format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects p
            JOIN teams t ON t."teamId" = p."teamId"
            WHERE p."projectId" = $1
            "#
        );
        let row = sqlx::query_as::<_, ProjectRecord>(&sql)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn create_project(
        &self,
        team: &TeamRecord,
        fields: &ProjectFields,
    ) -> RepoResult<ProjectRecord> {
        let project = ProjectRecord::from_fields(Uuid::new_v4(), team, fields);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO projects
                ("projectId", "projectName", "teamId", "productionUrl", "preProductionUrl", "playgroundUrl")
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(project.project_id)
        .bind(&project.project_name)
        .bind(project.team_id)
        .bind(&project.prod_url)
        .bind(&project.pre_prod_url)
        .bind(&project.pg_url)
        .execute(&mut *tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        log_activity(
            &mut tx,
            format!("Project '{}' added", project.project_name),
            team.team_id,
        )
        .await?;
        tx.commit().await?;

        Ok(project)
    }

    async fn update_project(
        &self,
        project_id: Uuid,
        team: &TeamRecord,
        fields: &ProjectFields,
    ) -> RepoResult<Option<ProjectRecord>> {
        let project = ProjectRecord::from_fields(project_id, team, fields);
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE projects
            SET
                "projectName" = $2,
                "teamId" = $3,
                "productionUrl" = $4,
                "preProductionUrl" = $5,
                "playgroundUrl" = $6
            WHERE "projectId" = $1
            "#,
        )
        .bind(project.project_id)
        .bind(&project.project_name)
        .bind(project.team_id)
        .bind(&project.prod_url)
        .bind(&project.pre_prod_url)
        .bind(&project.pg_url)
        .execute(&mut *tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        log_activity(
            &mut tx,
            format!("Project '{}' updated", project.project_name),
            team.team_id,
        )
        .await?;
        tx.commit().await?;

        Ok(Some(project))
    }

    async fn delete_project(&self, project_id: Uuid, actor: &TeamRecord) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted: Option<String> = sqlx::query_scalar(
            r#"
            DELETE FROM projects
            WHERE "projectId" = $1
            RETURNING "projectName"
            "#,
        )
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(project_name) = deleted else {
            return Ok(false);
        };

        log_activity(
            &mut tx,
            format!("Project '{project_name}' deleted"),
            actor.team_id,
        )
        .await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn recent_activity(
        &self,
        scope: TeamScope,
        limit: i64,
    ) -> RepoResult<Vec<ActivityRecord>> {
        let rows = sqlx::query_as::<_, ActivityRecord>(
            r#"
            SELECT "logId", message, "loggedAt", "teamId"
            FROM activity_logs
            WHERE ($1::uuid IS NULL OR "teamId" = $1)
            ORDER BY "loggedAt" DESC
            LIMIT $2
            "#,
        )
        .bind(scope.team_id())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_projects(&self, scope: TeamScope) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM projects
            WHERE ($1::uuid IS NULL OR "teamId" = $1)
            "#,
        )
        .bind(scope.team_id())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
