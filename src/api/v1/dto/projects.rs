/*
 * Responsibility
 * - Projects の request/response DTO
 * - validate() で空白 URL の除去 / scheme 補完 → ProjectFields へ変換
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::{ProjectFields, ProjectRecord};

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub projectname: String,
    // admin のみ有効。それ以外は token の active team が使われる
    pub team_name: Option<String>,
    pub prod_url: Option<String>,
    pub pre_prod_url: Option<String>,
    pub pg_url: Option<String>,
}

impl ProjectRequest {
    pub fn validate(&self) -> Result<ProjectFields, &'static str> {
        let project_name = self.projectname.trim();
        if project_name.is_empty() {
            return Err("projectname is required");
        }

        let fields = ProjectFields {
            project_name: project_name.to_string(),
            prod_url: normalize_url(self.prod_url.as_deref()),
            pre_prod_url: normalize_url(self.pre_prod_url.as_deref()),
            pg_url: normalize_url(self.pg_url.as_deref()),
        };

        if fields.urls().next().is_none() {
            return Err("At least one URL must be provided");
        }

        Ok(fields)
    }

    pub fn requested_team(&self) -> Option<&str> {
        self.team_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Blank → absent; bare `host[:port]/path` → `http://...`.
fn normalize_url(raw: Option<&str>) -> Option<String> {
    let url = raw?.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url.to_string())
    } else {
        Some(format!("http://{url}"))
    }
}

#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    pub team_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub uuid: Uuid,
    pub projectname: String,
    pub team_name: String,
    pub prod_url: Option<String>,
    pub pre_prod_url: Option<String>,
    pub pg_url: Option<String>,
}

impl From<ProjectRecord> for ProjectResponse {
    fn from(p: ProjectRecord) -> Self {
        Self {
            uuid: p.project_id,
            projectname: p.project_name,
            team_name: p.team_name,
            prod_url: p.prod_url,
            pre_prod_url: p.pre_prod_url,
            pg_url: p.pg_url,
        }
    }
}
