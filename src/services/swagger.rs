//! Fetching OpenAPI documents of registered projects.
//!
//! Unlike the forwarder these are plain GETs to stored URLs; no header rewrite.

use axum::http::StatusCode;
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::repos::{Environment, ProjectRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwaggerDoc {
    pub service: String,
    pub id: Uuid,
    /// `None` when the upstream answered with something that is not JSON.
    pub swagger: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SwaggerFetchError {
    #[error("Failed to fetch Swagger for project '{project}' from {url}")]
    Upstream {
        status: StatusCode,
        project: String,
        url: String,
    },
    #[error("HTTP request failed for project '{project}': {reason}")]
    Transport { project: String, reason: String },
}

pub async fn fetch_swagger(
    client: &reqwest::Client,
    project: &ProjectRecord,
    url: &str,
) -> Result<SwaggerDoc, SwaggerFetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SwaggerFetchError::Transport {
            project: project.project_name.clone(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SwaggerFetchError::Upstream {
            status,
            project: project.project_name.clone(),
            url: url.to_string(),
        });
    }

    let swagger = match response.json::<Value>().await {
        Ok(doc) => Some(doc),
        Err(e) if e.is_decode() => None,
        Err(e) => {
            return Err(SwaggerFetchError::Transport {
                project: project.project_name.clone(),
                reason: e.to_string(),
            });
        }
    };

    Ok(SwaggerDoc {
        service: project.project_name.clone(),
        id: project.project_id,
        swagger,
        error: None,
    })
}

/// Fetches the production document of every project concurrently.
///
/// The output order equals the input order (projects without a production
/// URL are skipped). A failing project is reported in place instead of
/// failing the whole list. All calls run inside the caller's task.
pub async fn fetch_all(client: &reqwest::Client, projects: &[ProjectRecord]) -> Vec<SwaggerDoc> {
    let tasks = projects.iter().filter_map(|project| {
        let url = project.url_for(Environment::Production)?;
        Some(async move {
            match fetch_swagger(client, project, url).await {
                Ok(doc) => doc,
                Err(err) => {
                    warn!(project = %project.project_name, error = %err, "swagger fetch failed");
                    SwaggerDoc {
                        service: project.project_name.clone(),
                        id: project.project_id,
                        swagger: None,
                        error: Some(err.to_string()),
                    }
                }
            }
        })
    });

    join_all(tasks).await
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("unreachable or non-2xx")]
    Unreachable,
    #[error("response is not JSON")]
    NotJson,
}

/// One GET that must answer 2xx with a JSON body.
pub async fn probe_json(client: &reqwest::Client, url: &str) -> Result<(), ProbeError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|_| ProbeError::Unreachable)?;
    if !response.status().is_success() {
        return Err(ProbeError::Unreachable);
    }
    response
        .json::<Value>()
        .await
        .map(|_| ())
        .map_err(|e| {
            if e.is_decode() {
                ProbeError::NotJson
            } else {
                ProbeError::Unreachable
            }
        })
}
