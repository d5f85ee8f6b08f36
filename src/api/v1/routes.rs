/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は公開、それ以外は Bearer 検証 (middleware::auth::access) の内側
 * - capability (read/write/admin) は各 handler の extractor で要求する
 */
use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::api::v1::handlers::{
    activity::{recent_activity, statistics},
    health::health,
    projects::{create_project, delete_project, get_project, list_projects, update_project},
    proxy::{forward_read, forward_write},
    swagger,
    teams::create_team,
};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/swagger-fetch",
            get(forward_read)
                .post(forward_write)
                .put(forward_write)
                .patch(forward_write)
                .delete(forward_write),
        )
        .route("/swagger/get/all", get(swagger::get_all))
        .route("/swagger/get/{project_id}/{env}", get(swagger::get_by_env))
        .route("/projects/get/all", get(list_projects))
        .route("/projects/add", post(create_project))
        .route("/projects/update/{project_id}", put(update_project))
        .route("/projects/delete/{project_id}", delete(delete_project))
        .route("/projects/{project_id}", get(get_project))
        .route("/teams", post(create_team))
        .route("/activities/recent", get(recent_activity))
        .route("/statistics", get(statistics));

    let protected = middleware::auth::access::apply(protected, state);

    Router::new().route("/health", get(health)).merge(protected)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Json,
        body::Body,
        http::{Method, Request, StatusCode, header},
        routing::any,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::app::api_router;
    use crate::repos::{ProjectDirectory, ProjectFields, memory::MemoryDirectory};
    use crate::test_support::{bearer, spawn_upstream, test_state};

    use super::*;

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn setup() -> (Router, Arc<MemoryDirectory>) {
        let directory = Arc::new(MemoryDirectory::new());
        (api_router(test_state(directory.clone())), directory)
    }

    /// Upstream standing in for a registered service.
    fn docs_upstream() -> Router {
        Router::new()
            .route(
                "/v3/api-docs",
                any(|| async { Json(json!({ "openapi": "3.0.1", "paths": {} })) }),
            )
            .route("/html", get(|| async { "<html>swagger-ui</html>" }))
    }

    fn fields(name: &str, prod_url: &str) -> ProjectFields {
        ProjectFields {
            project_name: name.into(),
            prod_url: Some(prod_url.into()),
            pre_prod_url: None,
            pg_url: None,
        }
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _) = setup();

        let (status, body) = send(&app, request(Method::GET, "/api/v1/health", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn protected_routes_require_bearer_token() {
        let (app, _) = setup();

        let (status, body) = send(&app, request(Method::GET, "/api/v1/statistics", None, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "UNAUTHENTICATED");

        let (status, body) = send(
            &app,
            request(Method::GET, "/api/v1/statistics", Some("Basic dXNlcjpwYXNz"), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "Invalid authentication scheme.");

        let (status, body) = send(
            &app,
            request(Method::GET, "/api/v1/statistics", Some("Bearer not-a-jwt"), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "Invalid token or expired token.");
    }

    #[tokio::test]
    async fn token_without_true_capability_is_denied() {
        let (app, _) = setup();
        let token = bearer("alpha", &[]);

        let (status, body) = send(&app, request(Method::GET, "/api/v1/statistics", Some(&token), None)).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "Read permission required");
    }

    #[tokio::test]
    async fn proxy_requires_target_header_for_every_method() {
        let (app, _) = setup();
        let token = bearer("alpha", &["read", "write"]);

        for method in [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            let (status, body) = send(
                &app,
                request(method.clone(), "/api/v1/swagger-fetch", Some(&token), None),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{method}");
            assert_eq!(body["error"]["message"], "Missing 'swagger_url' in headers", "{method}");
        }
    }

    #[tokio::test]
    async fn read_only_token_cannot_write_through_proxy() {
        let (app, _) = setup();
        let token = bearer("alpha", &["read"]);
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/swagger-fetch")
            .header(header::AUTHORIZATION, &token)
            .header("swagger_url", "http://10.0.0.1/api/events")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, req).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["message"], "Write permission required");
    }

    #[tokio::test]
    async fn proxy_forwards_to_target() {
        let (app, _) = setup();
        let upstream = spawn_upstream(docs_upstream()).await;
        let token = bearer("alpha", &["read"]);
        let req = Request::builder()
            .method(Method::GET)
            .uri("/api/v1/swagger-fetch")
            .header(header::AUTHORIZATION, &token)
            .header("swagger_url", format!("http://{upstream}/v3/api-docs"))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["openapi"], "3.0.1");
    }

    #[tokio::test]
    async fn project_lifecycle_is_logged() {
        let (app, directory) = setup();
        let upstream = spawn_upstream(docs_upstream()).await;
        let admin = bearer("alpha", &["admin"]);
        let writer = bearer("alpha", &["read", "write"]);

        let (status, team) = send(
            &app,
            request(Method::POST, "/api/v1/teams", Some(&admin), Some(json!({ "team_name": "alpha" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(team["team_name"], "alpha");

        let (status, created) = send(
            &app,
            request(
                Method::POST,
                "/api/v1/projects/add",
                Some(&writer),
                Some(json!({
                    "projectname": "billing",
                    "prod_url": format!("{upstream}/v3/api-docs"),
                    "pg_url": "  ",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["team_name"], "alpha");
        assert_eq!(created["prod_url"], format!("http://{upstream}/v3/api-docs"));
        assert_eq!(created["pg_url"], Value::Null);
        let id = created["uuid"].as_str().unwrap().to_string();

        let (status, listed) = send(
            &app,
            request(Method::GET, "/api/v1/projects/get/all", Some(&writer), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (_, stats) = send(&app, request(Method::GET, "/api/v1/statistics", Some(&writer), None)).await;
        assert_eq!(stats, json!({ "registered_projects": 1 }));

        let (status, doc) = send(
            &app,
            request(Method::GET, &format!("/api/v1/swagger/get/{id}/prod_url"), Some(&writer), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(doc["service"], "billing");
        assert_eq!(doc["swagger"]["openapi"], "3.0.1");

        let (status, _) = send(
            &app,
            request(Method::DELETE, &format!("/api/v1/projects/delete/{id}"), Some(&writer), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, recent) = send(
            &app,
            request(Method::GET, "/api/v1/activities/recent?k=2", Some(&writer), None),
        )
        .await;
        let messages: Vec<_> = recent
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["message"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(messages, ["Project 'billing' deleted", "Project 'billing' added"]);
        assert_eq!(directory.activity_messages().len(), 3);
    }

    #[tokio::test]
    async fn project_urls_must_serve_json() {
        let (app, directory) = setup();
        let upstream = spawn_upstream(docs_upstream()).await;
        directory.create_team("alpha").await.unwrap();
        let writer = bearer("alpha", &["write"]);

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/v1/projects/add",
                Some(&writer),
                Some(json!({ "projectname": "web", "pre_prod_url": format!("http://{upstream}/html") })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid JSON response from pre prod url");

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/v1/projects/add",
                Some(&writer),
                Some(json!({ "projectname": "web" })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "At least one URL must be provided");
    }

    #[tokio::test]
    async fn other_teams_projects_are_out_of_reach() {
        let (app, directory) = setup();
        directory.create_team("alpha").await.unwrap();
        let beta = directory.create_team("beta").await.unwrap();
        let project = directory
            .create_project(&beta, &fields("ledger", "http://10.0.0.9/v3/api-docs"))
            .await
            .unwrap();
        let alpha_writer = bearer("ALPHA", &["read", "write"]);
        let id = project.project_id;

        let (status, _) = send(
            &app,
            request(Method::GET, &format!("/api/v1/projects/{id}"), Some(&alpha_writer), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            request(Method::DELETE, &format!("/api/v1/projects/delete/{id}"), Some(&alpha_writer), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "You do not have permission to delete this project");

        let (_, listed) = send(
            &app,
            request(Method::GET, "/api/v1/projects/get/all?team_name=beta", Some(&alpha_writer), None),
        )
        .await;
        assert_eq!(listed, json!([]));

        let admin = bearer("alpha", &["admin"]);
        let (_, listed) = send(
            &app,
            request(Method::GET, "/api/v1/projects/get/all?team_name=beta", Some(&admin), None),
        )
        .await;
        assert_eq!(listed[0]["projectname"], "ledger");
    }

    #[tokio::test]
    async fn team_creation_is_admin_only_and_unique() {
        let (app, _) = setup();
        let admin = bearer("ops", &["admin"]);
        let writer = bearer("ops", &["read", "write"]);
        let body = json!({ "team_name": "payments" });

        let (status, _) = send(
            &app,
            request(Method::POST, "/api/v1/teams", Some(&writer), Some(body.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            request(Method::POST, "/api/v1/teams", Some(&admin), Some(body.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            request(Method::POST, "/api/v1/teams", Some(&admin), Some(json!({ "team_name": "Payments" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["message"], "Team with name 'Payments' already exists");
    }

    #[tokio::test]
    async fn swagger_environment_must_be_known() {
        let (app, directory) = setup();
        let alpha = directory.create_team("alpha").await.unwrap();
        let project = directory
            .create_project(&alpha, &fields("ledger", "http://10.0.0.9/v3/api-docs"))
            .await
            .unwrap();
        let reader = bearer("alpha", &["read"]);
        let id = project.project_id;

        let (status, body) = send(
            &app,
            request(Method::GET, &format!("/api/v1/swagger/get/{id}/production"), Some(&reader), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ENVIRONMENT");

        let (status, body) = send(
            &app,
            request(Method::GET, &format!("/api/v1/swagger/get/{id}/pg_url"), Some(&reader), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "The 'pg_url' is null for this project");
    }

    #[tokio::test]
    async fn project_update_respects_team_boundaries() {
        let (app, directory) = setup();
        let upstream = spawn_upstream(docs_upstream()).await;
        directory.create_team("alpha").await.unwrap();
        let beta = directory.create_team("beta").await.unwrap();
        let project = directory
            .create_project(&beta, &fields("ledger", "http://10.0.0.9/v3/api-docs"))
            .await
            .unwrap();
        let id = project.project_id;
        let update = json!({
            "projectname": "ledger-v2",
            "team_name": "alpha",
            "prod_url": format!("http://{upstream}/v3/api-docs"),
        });

        let alpha_writer = bearer("alpha", &["read", "write"]);
        let (status, body) = send(
            &app,
            request(Method::PUT, &format!("/api/v1/projects/update/{id}"), Some(&alpha_writer), Some(update.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "Your team does not have access to this project");

        let admin = bearer("ops", &["admin"]);
        let unknown = uuid::Uuid::new_v4();
        let (status, body) = send(
            &app,
            request(Method::PUT, &format!("/api/v1/projects/update/{unknown}"), Some(&admin), Some(update.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Project not found.");

        let (status, moved) = send(
            &app,
            request(Method::PUT, &format!("/api/v1/projects/update/{id}"), Some(&admin), Some(update)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["uuid"], id.to_string());
        assert_eq!(moved["projectname"], "ledger-v2");
        assert_eq!(moved["team_name"], "alpha");

        let (status, fetched) = send(
            &app,
            request(Method::GET, &format!("/api/v1/projects/{id}"), Some(&alpha_writer), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["projectname"], "ledger-v2");

        assert_eq!(
            directory.activity_messages().last().map(String::as_str),
            Some("Project 'ledger-v2' updated")
        );
    }

    #[tokio::test]
    async fn recent_activity_limit_is_bounded() {
        let (app, directory) = setup();
        directory.create_team("alpha").await.unwrap();
        let reader = bearer("alpha", &["read"]);

        for k in ["0", "101", "-1"] {
            let (status, body) = send(
                &app,
                request(Method::GET, &format!("/api/v1/activities/recent?k={k}"), Some(&reader), None),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "k={k}");
            assert_eq!(body["error"]["message"], "k must be between 1 and 100", "k={k}");
        }

        for k in ["1", "100"] {
            let (status, body) = send(
                &app,
                request(Method::GET, &format!("/api/v1/activities/recent?k={k}"), Some(&reader), None),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "k={k}");
            assert_eq!(body, json!([]));
        }
    }

    #[tokio::test]
    async fn swagger_of_other_team_is_forbidden() {
        let (app, directory) = setup();
        directory.create_team("alpha").await.unwrap();
        let beta = directory.create_team("beta").await.unwrap();
        let project = directory
            .create_project(&beta, &fields("ledger", "http://10.0.0.9/v3/api-docs"))
            .await
            .unwrap();
        let reader = bearer("alpha", &["read"]);
        let id = project.project_id;

        let (status, body) = send(
            &app,
            request(Method::GET, &format!("/api/v1/swagger/get/{id}/prod_url"), Some(&reader), None),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "Your team does not have access to this project");
    }
}
