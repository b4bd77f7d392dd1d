//! Project API handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use ledgerline_core::{ClientId, ProjectId, ProjectStatus};

use super::{ApiJson, ApiPath, ApiQuery, Deleted, fetch, matches, remove};
use crate::db::Repository;
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriter};
use crate::models::{CreateProjectInput, Project, UpdateProjectInput};
use crate::services::References;
use crate::state::AppState;

const KIND: &str = "project";

/// Build the projects router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list).post(create))
        .route(
            "/api/project/{id}",
            get(show).put(update).patch(update).delete(delete),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub client: Option<ClientId>,
}

/// GET /api/projects
#[instrument(skip_all)]
async fn list(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ProjectFilter>,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects = Repository::<Project>::new(state.store())
        .list()
        .await?
        .into_iter()
        .filter(|p| matches(filter.status, p.status) && matches(filter.client, p.client))
        .collect();
    Ok(Json(projects))
}

/// POST /api/projects
#[instrument(skip_all, fields(admin = %admin.email))]
async fn create(
    RequireWriter(admin): RequireWriter,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateProjectInput>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    References::new(state.store()).client(input.client).await?;
    let project = Project::create(input, Utc::now())?;
    Repository::new(state.store()).insert(&project).await?;

    tracing::info!(project_id = %project.id, client_id = %project.client, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/project/{id}
async fn show(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(fetch(state.store(), id, KIND).await?))
}

/// PUT/PATCH /api/project/{id}
#[instrument(skip_all, fields(project_id = %id))]
async fn update(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
    ApiJson(input): ApiJson<UpdateProjectInput>,
) -> Result<Json<Project>, AppError> {
    let mut project: Project = fetch(state.store(), id, KIND).await?;
    if let Some(client) = input.client {
        References::new(state.store()).client(client).await?;
    }
    project.apply(input, Utc::now())?;
    Repository::new(state.store()).replace(&project).await?;
    Ok(Json(project))
}

/// DELETE /api/project/{id}
async fn delete(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
) -> Result<Json<Deleted<ProjectId>>, AppError> {
    remove::<Project>(state.store(), id, KIND).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::super::test_support::TestApp;
    use super::*;

    #[tokio::test]
    async fn test_unknown_client_rejected() {
        let app = TestApp::new();
        let cookie = app.admin().await;

        let (status, body) = app
            .post(
                "/api/projects",
                &cookie,
                json!({"name": "Website", "client": ClientId::generate()}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_filter_by_client() {
        let app = TestApp::new();
        let cookie = app.admin().await;
        let acme = app.client(&cookie, "Acme").await;
        let globex = app.client(&cookie, "Globex").await;
        app.project(&cookie, &acme).await;
        app.project(&cookie, &globex).await;
        app.project(&cookie, &globex).await;

        let (_, projects) = app
            .get(&format!("/api/projects?client={globex}"), &cookie)
            .await;
        assert_eq!(projects.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_status_and_dates() {
        let app = TestApp::new();
        let cookie = app.admin().await;
        let client = app.client(&cookie, "Acme").await;
        let project = app.project(&cookie, &client).await;
        let uri = format!("/api/project/{project}");

        let (status, body) = app
            .send(
                axum::http::Method::PUT,
                &uri,
                Some(&cookie),
                Some(json!({"status": "on_hold", "startDate": "2026-02-01"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "on_hold");
        assert_eq!(body["startDate"], "2026-02-01");

        let (status, _) = app
            .patch(&uri, &cookie, json!({"endDate": "2026-01-01"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
