//! Team member API handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use ledgerline_core::{TeamMemberId, TeamMemberStatus};

use super::{ApiJson, ApiPath, ApiQuery, Deleted, fetch, matches, remove};
use crate::db::Repository;
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriter};
use crate::models::{CreateTeamMemberInput, TeamMember, UpdateTeamMemberInput};
use crate::state::AppState;

const KIND: &str = "team member";

/// Build the team router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/team", get(list).post(create))
        .route(
            "/api/team/{id}",
            get(show).put(update).patch(update).delete(delete),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct TeamFilter {
    pub status: Option<TeamMemberStatus>,
}

/// GET /api/team
async fn list(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<TeamFilter>,
) -> Result<Json<Vec<TeamMember>>, AppError> {
    let members = Repository::<TeamMember>::new(state.store())
        .list()
        .await?
        .into_iter()
        .filter(|m| matches(filter.status, m.status))
        .collect();
    Ok(Json(members))
}

/// POST /api/team
#[instrument(skip_all, fields(admin = %admin.email))]
async fn create(
    RequireWriter(admin): RequireWriter,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateTeamMemberInput>,
) -> Result<(StatusCode, Json<TeamMember>), AppError> {
    let member = TeamMember::create(input, Utc::now())?;
    Repository::new(state.store()).insert(&member).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /api/team/{id}
async fn show(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TeamMemberId>,
) -> Result<Json<TeamMember>, AppError> {
    Ok(Json(fetch(state.store(), id, KIND).await?))
}

/// PUT/PATCH /api/team/{id}
async fn update(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TeamMemberId>,
    ApiJson(input): ApiJson<UpdateTeamMemberInput>,
) -> Result<Json<TeamMember>, AppError> {
    let mut member: TeamMember = fetch(state.store(), id, KIND).await?;
    member.apply(input, Utc::now())?;
    Repository::new(state.store()).replace(&member).await?;
    Ok(Json(member))
}

/// DELETE /api/team/{id}
async fn delete(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TeamMemberId>,
) -> Result<Json<Deleted<TeamMemberId>>, AppError> {
    remove::<TeamMember>(state.store(), id, KIND).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::super::test_support::TestApp;
    use super::*;

    #[tokio::test]
    async fn test_deactivate_member() {
        let app = TestApp::new();
        let cookie = app.admin().await;
        let (_, member) = app
            .post(
                "/api/team",
                &cookie,
                json!({"name": "Ada", "email": "ada@example.com", "role": "Engineer"}),
            )
            .await;
        let uri = format!("/api/team/{}", member["id"].as_str().unwrap());

        let (status, body) = app.patch(&uri, &cookie, json!({"status": "inactive"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "Engineer");

        let (_, active) = app.get("/api/team?status=active", &cookie).await;
        assert!(active.as_array().unwrap().is_empty());
    }
}
