//! Support ticket API handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use ledgerline_core::{ClientId, ProjectId, TeamMemberId, TicketId, TicketPriority, TicketStatus};

use super::{ApiJson, ApiPath, ApiQuery, Deleted, fetch, matches, remove};
use crate::db::Repository;
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriter};
use crate::models::{CreateTicketInput, Ticket, UpdateTicketInput};
use crate::services::References;
use crate::state::AppState;

const KIND: &str = "ticket";

/// Build the tickets router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tickets", get(list).post(create))
        .route(
            "/api/ticket/{id}",
            get(show).put(update).patch(update).delete(delete),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub client: Option<ClientId>,
    pub project: Option<ProjectId>,
    pub assignee: Option<TeamMemberId>,
}

impl TicketFilter {
    fn accepts(&self, ticket: &Ticket) -> bool {
        matches(self.status, ticket.status)
            && matches(self.priority, ticket.priority)
            && (self.client.is_none() || self.client == ticket.client)
            && (self.project.is_none() || self.project == ticket.project)
            && (self.assignee.is_none() || self.assignee == ticket.assignee)
    }
}

/// Check the ticket's references as they stand.
async fn check_references(state: &AppState, ticket: &Ticket) -> Result<(), AppError> {
    let references = References::new(state.store());
    references
        .client_project(ticket.client, ticket.project)
        .await?;
    if let Some(assignee) = ticket.assignee {
        references.team_member(assignee).await?;
    }
    Ok(())
}

/// GET /api/tickets
#[instrument(skip_all)]
async fn list(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<TicketFilter>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let tickets = Repository::<Ticket>::new(state.store())
        .list()
        .await?
        .into_iter()
        .filter(|t| filter.accepts(t))
        .collect();
    Ok(Json(tickets))
}

/// POST /api/tickets
#[instrument(skip_all, fields(admin = %admin.email))]
async fn create(
    RequireWriter(admin): RequireWriter,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateTicketInput>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    let ticket = Ticket::create(input, Utc::now())?;
    check_references(&state, &ticket).await?;
    Repository::new(state.store()).insert(&ticket).await?;

    tracing::info!(ticket_id = %ticket.id, priority = %ticket.priority, "Ticket opened");
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// GET /api/ticket/{id}
async fn show(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TicketId>,
) -> Result<Json<Ticket>, AppError> {
    Ok(Json(fetch(state.store(), id, KIND).await?))
}

/// PUT/PATCH /api/ticket/{id}
#[instrument(skip_all, fields(ticket_id = %id))]
async fn update(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(input): ApiJson<UpdateTicketInput>,
) -> Result<Json<Ticket>, AppError> {
    let mut ticket: Ticket = fetch(state.store(), id, KIND).await?;
    ticket.apply(input, Utc::now())?;
    check_references(&state, &ticket).await?;
    Repository::new(state.store()).replace(&ticket).await?;
    Ok(Json(ticket))
}

/// DELETE /api/ticket/{id}
async fn delete(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TicketId>,
) -> Result<Json<Deleted<TicketId>>, AppError> {
    remove::<Ticket>(state.store(), id, KIND).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::super::test_support::TestApp;
    use super::*;

    #[tokio::test]
    async fn test_assignment_and_filters() {
        let app = TestApp::new();
        let cookie = app.admin().await;

        let (status, member) = app
            .post(
                "/api/team",
                &cookie,
                json!({"name": "Ada", "email": "ada@example.com"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let member = member["id"].as_str().unwrap();

        let (status, ticket) = app
            .post(
                "/api/tickets",
                &cookie,
                json!({"subject": "Invoice PDF blank", "assignee": member, "priority": "high"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(ticket["status"], "open");
        app.post("/api/tickets", &cookie, json!({"subject": "Unassigned"}))
            .await;

        let (_, assigned) = app
            .get(&format!("/api/tickets?assignee={member}"), &cookie)
            .await;
        assert_eq!(assigned.as_array().unwrap().len(), 1);

        let (_, high) = app.get("/api/tickets?priority=high", &cookie).await;
        assert_eq!(high[0]["subject"], "Invoice PDF blank");
    }

    #[tokio::test]
    async fn test_unknown_assignee_rejected() {
        let app = TestApp::new();
        let cookie = app.admin().await;

        let (status, _) = app
            .post(
                "/api/tickets",
                &cookie,
                json!({"subject": "x", "assignee": TeamMemberId::generate()}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_project_must_match_client() {
        let app = TestApp::new();
        let cookie = app.admin().await;
        let acme = app.client(&cookie, "Acme").await;
        let globex = app.client(&cookie, "Globex").await;
        let project = app.project(&cookie, &acme).await;

        let (status, body) = app
            .post(
                "/api/tickets",
                &cookie,
                json!({"subject": "x", "client": globex, "project": project}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("does not belong"));
    }
}
