//! Client API handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use ledgerline_core::{ClientId, ClientStatus};

use super::{ApiJson, ApiPath, ApiQuery, Deleted, fetch, matches, remove};
use crate::db::Repository;
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriter};
use crate::models::{Client, CreateClientInput, UpdateClientInput};
use crate::state::AppState;

const KIND: &str = "client";

/// Build the clients router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/clients", get(list).post(create))
        .route(
            "/api/client/{id}",
            get(show).put(update).patch(update).delete(delete),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientFilter {
    pub status: Option<ClientStatus>,
}

/// GET /api/clients
#[instrument(skip_all)]
async fn list(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ClientFilter>,
) -> Result<Json<Vec<Client>>, AppError> {
    let clients = Repository::<Client>::new(state.store())
        .list()
        .await?
        .into_iter()
        .filter(|c| matches(filter.status, c.status))
        .collect();
    Ok(Json(clients))
}

/// POST /api/clients
#[instrument(skip_all, fields(admin = %admin.email))]
async fn create(
    RequireWriter(admin): RequireWriter,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateClientInput>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let client = Client::create(input, Utc::now())?;
    Repository::new(state.store()).insert(&client).await?;

    tracing::info!(client_id = %client.id, "Client created");
    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /api/client/{id}
async fn show(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ClientId>,
) -> Result<Json<Client>, AppError> {
    Ok(Json(fetch(state.store(), id, KIND).await?))
}

/// PUT/PATCH /api/client/{id}
#[instrument(skip_all, fields(client_id = %id))]
async fn update(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ClientId>,
    ApiJson(input): ApiJson<UpdateClientInput>,
) -> Result<Json<Client>, AppError> {
    let mut client: Client = fetch(state.store(), id, KIND).await?;
    client.apply(input, Utc::now())?;
    Repository::new(state.store()).replace(&client).await?;
    Ok(Json(client))
}

/// DELETE /api/client/{id}
async fn delete(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ClientId>,
) -> Result<Json<Deleted<ClientId>>, AppError> {
    remove::<Client>(state.store(), id, KIND).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::super::test_support::TestApp;
    use super::*;

    #[tokio::test]
    async fn test_crud_round() {
        let app = TestApp::new();
        let cookie = app.admin().await;

        let (status, created) = app
            .post(
                "/api/clients",
                &cookie,
                json!({"name": "Acme", "email": "billing@acme.test", "status": "lead"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap();
        let uri = format!("/api/client/{id}");

        let (status, fetched) = app.get(&uri, &cookie).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, updated) = app
            .patch(&uri, &cookie, json!({"phone": "555-0100"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Acme");
        assert_eq!(updated["phone"], "555-0100");
        assert_eq!(updated["status"], "lead");

        let (status, body) = app.delete(&uri, &cookie).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"deleted": true, "id": id}));

        let (status, _) = app.get(&uri, &cookie).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let app = TestApp::new();
        let cookie = app.admin().await;
        app.client(&cookie, "Active Co").await;
        app.post(
            "/api/clients",
            &cookie,
            json!({"name": "Prospect", "status": "lead"}),
        )
        .await;

        let (_, all) = app.get("/api/clients", &cookie).await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, leads) = app.get("/api/clients?status=lead", &cookie).await;
        assert_eq!(leads.as_array().unwrap().len(), 1);
        assert_eq!(leads[0]["name"], "Prospect");

        let (status, _) = app.get("/api/clients?status=bogus", &cookie).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let app = TestApp::new();
        let cookie = app.admin().await;

        let (status, body) = app.post("/api/clients", &cookie, json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("name"));

        let (status, _) = app
            .post("/api/clients", &cookie, json!({"name": "Acme", "status": "vip"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.get("/api/client/not-a-uuid", &cookie).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
