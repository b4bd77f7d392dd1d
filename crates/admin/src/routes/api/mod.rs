//! JSON API route handlers for admin.
//!
//! Collections are plural (`/api/clients`), items singular
//! (`/api/client/{id}`). PUT and PATCH share partial-update semantics.
//! Reads require a logged-in admin; writes require a non-viewer role.

pub mod announcements;
pub mod auth;
pub mod billables;
pub mod clients;
pub mod dashboard;
pub mod extract;
pub mod invoices;
pub mod projects;
pub mod team;
pub mod tickets;
pub mod timer;

use std::fmt::Display;

use axum::{Json, Router};
use serde::Serialize;

use crate::db::{Document, Repository, Store};
use crate::error::AppError;
use crate::state::AppState;

pub use extract::{ApiJson, ApiPath, ApiQuery};

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(clients::router())
        .merge(projects::router())
        .merge(tickets::router())
        .merge(invoices::router())
        .merge(billables::router())
        .merge(team::router())
        .merge(announcements::router())
        .merge(timer::router())
        .merge(dashboard::router())
}

/// Body returned by every delete endpoint.
#[derive(Debug, Serialize)]
pub struct Deleted<I> {
    pub deleted: bool,
    pub id: I,
}

/// Load a document or fail with 404.
async fn fetch<T>(store: &Store, id: T::Id, kind: &str) -> Result<T, AppError>
where
    T: Document,
    T::Id: Display,
{
    Repository::<T>::new(store)
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(kind, id))
}

/// Delete a document or fail with 404.
async fn remove<T>(store: &Store, id: T::Id, kind: &str) -> Result<Json<Deleted<T::Id>>, AppError>
where
    T: Document,
    T::Id: Display,
{
    if Repository::<T>::new(store).delete(id).await? {
        tracing::info!(%id, kind, "Document deleted");
        Ok(Json(Deleted { deleted: true, id }))
    } else {
        Err(AppError::not_found(kind, id))
    }
}

/// True when the filter is unset or equals `value`.
fn matches<V: PartialEq>(filter: Option<V>, value: V) -> bool {
    filter.is_none_or(|wanted| wanted == value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_support {
    //! Router-level test helpers: an app over the memory store and a
    //! logged-in session cookie.

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use ledgerline_core::AdminRole;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use crate::db::Store;
    use crate::services::AdminAuthService;
    use crate::state::AppState;

    pub const PASSWORD: &str = "correct horse battery";

    pub struct TestApp {
        pub router: axum::Router,
        pub state: AppState,
    }

    impl TestApp {
        pub fn new() -> Self {
            let state = AppState::new(Store::memory());
            let router = crate::routes::app(state.clone(), MemoryStore::default(), false);
            Self { router, state }
        }

        /// Create an admin with `role` and return its session cookie.
        pub async fn login_as(&self, role: AdminRole) -> String {
            let email = format!("{role}@example.com");
            AdminAuthService::new(self.state.store())
                .create_admin(&email, "Test Admin", role, PASSWORD)
                .await
                .unwrap();

            let response = self
                .router
                .clone()
                .oneshot(
                    Request::builder()
                        .method(Method::POST)
                        .uri("/api/auth/login")
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(
                            json!({"email": email, "password": PASSWORD}).to_string(),
                        ))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let set_cookie = response
                .headers()
                .get(header::SET_COOKIE)
                .expect("login sets a session cookie")
                .to_str()
                .unwrap();
            set_cookie.split(';').next().unwrap().to_string()
        }

        pub async fn admin(&self) -> String {
            self.login_as(AdminRole::Admin).await
        }

        /// Send a request and decode the JSON response (Null for empty bodies).
        pub async fn send(
            &self,
            method: Method,
            uri: &str,
            cookie: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string())),
                None => builder.body(Body::empty()),
            }
            .unwrap();

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        pub async fn get(&self, uri: &str, cookie: &str) -> (StatusCode, Value) {
            self.send(Method::GET, uri, Some(cookie), None).await
        }

        pub async fn post(&self, uri: &str, cookie: &str, body: Value) -> (StatusCode, Value) {
            self.send(Method::POST, uri, Some(cookie), Some(body)).await
        }

        pub async fn patch(&self, uri: &str, cookie: &str, body: Value) -> (StatusCode, Value) {
            self.send(Method::PATCH, uri, Some(cookie), Some(body)).await
        }

        pub async fn delete(&self, uri: &str, cookie: &str) -> (StatusCode, Value) {
            self.send(Method::DELETE, uri, Some(cookie), None).await
        }

        /// Create a client and return its ID.
        pub async fn client(&self, cookie: &str, name: &str) -> String {
            let (status, body) = self
                .post("/api/clients", cookie, json!({"name": name}))
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["id"].as_str().unwrap().to_string()
        }

        /// Create a project for `client` and return its ID.
        pub async fn project(&self, cookie: &str, client: &str) -> String {
            let (status, body) = self
                .post(
                    "/api/projects",
                    cookie,
                    json!({"name": "Website", "client": client}),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["id"].as_str().unwrap().to_string()
        }

        /// Record `hours` of billable time and return the record's ID.
        pub async fn billable(
            &self,
            cookie: &str,
            client: &str,
            project: &str,
            hours: &str,
        ) -> String {
            let (status, body) = self
                .post(
                    "/api/billables",
                    cookie,
                    json!({
                        "startTime": "2026-05-04T09:00:00Z",
                        "endTime": "2026-05-04T17:00:00Z",
                        "totalHours": hours,
                        "client": client,
                        "project": project,
                    }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["id"].as_str().unwrap().to_string()
        }
    }
}
