//! End-to-end tests for the Ledgerline admin API.
//!
//! Each test spawns the real router on an ephemeral port over the memory
//! store and talks to it with `reqwest`, so no database is needed:
//!
//! ```bash
//! cargo test -p ledgerline-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use ledgerline_admin::db::Store;
use ledgerline_admin::routes;
use ledgerline_admin::services::AdminAuthService;
use ledgerline_admin::state::AppState;
use ledgerline_core::AdminRole;
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use tower_sessions::MemoryStore;

pub const ADMIN_EMAIL: &str = "ops@ledgerline.dev";
pub const ADMIN_PASSWORD: &str = "Tq9!vR2#mZ7@kL4$";

/// A running admin server plus a cookie-keeping HTTP client.
pub struct TestServer {
    addr: SocketAddr,
    client: Client,
}

impl TestServer {
    /// Start a server with one admin account, not yet logged in.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind or the admin cannot be created.
    pub async fn spawn() -> Self {
        let state = AppState::new(Store::memory());
        AdminAuthService::new(state.store())
            .create_admin(ADMIN_EMAIL, "Ops", AdminRole::Admin, ADMIN_PASSWORD)
            .await
            .expect("create test admin");

        let app = routes::app(state, MemoryStore::default(), false);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("build HTTP client");

        Self { addr, client }
    }

    /// Start a server and log in as the test admin.
    ///
    /// # Panics
    ///
    /// Panics if login fails.
    pub async fn logged_in() -> Self {
        let server = Self::spawn().await;
        let response = server
            .post(
                "/api/auth/login",
                json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        server
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request")
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post(&self, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("POST request")
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn patch(&self, path: &str, body: Value) -> Response {
        self.client
            .patch(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("PATCH request")
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn put(&self, path: &str, body: Value) -> Response {
        self.client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("PUT request")
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE request")
    }

    /// POST and return the created document, asserting 201.
    ///
    /// # Panics
    ///
    /// Panics if the response is not 201 with a JSON body.
    pub async fn create(&self, path: &str, body: Value) -> Value {
        let response = self.post(path, body).await;
        let status = response.status();
        let body: Value = response.json().await.expect("JSON body");
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    /// Create a client and return its id.
    pub async fn client(&self, name: &str) -> String {
        id_of(&self.create("/api/clients", json!({"name": name})).await)
    }

    /// Create a project under `client` and return its id.
    pub async fn project(&self, client: &str, name: &str) -> String {
        id_of(
            &self
                .create("/api/projects", json!({"name": name, "client": client}))
                .await,
        )
    }

    /// Record `hours` of work and return the billable-hours id.
    pub async fn billable(&self, client: &str, project: &str, hours: &str) -> String {
        id_of(
            &self
                .create(
                    "/api/billables",
                    json!({
                        "startTime": "2026-06-01T09:00:00Z",
                        "endTime": "2026-06-01T18:00:00Z",
                        "totalHours": hours,
                        "client": client,
                        "project": project,
                    }),
                )
                .await,
        )
    }
}

/// The `id` field of a JSON document.
///
/// # Panics
///
/// Panics if there is no string `id`.
#[must_use]
pub fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("document id").to_string()
}
