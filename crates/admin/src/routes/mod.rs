//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness
//! GET  /health/ready                 - Readiness (store reachable)
//!
//! POST /api/auth/login               - Email + password login
//! POST /api/auth/logout              - Logout
//! GET  /api/auth/me                  - Current admin
//!
//! GET|POST                 /api/clients         /api/projects   /api/tickets
//! GET|PUT|PATCH|DELETE     /api/client/{id}     /api/project/{id} ...
//!                          (likewise invoices, billables, team, announcements)
//!
//! GET  /api/timer                    - Running work sessions
//! POST /api/timer/start              - Start a work session
//! POST /api/timer/{id}/stop          - Stop, producing billable hours
//! DELETE /api/timer/{id}             - Discard a work session
//!
//! GET  /api/dashboard                - Summary counts and totals
//! ```

pub mod api;
pub mod health;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::middleware::create_session_layer;
use crate::state::AppState;

/// All routes, without layers.
pub fn routes() -> Router<AppState> {
    Router::new().merge(health::router()).merge(api::router())
}

/// The full application: routes, sessions, and request tracing.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app<S>(state: AppState, session_store: S, secure_cookies: bool) -> Router
where
    S: SessionStore + Clone,
{
    routes()
        .layer(create_session_layer(session_store, secure_cookies))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
