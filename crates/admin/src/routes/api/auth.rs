//! Authentication route handlers for admin.
//!
//! Email and password login backed by Argon2id hashes; the logged-in admin
//! lives in the session cookie.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::ApiJson;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// POST /api/auth/login
#[instrument(skip(state, session, body), fields(email = %body.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<CurrentAdmin>, AppError> {
    let user = AdminAuthService::new(state.store())
        .login(&body.email, &body.password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Admin login failed"))?;

    let admin = CurrentAdmin::from(&user);
    set_current_admin(&session, &admin).await?;
    set_sentry_user(admin.id, Some(admin.email.as_str()));

    tracing::info!(admin_id = %admin.id, "Admin logged in");
    Ok(Json(admin))
}

/// POST /api/auth/logout
async fn logout(session: Session) -> Result<StatusCode, AppError> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<CurrentAdmin> {
    Json(admin)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Method;
    use ledgerline_core::AdminRole;
    use serde_json::json;

    use super::super::test_support::{PASSWORD, TestApp};
    use super::*;

    #[tokio::test]
    async fn test_login_me_logout() {
        let app = TestApp::new();
        let cookie = app.login_as(AdminRole::Viewer).await;

        let (status, body) = app.get("/api/auth/me", &cookie).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "viewer");
        assert!(body.get("passwordHash").is_none());

        let (status, _) = app
            .send(Method::POST, "/api/auth/logout", Some(&cookie), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = app.get("/api/auth/me", &cookie).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let app = TestApp::new();
        app.login_as(AdminRole::Admin).await;

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": "admin@example.com", "password": "nope nope nope"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized: invalid email or password");

        let (status, _) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": "admin@example.com", "password": PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_resources_require_login() {
        let app = TestApp::new();
        for uri in ["/api/clients", "/api/invoices", "/api/timer", "/api/dashboard"] {
            let (status, _) = app.send(Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_viewer_cannot_write() {
        let app = TestApp::new();
        let viewer = app.login_as(AdminRole::Viewer).await;

        let (status, _) = app.get("/api/clients", &viewer).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .post("/api/clients", &viewer, json!({"name": "Acme"}))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden: role viewer is read-only");
    }
}
