//! Work-session stopwatch API handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use tracing::instrument;

use ledgerline_core::WorkSessionId;

use super::{ApiJson, ApiPath, Deleted};
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriter};
use crate::models::{BillableHours, StartWorkSessionInput, WorkSession};
use crate::services::TimerService;
use crate::state::AppState;

/// Build the timer router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/timer", get(running))
        .route("/api/timer/start", post(start))
        .route("/api/timer/{id}/stop", post(stop))
        .route("/api/timer/{id}", delete(discard))
}

/// GET /api/timer
async fn running(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkSession>>, AppError> {
    Ok(Json(TimerService::new(state.store()).running().await?))
}

/// POST /api/timer/start
#[instrument(skip_all, fields(admin = %admin.email))]
async fn start(
    RequireWriter(admin): RequireWriter,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<StartWorkSessionInput>,
) -> Result<(StatusCode, Json<WorkSession>), AppError> {
    let session = TimerService::new(state.store()).start(input).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/timer/{id}/stop
async fn stop(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<WorkSessionId>,
) -> Result<(StatusCode, Json<BillableHours>), AppError> {
    let record = TimerService::new(state.store()).stop(id).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/timer/{id}
async fn discard(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<WorkSessionId>,
) -> Result<Json<Deleted<WorkSessionId>>, AppError> {
    TimerService::new(state.store()).discard(id).await?;
    Ok(Json(Deleted { deleted: true, id }))
}
