//! Announcement API handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;

use ledgerline_core::{AnnouncementId, AnnouncementStatus};

use super::{ApiJson, ApiPath, ApiQuery, Deleted, fetch, matches, remove};
use crate::db::Repository;
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriter};
use crate::models::{Announcement, CreateAnnouncementInput, UpdateAnnouncementInput};
use crate::state::AppState;

const KIND: &str = "announcement";

/// Build the announcements router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/announcements", get(list).post(create))
        .route(
            "/api/announcement/{id}",
            get(show).put(update).patch(update).delete(delete),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementFilter {
    pub status: Option<AnnouncementStatus>,
}

async fn list(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<AnnouncementFilter>,
) -> Result<Json<Vec<Announcement>>, AppError> {
    let announcements = Repository::<Announcement>::new(state.store())
        .list()
        .await?
        .into_iter()
        .filter(|a| matches(filter.status, a.status))
        .collect();
    Ok(Json(announcements))
}

async fn create(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateAnnouncementInput>,
) -> Result<(StatusCode, Json<Announcement>), AppError> {
    let announcement = Announcement::create(input, Utc::now())?;
    Repository::new(state.store()).insert(&announcement).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

async fn show(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AnnouncementId>,
) -> Result<Json<Announcement>, AppError> {
    Ok(Json(fetch(state.store(), id, KIND).await?))
}

async fn update(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AnnouncementId>,
    ApiJson(input): ApiJson<UpdateAnnouncementInput>,
) -> Result<Json<Announcement>, AppError> {
    let mut announcement: Announcement = fetch(state.store(), id, KIND).await?;
    announcement.apply(input, Utc::now())?;
    Repository::new(state.store()).replace(&announcement).await?;
    Ok(Json(announcement))
}

async fn delete(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AnnouncementId>,
) -> Result<Json<Deleted<AnnouncementId>>, AppError> {
    remove::<Announcement>(state.store(), id, KIND).await
}
