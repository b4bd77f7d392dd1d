//! Billable-hours API handlers.
//!
//! Records already referenced by an invoice cannot be deleted, and the
//! fields an invoice is computed from (client, hours, times, billable flag)
//! are frozen, so invoices never point at missing, foreign, or changed hours.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use ledgerline_core::{BillableHoursId, ClientId, ProjectId};

use super::{ApiJson, ApiPath, ApiQuery, Deleted, fetch, matches, remove};
use crate::db::Repository;
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriter};
use crate::models::{BillableHours, CreateBillableInput, UpdateBillableInput};
use crate::services::{References, billed_ids};
use crate::state::AppState;

const KIND: &str = "billable hours";

/// Build the billables router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/billables", get(list).post(create))
        .route(
            "/api/billable/{id}",
            get(show).put(update).patch(update).delete(delete),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct BillableFilter {
    pub client: Option<ClientId>,
    pub project: Option<ProjectId>,
    pub billable: Option<bool>,
    /// Only records not referenced by any invoice.
    #[serde(default)]
    pub unbilled: bool,
}

/// GET /api/billables
#[instrument(skip_all)]
async fn list(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<BillableFilter>,
) -> Result<Json<Vec<BillableHours>>, AppError> {
    let billed = if filter.unbilled {
        Some(billed_ids(state.store()).await?)
    } else {
        None
    };

    let records = Repository::<BillableHours>::new(state.store())
        .list()
        .await?
        .into_iter()
        .filter(|r| {
            matches(filter.client, r.client)
                && matches(filter.project, r.project)
                && matches(filter.billable, r.billable)
                && billed.as_ref().is_none_or(|billed| !billed.contains(&r.id))
        })
        .collect();
    Ok(Json(records))
}

/// POST /api/billables
#[instrument(skip_all, fields(admin = %admin.email))]
async fn create(
    RequireWriter(admin): RequireWriter,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateBillableInput>,
) -> Result<(StatusCode, Json<BillableHours>), AppError> {
    References::new(state.store())
        .client_project(Some(input.client), Some(input.project))
        .await?;
    let record = BillableHours::create(input, Utc::now())?;
    Repository::new(state.store()).insert(&record).await?;

    tracing::info!(billable_id = %record.id, total_hours = %record.total_hours, "Hours recorded");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/billable/{id}
async fn show(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BillableHoursId>,
) -> Result<Json<BillableHours>, AppError> {
    Ok(Json(fetch(state.store(), id, KIND).await?))
}

/// PUT/PATCH /api/billable/{id}
#[instrument(skip_all, fields(billable_id = %id))]
async fn update(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BillableHoursId>,
    ApiJson(input): ApiJson<UpdateBillableInput>,
) -> Result<Json<BillableHours>, AppError> {
    let mut record: BillableHours = fetch(state.store(), id, KIND).await?;
    let previous = record.clone();
    let references_changed = input.client.is_some() || input.project.is_some();

    record.apply(input, Utc::now())?;

    if references_changed {
        References::new(state.store())
            .client_project(Some(record.client), Some(record.project))
            .await?;
    }
    if invoiced_fields_changed(&previous, &record)
        && billed_ids(state.store()).await?.contains(&id)
    {
        return Err(AppError::Conflict(
            "billable hours already invoiced cannot change client, hours, times or billable flag"
                .to_string(),
        ));
    }

    Repository::new(state.store()).replace(&record).await?;
    Ok(Json(record))
}

/// Whether an edit touches a field invoice totals are derived from.
fn invoiced_fields_changed(before: &BillableHours, after: &BillableHours) -> bool {
    before.client != after.client
        || before.total_hours != after.total_hours
        || before.start_time != after.start_time
        || before.end_time != after.end_time
        || before.billable != after.billable
}

/// DELETE /api/billable/{id}
async fn delete(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BillableHoursId>,
) -> Result<Json<Deleted<BillableHoursId>>, AppError> {
    if billed_ids(state.store()).await?.contains(&id) {
        return Err(AppError::Conflict(
            "billable hours referenced by an invoice cannot be deleted".to_string(),
        ));
    }
    remove::<BillableHours>(state.store(), id, KIND).await
}
