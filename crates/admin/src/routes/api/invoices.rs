//! Invoice API handlers.
//!
//! Creation and update go through [`InvoiceService`], which derives
//! `totalHours` and `amount` from the referenced billable hours.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use ledgerline_core::{ClientId, InvoiceId, InvoiceStatus, ProjectId};

use super::{ApiJson, ApiPath, ApiQuery, Deleted, fetch, matches, remove};
use crate::db::Repository;
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriter};
use crate::models::{CreateInvoiceInput, Invoice, UpdateInvoiceInput};
use crate::services::InvoiceService;
use crate::state::AppState;

const KIND: &str = "invoice";

/// Build the invoices router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/invoices", get(list).post(create))
        .route(
            "/api/invoice/{id}",
            get(show).put(update).patch(update).delete(delete),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub client: Option<ClientId>,
    pub project: Option<ProjectId>,
}

/// GET /api/invoices
#[instrument(skip_all)]
async fn list(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<InvoiceFilter>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let invoices = Repository::<Invoice>::new(state.store())
        .list()
        .await?
        .into_iter()
        .filter(|i| {
            matches(filter.status, i.status)
                && matches(filter.client, i.client)
                && (filter.project.is_none() || filter.project == i.project)
        })
        .collect();
    Ok(Json(invoices))
}

/// POST /api/invoices
#[instrument(skip_all, fields(admin = %admin.email))]
async fn create(
    RequireWriter(admin): RequireWriter,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateInvoiceInput>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    let invoice = InvoiceService::new(state.store(), state.invoice_numbering())
        .create(input)
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// GET /api/invoice/{id}
async fn show(
    RequireAdminAuth(_): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<InvoiceId>,
) -> Result<Json<Invoice>, AppError> {
    Ok(Json(fetch(state.store(), id, KIND).await?))
}

/// PUT/PATCH /api/invoice/{id}
async fn update(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<InvoiceId>,
    ApiJson(input): ApiJson<UpdateInvoiceInput>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = InvoiceService::new(state.store(), state.invoice_numbering())
        .update(id, input)
        .await
        .map_err(|e| match e {
            crate::services::InvoiceError::NotFound => AppError::not_found(KIND, id),
            other => other.into(),
        })?;
    Ok(Json(invoice))
}

/// DELETE /api/invoice/{id}
async fn delete(
    RequireWriter(_): RequireWriter,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<InvoiceId>,
) -> Result<Json<Deleted<InvoiceId>>, AppError> {
    remove::<Invoice>(state.store(), id, KIND).await
}
