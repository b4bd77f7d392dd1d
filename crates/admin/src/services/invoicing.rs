//! Invoice aggregation and numbering.
//!
//! An invoice bills a set of billable-hours records belonging to a single
//! client. Its `totalHours` is the sum of the records' hours and its
//! `amount` is `totalHours * hourlyRate`, recomputed whenever the billables,
//! the rate, or the client change.
//!
//! Number allocation scans existing invoices for the highest sequence of the
//! current year. The scan and the insert that follows run under one async
//! mutex so concurrent creations never pick the same number.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::instrument;

use ledgerline_core::{BillableHoursId, ClientId, HoursTotals, InvoiceId, InvoiceNumber};

use super::references::{ReferenceError, References};
use crate::db::{Repository, RepositoryError, Store};
use crate::models::{BillableHours, CreateInvoiceInput, Invoice, UpdateInvoiceInput};

/// Errors from invoice creation and update.
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("an invoice needs at least one billable-hours record")]
    EmptyBillables,

    #[error("billable-hours records not found: {}", join(.0))]
    UnknownBillables(Vec<BillableHoursId>),

    #[error("billable-hours records are marked non-billable: {}", join(.0))]
    NotBillable(Vec<BillableHoursId>),

    #[error("all billable-hours records must belong to the same client")]
    MixedClients,

    #[error("invoice client {requested} does not match the billables' client {actual}")]
    ClientMismatch {
        requested: ClientId,
        actual: ClientId,
    },

    #[error("hourlyRate must not be negative")]
    NegativeRate,

    #[error("totalHours or amount is too large")]
    AmountOverflow,

    #[error("no invoice numbers left for {0}")]
    NumbersExhausted(i32),

    #[error("invoice number {0} already exists")]
    DuplicateNumber(InvoiceNumber),

    #[error("invoice not found")]
    NotFound,

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn join(ids: &[BillableHoursId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sum the hours of `billables` and price them at `hourly_rate`.
///
/// Returns the single client the records belong to along with the totals.
///
/// # Errors
///
/// Fails if the list is empty, the rate is negative, any record is flagged
/// non-billable, the records span more than one client, or the totals do
/// not fit in a `Decimal`.
pub fn aggregate(
    billables: &[BillableHours],
    hourly_rate: Decimal,
) -> Result<(ClientId, HoursTotals), InvoiceError> {
    let first = billables.first().ok_or(InvoiceError::EmptyBillables)?;
    if hourly_rate < Decimal::ZERO {
        return Err(InvoiceError::NegativeRate);
    }

    let non_billable: Vec<_> = billables
        .iter()
        .filter(|record| !record.billable)
        .map(|record| record.id)
        .collect();
    if !non_billable.is_empty() {
        return Err(InvoiceError::NotBillable(non_billable));
    }

    if billables.iter().any(|record| record.client != first.client) {
        return Err(InvoiceError::MixedClients);
    }

    let totals = HoursTotals::compute(billables.iter().map(|r| r.total_hours), hourly_rate)
        .ok_or(InvoiceError::AmountOverflow)?;
    Ok((first.client, totals))
}

/// Collapse repeated IDs, keeping first occurrences in order.
fn dedup(ids: &[BillableHoursId]) -> Vec<BillableHoursId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Creates and updates invoices.
pub struct InvoiceService<'a> {
    store: &'a Store,
    numbering: &'a Mutex<()>,
}

impl<'a> InvoiceService<'a> {
    /// `numbering` must be shared by every service instance in the process.
    #[must_use]
    pub const fn new(store: &'a Store, numbering: &'a Mutex<()>) -> Self {
        Self { store, numbering }
    }

    /// Create an invoice, numbering it for the current year if no number is
    /// supplied.
    ///
    /// # Errors
    ///
    /// See [`InvoiceError`].
    pub async fn create(&self, input: CreateInvoiceInput) -> Result<Invoice, InvoiceError> {
        self.create_at(input, Utc::now()).await
    }

    /// Create an invoice as of `now`; the year of `now` picks the number series.
    ///
    /// # Errors
    ///
    /// See [`InvoiceError`].
    #[instrument(skip(self, input), fields(billables = input.billables.len()))]
    pub async fn create_at(
        &self,
        input: CreateInvoiceInput,
        now: DateTime<Utc>,
    ) -> Result<Invoice, InvoiceError> {
        let billable_ids = dedup(&input.billables);
        let records = self.load_billables(&billable_ids).await?;
        let (client, totals) = aggregate(&records, input.hourly_rate)?;
        check_client(input.client, client)?;
        References::new(self.store)
            .client_project(Some(client), input.project)
            .await?;

        let _guard = self.numbering.lock().await;
        let invoices = Repository::<Invoice>::new(self.store);
        let existing = invoices.list().await?;

        let invoice_number = match input.invoice_number {
            Some(number) => number,
            None => InvoiceNumber::next_for_year(
                now.year(),
                existing.iter().map(|invoice| invoice.invoice_number),
            )
            .ok_or(InvoiceError::NumbersExhausted(now.year()))?,
        };
        if existing.iter().any(|i| i.invoice_number == invoice_number) {
            return Err(InvoiceError::DuplicateNumber(invoice_number));
        }

        let invoice = Invoice {
            id: InvoiceId::generate(),
            invoice_number,
            client,
            project: input.project,
            billables: billable_ids,
            hourly_rate: input.hourly_rate,
            total_hours: totals.total_hours,
            amount: totals.amount,
            status: input.status.unwrap_or_default(),
            due_date: input.due_date,
            notes: input.notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
            created_at: now,
            updated_at: now,
        };

        invoices
            .insert(&invoice)
            .await
            .map_err(|e| duplicate_or(e, invoice_number))?;

        tracing::info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            amount = %invoice.amount,
            "Invoice created"
        );
        Ok(invoice)
    }

    /// Apply a partial update, recomputing totals when the billables, the
    /// rate, or the client are supplied. Stored billables are re-read so
    /// their current hours are used.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` if the invoice does not exist; other
    /// variants as for creation.
    #[instrument(skip(self, input), fields(invoice_id = %id))]
    pub async fn update(
        &self,
        id: InvoiceId,
        input: UpdateInvoiceInput,
    ) -> Result<Invoice, InvoiceError> {
        let invoices = Repository::<Invoice>::new(self.store);
        let _guard = self.numbering.lock().await;

        let mut invoice = invoices.get(id).await?.ok_or(InvoiceError::NotFound)?;

        if input.affects_totals() {
            let billable_ids = input
                .billables
                .as_deref()
                .map_or_else(|| invoice.billables.clone(), dedup);
            let hourly_rate = input.hourly_rate.unwrap_or(invoice.hourly_rate);

            let records = self.load_billables(&billable_ids).await?;
            let (client, totals) = aggregate(&records, hourly_rate)?;
            check_client(input.client, client)?;

            invoice.client = client;
            invoice.billables = billable_ids;
            invoice.hourly_rate = hourly_rate;
            invoice.set_totals(totals);
        }

        if let Some(number) = input.invoice_number
            && number != invoice.invoice_number
            && invoices
                .list()
                .await?
                .iter()
                .any(|other| other.id != id && other.invoice_number == number)
        {
            return Err(InvoiceError::DuplicateNumber(number));
        }

        invoice.apply_details(&input, Utc::now());
        References::new(self.store)
            .client_project(Some(invoice.client), invoice.project)
            .await?;

        invoices
            .replace(&invoice)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => InvoiceError::NotFound,
                other => duplicate_or(other, invoice.invoice_number),
            })?;

        Ok(invoice)
    }

    async fn load_billables(
        &self,
        ids: &[BillableHoursId],
    ) -> Result<Vec<BillableHours>, InvoiceError> {
        let (records, missing) = Repository::<BillableHours>::new(self.store)
            .get_many(ids)
            .await?;
        if !missing.is_empty() {
            return Err(InvoiceError::UnknownBillables(missing));
        }
        Ok(records)
    }
}

/// IDs of every billable-hours record referenced by some invoice.
///
/// # Errors
///
/// Returns a backend or corruption error.
pub async fn billed_ids(store: &Store) -> Result<HashSet<BillableHoursId>, RepositoryError> {
    Ok(Repository::<Invoice>::new(store)
        .list()
        .await?
        .into_iter()
        .flat_map(|invoice| invoice.billables)
        .collect())
}

fn check_client(requested: Option<ClientId>, actual: ClientId) -> Result<(), InvoiceError> {
    match requested {
        Some(requested) if requested != actual => {
            Err(InvoiceError::ClientMismatch { requested, actual })
        }
        _ => Ok(()),
    }
}

fn duplicate_or(e: RepositoryError, number: InvoiceNumber) -> InvoiceError {
    match e {
        RepositoryError::Conflict(_) => InvoiceError::DuplicateNumber(number),
        other => InvoiceError::Repository(other),
    }
}
