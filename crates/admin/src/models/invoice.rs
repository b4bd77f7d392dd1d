//! Invoice domain model.
//!
//! Totals are never accepted from input: `totalHours` and `amount` are
//! derived from the referenced billables by the invoicing service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_core::{
    BillableHoursId, ClientId, HoursTotals, InvoiceId, InvoiceNumber, InvoiceStatus, ProjectId,
};

use super::optional_text;
use crate::db::{Collection, Document};

/// A bill for a set of billable hours at one hourly rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: InvoiceNumber,
    pub client: ClientId,
    pub project: Option<ProjectId>,
    pub billables: Vec<BillableHoursId>,
    pub hourly_rate: Decimal,
    pub total_hours: Decimal,
    pub amount: Decimal,
    pub status: InvoiceStatus,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Invoice {
    const COLLECTION: Collection = Collection::Invoices;
    type Id = InvoiceId;

    fn id(&self) -> InvoiceId {
        self.id
    }
}

/// Input for creating an invoice.
///
/// `client` may be omitted; it is taken from the billables.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceInput {
    pub invoice_number: Option<InvoiceNumber>,
    pub client: Option<ClientId>,
    pub project: Option<ProjectId>,
    pub billables: Vec<BillableHoursId>,
    pub hourly_rate: Decimal,
    pub status: Option<InvoiceStatus>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Input for updating an invoice.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceInput {
    pub invoice_number: Option<InvoiceNumber>,
    pub client: Option<ClientId>,
    pub project: Option<ProjectId>,
    pub billables: Option<Vec<BillableHoursId>>,
    pub hourly_rate: Option<Decimal>,
    pub status: Option<InvoiceStatus>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl UpdateInvoiceInput {
    /// Whether this update touches an input of the derived totals.
    #[must_use]
    pub const fn affects_totals(&self) -> bool {
        self.billables.is_some() || self.hourly_rate.is_some() || self.client.is_some()
    }
}

impl Invoice {
    /// Apply the fields that do not feed the totals.
    pub fn apply_details(&mut self, input: &UpdateInvoiceInput, now: DateTime<Utc>) {
        if let Some(number) = input.invoice_number {
            self.invoice_number = number;
        }
        if input.project.is_some() {
            self.project = input.project;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if input.due_date.is_some() {
            self.due_date = input.due_date;
        }
        if input.notes.is_some() {
            self.notes = optional_text(input.notes.clone());
        }
        self.updated_at = now;
    }

    /// Store freshly computed totals.
    pub const fn set_totals(&mut self, totals: HoursTotals) {
        self.total_hours = totals.total_hours;
        self.amount = totals.amount;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_create_input_parses_number_and_rate() {
        let input: CreateInvoiceInput = serde_json::from_value(json!({
            "invoiceNumber": "INV-2026-0007",
            "billables": [BillableHoursId::generate()],
            "hourlyRate": 95,
        }))
        .unwrap();

        assert_eq!(input.invoice_number, Some(InvoiceNumber::new(2026, 7)));
        assert_eq!(input.hourly_rate, Decimal::new(95, 0));
        assert!(input.client.is_none());
    }

    #[test]
    fn test_malformed_number_rejected() {
        let result: Result<CreateInvoiceInput, _> = serde_json::from_value(json!({
            "invoiceNumber": "2026-7",
            "billables": [],
            "hourlyRate": "10",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_affects_totals() {
        assert!(!UpdateInvoiceInput::default().affects_totals());
        let update = UpdateInvoiceInput {
            hourly_rate: Some(Decimal::ONE),
            ..Default::default()
        };
        assert!(update.affects_totals());
    }
}
