//! Dashboard summary.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use ledgerline_core::{InvoiceStatus, checked_sum};

use super::invoicing::billed_ids;
use crate::db::{Repository, RepositoryError, Store};
use crate::models::{
    Announcement, BillableHours, Client, Invoice, Project, TeamMember, Ticket, WorkSession,
};

/// Document counts per resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCounts {
    pub clients: usize,
    pub projects: usize,
    pub tickets: usize,
    pub invoices: usize,
    pub billables: usize,
    pub team: usize,
    pub announcements: usize,
    pub running_timers: usize,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub counts: ResourceCounts,
    /// Tickets that are `open` or `in_progress`.
    pub open_tickets: usize,
    /// Billable hours not yet referenced by any invoice.
    pub unbilled_hours: Decimal,
    /// Sum of invoice amounts keyed by status; every status is present.
    pub invoice_totals: BTreeMap<&'static str, Decimal>,
}

/// Build the dashboard summary from the current store contents.
///
/// # Errors
///
/// Returns a store error, or `RepositoryError::DataCorruption` if the
/// stored hours or amounts cannot be summed without overflow.
pub async fn summarize(store: &Store) -> Result<DashboardSummary, RepositoryError> {
    let tickets = Repository::<Ticket>::new(store).list().await?;
    let invoices = Repository::<Invoice>::new(store).list().await?;
    let billables = Repository::<BillableHours>::new(store).list().await?;
    let billed = billed_ids(store).await?;

    let counts = ResourceCounts {
        clients: Repository::<Client>::new(store).list().await?.len(),
        projects: Repository::<Project>::new(store).list().await?.len(),
        tickets: tickets.len(),
        invoices: invoices.len(),
        billables: billables.len(),
        team: Repository::<TeamMember>::new(store).list().await?.len(),
        announcements: Repository::<Announcement>::new(store).list().await?.len(),
        running_timers: Repository::<WorkSession>::new(store).list().await?.len(),
    };

    let unbilled_hours = checked_sum(
        billables
            .iter()
            .filter(|record| record.billable && !billed.contains(&record.id))
            .map(|record| record.total_hours),
    )
    .ok_or_else(|| RepositoryError::DataCorruption("unbilled hours overflow".to_string()))?;

    let mut invoice_totals: BTreeMap<&'static str, Decimal> = InvoiceStatus::ALL
        .iter()
        .map(|status| (status.as_str(), Decimal::ZERO))
        .collect();
    for invoice in &invoices {
        let total = invoice_totals.entry(invoice.status.as_str()).or_default();
        *total = total.checked_add(invoice.amount).ok_or_else(|| {
            RepositoryError::DataCorruption("invoice totals overflow".to_string())
        })?;
    }

    Ok(DashboardSummary {
        counts,
        open_tickets: tickets.iter().filter(|t| t.status.is_open()).count(),
        unbilled_hours,
        invoice_totals,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use ledgerline_core::{BillableHoursId, ClientId, ProjectId};

    use super::*;

    fn billable(hours: Decimal) -> BillableHours {
        let now = Utc::now();
        BillableHours {
            id: BillableHoursId::generate(),
            start_time: now,
            end_time: now,
            billable: true,
            total_hours: hours,
            project: ProjectId::generate(),
            client: ClientId::generate(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let summary = summarize(&Store::memory()).await.unwrap();

        assert_eq!(summary.counts, ResourceCounts::default());
        assert_eq!(summary.open_tickets, 0);
        assert_eq!(summary.unbilled_hours, Decimal::ZERO);
        assert_eq!(summary.invoice_totals.len(), InvoiceStatus::ALL.len());
        assert_eq!(summary.invoice_totals["paid"], Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_unbilled_hours() {
        let store = Store::memory();
        let repo = Repository::<BillableHours>::new(&store);
        repo.insert(&billable(Decimal::new(15, 1))).await.unwrap();
        repo.insert(&billable(Decimal::new(25, 1))).await.unwrap();

        let summary = summarize(&store).await.unwrap();
        assert_eq!(summary.counts.billables, 2);
        assert_eq!(summary.unbilled_hours, Decimal::new(4, 0));
    }

    #[tokio::test]
    async fn test_overflowing_hours_are_an_error() {
        let store = Store::memory();
        let repo = Repository::<BillableHours>::new(&store);
        repo.insert(&billable(Decimal::MAX)).await.unwrap();
        repo.insert(&billable(Decimal::MAX)).await.unwrap();

        assert!(matches!(
            summarize(&store).await,
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
