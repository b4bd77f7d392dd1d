//! Domain models for the back office.
//!
//! Each document type comes with a `Create*Input` (required fields are plain
//! values, so a missing field fails deserialization) and an `Update*Input`
//! whose absent fields keep their stored values. PUT and PATCH share the
//! update inputs.

pub mod admin_user;
pub mod announcement;
pub mod billable;
pub mod client;
pub mod invoice;
pub mod project;
pub mod session;
pub mod team;
pub mod ticket;
pub mod work_session;

use thiserror::Error;

pub use admin_user::AdminUser;
pub use announcement::{Announcement, CreateAnnouncementInput, UpdateAnnouncementInput};
pub use billable::{BillableHours, CreateBillableInput, UpdateBillableInput};
pub use client::{Client, CreateClientInput, UpdateClientInput};
pub use invoice::{CreateInvoiceInput, Invoice, UpdateInvoiceInput};
pub use project::{CreateProjectInput, Project, UpdateProjectInput};
pub use session::{CurrentAdmin, keys as session_keys};
pub use team::{CreateTeamMemberInput, TeamMember, UpdateTeamMemberInput};
pub use ticket::{CreateTicketInput, Ticket, UpdateTicketInput};
pub use work_session::{StartWorkSessionInput, WorkSession};

/// A document failed field-level validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Trim a required text field, rejecting blank values.
///
/// # Errors
///
/// Returns `ValidationError` if the value is empty after trimming.
pub fn required_text(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional text field; blank values become `None`.
#[must_use]
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
