//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Argon2 password login and admin-user creation
//! - `dashboard` - Summary counts and totals
//! - `invoicing` - Billable-hours aggregation and invoice numbering
//! - `references` - Referential checks across documents
//! - `timer` - Work-session stopwatch

pub mod auth;
pub mod dashboard;
pub mod invoicing;
pub mod references;
pub mod timer;

pub use auth::{AdminAuthError, AdminAuthService};
pub use dashboard::{DashboardSummary, summarize};
pub use invoicing::{InvoiceError, InvoiceService, aggregate, billed_ids};
pub use references::{ReferenceError, References};
pub use timer::{TimerError, TimerService};
