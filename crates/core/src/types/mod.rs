//! Core types for Ledgerline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod hours;
pub mod id;
pub mod invoice_number;
pub mod status;

pub use email::{Email, EmailError};
pub use hours::{HoursTotals, checked_sum, hours_between};
pub use id::*;
pub use invoice_number::{InvoiceNumber, InvoiceNumberError};
pub use status::*;
