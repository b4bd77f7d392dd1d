//! Ledgerline Core - Shared domain types.
//!
//! This crate provides the types used across all Ledgerline components:
//! - `admin` - JSON API server for the back office
//! - `cli` - Command-line tools for migrations, admin users, and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure arithmetic - no I/O, no
//! database access, no HTTP. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, statuses, emails, invoice numbers, and hour totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
