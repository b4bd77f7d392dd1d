//! Ledgerline back-office library.
//!
//! JSON API over a document store for clients, projects, tickets, invoices,
//! billable hours, team members and announcements. Split out of the binary
//! so the router can be driven from tests and the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
