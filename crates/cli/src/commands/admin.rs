//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! ll-cli admin create -e admin@example.com -n "Admin Name" -r super_admin -p '...'
//! ```

use ledgerline_admin::db::Store;
use ledgerline_admin::services::{AdminAuthError, AdminAuthService};
use ledgerline_core::{AdminRole, AdminUserId};
use thiserror::Error;

use super::ConnectError;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    #[error(transparent)]
    Auth(#[from] AdminAuthError),
}

/// Create a new admin user with a password login.
///
/// # Returns
///
/// The ID of the created admin user.
///
/// # Errors
///
/// Returns an error if the role or email is invalid, the password is too
/// short, the email is taken, or the database is unreachable.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<AdminUserId, AdminError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;

    let store = Store::postgres(super::connect().await?);

    tracing::info!("Creating admin user: {} ({})", email, role);
    let user = AdminAuthService::new(&store)
        .create_admin(email, name, role, password)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(user.id)
}
