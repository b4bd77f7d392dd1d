//! Admin user repository.
//!
//! Admin users are ordinary documents; lookups by email scan the collection,
//! which stays small.

use ledgerline_core::{AdminUserId, Email};

use super::{Repository, RepositoryError, Store};
use crate::models::admin_user::AdminUser;

/// Repository for admin user documents.
pub struct AdminUserRepository<'a> {
    documents: Repository<'a, AdminUser>,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            documents: Repository::new(store),
        }
    }

    /// Get an admin user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store read fails.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        self.documents.get(id).await
    }

    /// Get an admin user by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store read fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<AdminUser>, RepositoryError> {
        Ok(self
            .documents
            .list()
            .await?
            .into_iter()
            .find(|user| user.email == *email))
    }

    /// Insert a new admin user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create(&self, user: &AdminUser) -> Result<(), RepositoryError> {
        if self.get_by_email(&user.email).await?.is_some() {
            return Err(RepositoryError::Conflict(
                "Admin user already exists".to_string(),
            ));
        }
        self.documents.insert(user).await
    }
}
