//! Admin authentication service.
//!
//! Email and password login with Argon2id hashes stored on the admin user
//! document.

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use tracing::instrument;

use ledgerline_core::{AdminRole, AdminUserId, Email};

use crate::db::admin_users::AdminUserRepository;
use crate::db::{RepositoryError, Store};
use crate::models::admin_user::AdminUser;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            users: AdminUserRepository::new(store),
        }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the email is unknown or
    /// the password does not match.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }

    /// Create a new admin user.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AdminAuthError::WeakPassword` if the password is too short.
    /// Returns `AdminAuthError::UserAlreadyExists` if the email is taken.
    #[instrument(skip(self, password))]
    pub async fn create_admin(
        &self,
        email: &str,
        name: &str,
        role: AdminRole,
        password: &str,
    ) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AdminAuthError::MissingName);
        }
        validate_password(password)?;

        let now = Utc::now();
        let user = AdminUser {
            id: AdminUserId::generate(),
            email,
            name: name.to_owned(),
            role,
            password_hash: hash_password(password)?,
            created_at: now,
            updated_at: now,
        };

        self.users.create(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminAuthError::UserAlreadyExists,
            other => AdminAuthError::Repository(other),
        })?;

        tracing::info!(admin_id = %user.id, email = %user.email, role = %user.role, "Admin user created");
        Ok(user)
    }

    /// Create a super admin with this email unless one already exists.
    ///
    /// Returns `true` if a user was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is invalid or the store fails.
    pub async fn ensure_super_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<bool, AdminAuthError> {
        let parsed = Email::parse(email)?;
        if self.users.get_by_email(&parsed).await?.is_some() {
            return Ok(false);
        }

        match self
            .create_admin(email, "Administrator", AdminRole::SuperAdmin, password)
            .await
        {
            Ok(_) => Ok(true),
            Err(AdminAuthError::UserAlreadyExists) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AdminAuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminAuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminAuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_login() {
        let store = Store::memory();
        let auth = AdminAuthService::new(&store);
        let created = auth
            .create_admin("ops@example.com", "Ops", AdminRole::Admin, "correct horse")
            .await
            .unwrap();
        assert!(created.password_hash.starts_with("$argon2id$"));

        let user = auth.login("Ops@Example.com", "correct horse").await.unwrap();
        assert_eq!(user.id, created.id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email() {
        let store = Store::memory();
        let auth = AdminAuthService::new(&store);
        auth.create_admin("ops@example.com", "Ops", AdminRole::Viewer, "correct horse")
            .await
            .unwrap();

        assert!(matches!(
            auth.login("ops@example.com", "wrong horse").await,
            Err(AdminAuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@example.com", "correct horse").await,
            Err(AdminAuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("not-an-email", "correct horse").await,
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_weak_password_and_duplicates() {
        let store = Store::memory();
        let auth = AdminAuthService::new(&store);

        assert!(matches!(
            auth.create_admin("ops@example.com", "Ops", AdminRole::Admin, "short")
                .await,
            Err(AdminAuthError::WeakPassword(_))
        ));

        auth.create_admin("ops@example.com", "Ops", AdminRole::Admin, "long enough")
            .await
            .unwrap();
        assert!(matches!(
            auth.create_admin("ops@example.com", "Ops", AdminRole::Admin, "long enough")
                .await,
            Err(AdminAuthError::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_ensure_super_admin_is_idempotent() {
        let store = Store::memory();
        let auth = AdminAuthService::new(&store);

        assert!(auth.ensure_super_admin("root@example.com", "long enough").await.unwrap());
        assert!(!auth.ensure_super_admin("root@example.com", "long enough").await.unwrap());

        let user = auth.login("root@example.com", "long enough").await.unwrap();
        assert_eq!(user.role, AdminRole::SuperAdmin);
    }
}
