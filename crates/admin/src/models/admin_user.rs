//! Admin user domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerline_core::{AdminRole, AdminUserId, Email};

use crate::db::{Collection, Document};

/// A back-office login.
///
/// Stored like every other document but never exposed as a CRUD resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for AdminUser {
    const COLLECTION: Collection = Collection::AdminUsers;
    type Id = AdminUserId;

    fn id(&self) -> AdminUserId {
        self.id
    }
}
