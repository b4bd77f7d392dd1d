//! Session middleware configuration for admin.
//!
//! Sessions are stored in `PostgreSQL` (`ledgerline.session`) in production
//! and in memory otherwise. Cookies are `SameSite=Strict` and expire after
//! 24 hours of inactivity.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "ledgerline_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Schema holding the session table (see the sessions migration).
const SESSION_SCHEMA: &str = "ledgerline";

/// Session table name.
const SESSION_TABLE: &str = "session";

/// Create the `PostgreSQL` session store.
///
/// # Errors
///
/// Returns an error if the schema or table name is rejected.
pub fn postgres_session_store(pool: &PgPool) -> Result<PostgresStore, String> {
    PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)
        .map_err(|e| format!("invalid session schema name: {e}"))?
        .with_table_name(SESSION_TABLE)
        .map_err(|e| format!("invalid session table name: {e}"))
}

/// Create the session layer over any session store.
///
/// `secure` should be true when the admin is served over HTTPS.
#[must_use]
pub fn create_session_layer<S>(store: S, secure: bool) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
