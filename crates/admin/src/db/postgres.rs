//! `PostgreSQL` document store.
//!
//! All collections share `ledgerline.documents`; each row is one document
//! with its body in a `JSONB` column. Queries use runtime-checked `sqlx`
//! statements because document bodies are untyped `JSONB`.

use serde_json::Value as JsonValue;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{Collection, DocumentStore, RepositoryError};

/// Unique index on invoice numbers (see the initial migration).
const INVOICE_NUMBER_CONSTRAINT: &str = "idx_documents_invoice_number";

/// Unique index on admin login emails.
const ADMIN_EMAIL_CONSTRAINT: &str = "idx_documents_admin_email";

/// Primary key of the documents table.
const PRIMARY_KEY_CONSTRAINT: &str = "documents_pkey";

/// Document store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate unique violations into `RepositoryError::Conflict`.
fn map_write_error(collection: Collection, id: Uuid, e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        match db_err.constraint() {
            Some(INVOICE_NUMBER_CONSTRAINT) => {
                return RepositoryError::Conflict("Invoice number already exists".to_string());
            }
            Some(ADMIN_EMAIL_CONSTRAINT) => {
                return RepositoryError::Conflict("Admin user already exists".to_string());
            }
            Some(PRIMARY_KEY_CONSTRAINT) => {
                return RepositoryError::Conflict(format!(
                    "{collection} document {id} already exists"
                ));
            }
            _ => {}
        }
    }
    RepositoryError::Database(e)
}

impl DocumentStore for PgDocumentStore {
    async fn insert(
        &self,
        collection: Collection,
        id: Uuid,
        body: &JsonValue,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO ledgerline.documents (collection, id, body)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(collection, id, e))?;

        Ok(())
    }

    async fn get(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<JsonValue>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT body FROM ledgerline.documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.try_get::<JsonValue, _>("body")).transpose()?)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<JsonValue>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT body FROM ledgerline.documents
            WHERE collection = $1
            ORDER BY seq
            ",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<JsonValue, _>("body").map_err(RepositoryError::from))
            .collect()
    }

    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        body: &JsonValue,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE ledgerline.documents
            SET body = $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(collection, id, e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM ledgerline.documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
