//! Document persistence for the back office.
//!
//! Every record is a JSON document keyed by `(collection, id)`. Two backends
//! implement [`DocumentStore`]:
//!
//! - [`PgDocumentStore`] - `PostgreSQL`, one `JSONB` row per document in
//!   `ledgerline.documents`
//! - [`MemoryDocumentStore`] - in-process maps, for local development and tests
//!
//! [`Repository`] layers typed (de)serialization over whichever backend the
//! [`Store`] wraps.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p ledgerline-cli -- migrate
//! ```

pub mod admin_users;
pub mod memory;
pub mod postgres;

use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use uuid::Uuid;

pub use admin_users::AdminUserRepository;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or does not match the expected shape.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested document was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (duplicate id, duplicate invoice number).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// The named collections documents live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Clients,
    Projects,
    Tickets,
    Invoices,
    BillableHours,
    TeamMembers,
    Announcements,
    WorkSessions,
    AdminUsers,
}

impl Collection {
    /// Collection name as stored in the `collection` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Projects => "projects",
            Self::Tickets => "tickets",
            Self::Invoices => "invoices",
            Self::BillableHours => "billable_hours",
            Self::TeamMembers => "team_members",
            Self::Announcements => "announcements",
            Self::WorkSessions => "work_sessions",
            Self::AdminUsers => "admin_users",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyed store of JSON documents with atomic single-document writes.
///
/// `list` returns documents in insertion order.
pub trait DocumentStore: Send + Sync {
    fn insert(
        &self,
        collection: Collection,
        id: Uuid,
        body: &JsonValue,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn get(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<JsonValue>, RepositoryError>> + Send;

    fn list(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<JsonValue>, RepositoryError>> + Send;

    /// Overwrite an existing document. Returns `false` if it does not exist.
    fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        body: &JsonValue,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Remove a document. Returns `false` if it does not exist.
    fn delete(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Check that the backend is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Enum wrapper for store backends. Dispatches to the concrete implementation.
/// Using an enum instead of `Box<dyn DocumentStore>` because the trait uses RPITIT.
#[derive(Debug, Clone)]
pub enum Store {
    Postgres(PgDocumentStore),
    Memory(MemoryDocumentStore),
}

impl Store {
    /// A fresh, empty in-memory store.
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(MemoryDocumentStore::default())
    }

    /// A store backed by the given `PostgreSQL` pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self::Postgres(PgDocumentStore::new(pool))
    }
}

impl DocumentStore for Store {
    async fn insert(
        &self,
        collection: Collection,
        id: Uuid,
        body: &JsonValue,
    ) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(s) => s.insert(collection, id, body).await,
            Self::Memory(s) => s.insert(collection, id, body).await,
        }
    }

    async fn get(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<JsonValue>, RepositoryError> {
        match self {
            Self::Postgres(s) => s.get(collection, id).await,
            Self::Memory(s) => s.get(collection, id).await,
        }
    }

    async fn list(&self, collection: Collection) -> Result<Vec<JsonValue>, RepositoryError> {
        match self {
            Self::Postgres(s) => s.list(collection).await,
            Self::Memory(s) => s.list(collection).await,
        }
    }

    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        body: &JsonValue,
    ) -> Result<bool, RepositoryError> {
        match self {
            Self::Postgres(s) => s.replace(collection, id, body).await,
            Self::Memory(s) => s.replace(collection, id, body).await,
        }
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, RepositoryError> {
        match self {
            Self::Postgres(s) => s.delete(collection, id).await,
            Self::Memory(s) => s.delete(collection, id).await,
        }
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(s) => s.ping().await,
            Self::Memory(s) => s.ping().await,
        }
    }
}

/// A type persisted as a document in one collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// Collection the documents live in.
    const COLLECTION: Collection;

    /// Typed ID of the document.
    type Id: Copy + Into<Uuid> + Send + Sync;

    /// The document's ID.
    fn id(&self) -> Self::Id;
}

/// Typed access to one collection of a [`Store`].
pub struct Repository<'a, T> {
    store: &'a Store,
    _document: PhantomData<fn() -> T>,
}

impl<'a, T: Document> Repository<'a, T> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            store,
            _document: PhantomData,
        }
    }

    /// List every document in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a stored document does
    /// not deserialize, or a backend error.
    pub async fn list(&self) -> Result<Vec<T>, RepositoryError> {
        self.store
            .list(T::COLLECTION)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Get a document by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored document does
    /// not deserialize, or a backend error.
    pub async fn get(&self, id: T::Id) -> Result<Option<T>, RepositoryError> {
        self.store
            .get(T::COLLECTION, id.into())
            .await?
            .map(decode)
            .transpose()
    }

    /// Get several documents, preserving the order of `ids`.
    ///
    /// Returns the documents found and the IDs that do not exist.
    ///
    /// # Errors
    ///
    /// Returns a backend or corruption error.
    pub async fn get_many(&self, ids: &[T::Id]) -> Result<(Vec<T>, Vec<T::Id>), RepositoryError> {
        let mut found = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for &id in ids {
            match self.get(id).await? {
                Some(document) => found.push(document),
                None => missing.push(id),
            }
        }
        Ok((found, missing))
    }

    /// Whether a document with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns a backend error.
    pub async fn exists(&self, id: T::Id) -> Result<bool, RepositoryError> {
        Ok(self.store.get(T::COLLECTION, id.into()).await?.is_some())
    }

    /// Insert a new document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the ID or a unique field is
    /// already taken.
    pub async fn insert(&self, document: &T) -> Result<(), RepositoryError> {
        let body = encode(document)?;
        self.store
            .insert(T::COLLECTION, document.id().into(), &body)
            .await
    }

    /// Overwrite an existing document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the document does not exist.
    pub async fn replace(&self, document: &T) -> Result<(), RepositoryError> {
        let body = encode(document)?;
        if self
            .store
            .replace(T::COLLECTION, document.id().into(), &body)
            .await?
        {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    /// Delete a document. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns a backend error.
    pub async fn delete(&self, id: T::Id) -> Result<bool, RepositoryError> {
        self.store.delete(T::COLLECTION, id.into()).await
    }
}

fn encode<T: Serialize>(document: &T) -> Result<JsonValue, RepositoryError> {
    serde_json::to_value(document).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: JsonValue) -> Result<T, RepositoryError> {
    serde_json::from_value(body).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
