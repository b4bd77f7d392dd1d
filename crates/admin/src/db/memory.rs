//! In-process document store.
//!
//! Used for local development (`ADMIN_STORE=memory`) and tests. Documents
//! are kept per collection in insertion order; all data is lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Collection, DocumentStore, RepositoryError};

type Documents = Vec<(Uuid, JsonValue)>;

/// Document store held entirely in memory. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<Collection, Documents>>>,
}

impl DocumentStore for MemoryDocumentStore {
    async fn insert(
        &self,
        collection: Collection,
        id: Uuid,
        body: &JsonValue,
    ) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        if documents.iter().any(|(existing, _)| *existing == id) {
            return Err(RepositoryError::Conflict(format!(
                "{collection} document {id} already exists"
            )));
        }

        documents.push((id, body.clone()));
        Ok(())
    }

    async fn get(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<JsonValue>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).and_then(|documents| {
            documents
                .iter()
                .find(|(existing, _)| *existing == id)
                .map(|(_, body)| body.clone())
        }))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<JsonValue>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| documents.iter().map(|(_, body)| body.clone()).collect())
            .unwrap_or_default())
    }

    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        body: &JsonValue,
    ) -> Result<bool, RepositoryError> {
        let mut collections = self.collections.write().await;
        let slot = collections.get_mut(&collection).and_then(|documents| {
            documents
                .iter_mut()
                .find(|(existing, _)| *existing == id)
                .map(|(_, stored)| stored)
        });

        Ok(slot.is_some_and(|stored| {
            *stored = body.clone();
            true
        }))
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, RepositoryError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(&collection) else {
            return Ok(false);
        };

        let before = documents.len();
        documents.retain(|(existing, _)| *existing != id);
        Ok(documents.len() != before)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
