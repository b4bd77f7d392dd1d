//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::Store;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Store,
    invoice_numbering: Mutex<()>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                invoice_numbering: Mutex::new(()),
            }),
        }
    }

    /// Document store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Serializes invoice-number allocation with the insert that follows.
    #[must_use]
    pub fn invoice_numbering(&self) -> &Mutex<()> {
        &self.inner.invoice_numbering
    }
}
