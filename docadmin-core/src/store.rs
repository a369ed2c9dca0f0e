//! Store handle wrapping a backend.
//!
//! [`DocumentStore`] is generic over its backend. [`DynDocumentStore`] is the
//! same type over a boxed backend chosen at runtime, for example from
//! configuration.
//!
//! # Example
//!
//! ```ignore
//! use docadmin_core::store::DocumentStore;
//!
//! let store = DocumentStore::new(backend);
//! let names = store.list_collections().await?;
//! let dyn_store = store.into_dyn();
//! ```

use crate::{backend::StoreBackend, collection::Collection, error::StoreResult};

/// A document store bound to a backend implementation.
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

/// A document store whose backend was selected at runtime.
pub type DynDocumentStore = DocumentStore<Box<dyn crate::backend::DynStoreBackend>>;

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Gets a handle for the collection with the given name.
    pub fn collection<'a>(&'a self, name: &str) -> Collection<'a, B> {
        Collection::new(name.to_string(), &self.backend)
    }

    /// Creates a new collection with the given name.
    pub async fn create_collection(&self, name: &str) -> StoreResult<()> {
        self.backend.create_collection(name).await
    }

    /// Drops a collection and every document in it.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection does not exist or deletion fails.
    pub async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        self.backend.drop_collection(name).await
    }

    /// Lists all collections in the store.
    pub async fn list_collections(&self) -> StoreResult<Vec<String>> {
        self.backend.list_collections().await
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> StoreResult<()> {
        self.backend.shutdown().await
    }
}

impl<B: StoreBackend + 'static> DocumentStore<B> {
    /// Erases the backend type.
    pub fn into_dyn(self) -> DynDocumentStore {
        DocumentStore::new(Box::new(self.backend) as Box<dyn crate::backend::DynStoreBackend>)
    }
}
