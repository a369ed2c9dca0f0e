//! Storage backend abstraction.
//!
//! The [`StoreBackend`] trait is the single seam between the admin layer and a
//! concrete document store. Backends must be `Send + Sync`; every method takes
//! `&self` so one backend can serve many concurrent requests.
//!
//! - [`StoreBackend`]: the core trait for storage backends
//! - [`DynStoreBackend`]: object-safe mirror used for runtime backend selection
//! - [`StoreBackendBuilder`]: factory trait for creating backend instances
//!
//! # Example
//!
//! ```ignore
//! use docadmin_core::backend::StoreBackend;
//! use bson::doc;
//!
//! let ids = backend
//!     .insert_documents(vec![doc! { "name": "Alice", "age": 30 }], "users")
//!     .await?;
//! let sample = backend.fetch_sample("users", 10).await?;
//! ```

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use std::fmt::Debug;

use crate::{
    error::StoreResult,
    query::{Expr, Query},
};

/// Counts reported by [`StoreBackend::replace_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Abstract interface for document storage backends.
///
/// Documents handed out by a backend always include their `_id`.
///
/// # Error Handling
///
/// Connectivity failures, timeouts and cancelled store calls must be reported
/// as [`StoreError::StoreUnavailable`](crate::error::StoreError::StoreUnavailable)
/// so callers can tell them apart from request errors.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts documents into a collection, creating the collection on demand.
    ///
    /// Documents without an `_id` receive a fresh [`ObjectId`].
    ///
    /// # Returns
    ///
    /// The ids of the inserted documents, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentAlreadyExists`](crate::error::StoreError::DocumentAlreadyExists)
    /// if an id is already taken.
    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
    ) -> StoreResult<Vec<ObjectId>>;

    /// Sets the given fields on one document, leaving other fields untouched.
    ///
    /// An `_id` key in `changes` is ignored.
    ///
    /// # Returns
    ///
    /// The document after the update, or `None` if no document has that id.
    async fn update_document(
        &self,
        id: ObjectId,
        changes: Document,
        collection: &str,
    ) -> StoreResult<Option<Document>>;

    /// Replaces the whole body of one document, keeping its `_id`.
    ///
    /// Nothing is inserted when no document has that id. An `_id` key in
    /// `document` is ignored.
    async fn replace_document(
        &self,
        id: ObjectId,
        document: Document,
        collection: &str,
    ) -> StoreResult<ReplaceOutcome>;

    /// Deletes documents by id. Unknown ids are skipped.
    ///
    /// # Returns
    ///
    /// The number of documents actually removed.
    async fn delete_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<u64>;

    /// Retrieves documents by id. Unknown ids are omitted from the result.
    async fn get_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<Vec<Document>>;

    /// Runs a structured query against a collection.
    ///
    /// Without a sort the result follows the store's natural order. A missing
    /// collection yields an empty result rather than an error.
    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>>;

    /// Counts documents matching an optional filter.
    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> StoreResult<u64>;

    /// Reads up to `size` documents in natural order.
    ///
    /// This is a single bounded read; no cursor is left open afterwards.
    async fn fetch_sample(&self, collection: &str, size: usize) -> StoreResult<Vec<Document>> {
        StoreBackend::query_documents(self, Query::builder().limit(size).build(), collection).await
    }

    /// Creates an empty collection. Creating an existing collection is a no-op
    /// for backends that allow it.
    async fn create_collection(&self, name: &str) -> StoreResult<()>;

    /// Drops a collection and all of its documents.
    ///
    /// # Warning
    ///
    /// This operation is irreversible.
    async fn drop_collection(&self, name: &str) -> StoreResult<()>;

    /// Lists the names of all collections in the store.
    async fn list_collections(&self) -> StoreResult<Vec<String>>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
    ) -> StoreResult<Vec<ObjectId>> {
        StoreBackend::insert_documents(*self, documents, collection).await
    }

    async fn update_document(
        &self,
        id: ObjectId,
        changes: Document,
        collection: &str,
    ) -> StoreResult<Option<Document>> {
        StoreBackend::update_document(*self, id, changes, collection).await
    }

    async fn replace_document(
        &self,
        id: ObjectId,
        document: Document,
        collection: &str,
    ) -> StoreResult<ReplaceOutcome> {
        StoreBackend::replace_document(*self, id, document, collection).await
    }

    async fn delete_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<u64> {
        StoreBackend::delete_documents(*self, ids, collection).await
    }

    async fn get_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<Vec<Document>> {
        StoreBackend::get_documents(*self, ids, collection).await
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>> {
        StoreBackend::query_documents(*self, query, collection).await
    }

    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> StoreResult<u64> {
        StoreBackend::count_documents(*self, filter, collection).await
    }

    async fn fetch_sample(&self, collection: &str, size: usize) -> StoreResult<Vec<Document>> {
        StoreBackend::fetch_sample(*self, collection, size).await
    }

    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        StoreBackend::create_collection(*self, name).await
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        StoreBackend::drop_collection(*self, name).await
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        StoreBackend::list_collections(*self).await
    }
}

/// Object-safe counterpart of [`StoreBackend`].
///
/// Every `StoreBackend` is a `DynStoreBackend` through a blanket impl, and a
/// `Box<dyn DynStoreBackend>` is itself a `StoreBackend`, so generic code works
/// unchanged over a backend chosen at runtime.
#[async_trait]
pub trait DynStoreBackend: Send + Sync + Debug {
    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
    ) -> StoreResult<Vec<ObjectId>>;
    async fn update_document(
        &self,
        id: ObjectId,
        changes: Document,
        collection: &str,
    ) -> StoreResult<Option<Document>>;
    async fn replace_document(
        &self,
        id: ObjectId,
        document: Document,
        collection: &str,
    ) -> StoreResult<ReplaceOutcome>;
    async fn delete_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<u64>;
    async fn get_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<Vec<Document>>;
    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>>;
    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> StoreResult<u64>;
    async fn fetch_sample(&self, collection: &str, size: usize) -> StoreResult<Vec<Document>>;
    async fn create_collection(&self, name: &str) -> StoreResult<()>;
    async fn drop_collection(&self, name: &str) -> StoreResult<()>;
    async fn list_collections(&self) -> StoreResult<Vec<String>>;
    async fn shutdown_boxed(self: Box<Self>) -> StoreResult<()>;
}

#[async_trait]
impl<B: StoreBackend + 'static> DynStoreBackend for B {
    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
    ) -> StoreResult<Vec<ObjectId>> {
        StoreBackend::insert_documents(self, documents, collection).await
    }

    async fn update_document(
        &self,
        id: ObjectId,
        changes: Document,
        collection: &str,
    ) -> StoreResult<Option<Document>> {
        StoreBackend::update_document(self, id, changes, collection).await
    }

    async fn replace_document(
        &self,
        id: ObjectId,
        document: Document,
        collection: &str,
    ) -> StoreResult<ReplaceOutcome> {
        StoreBackend::replace_document(self, id, document, collection).await
    }

    async fn delete_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<u64> {
        StoreBackend::delete_documents(self, ids, collection).await
    }

    async fn get_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<Vec<Document>> {
        StoreBackend::get_documents(self, ids, collection).await
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>> {
        StoreBackend::query_documents(self, query, collection).await
    }

    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> StoreResult<u64> {
        StoreBackend::count_documents(self, filter, collection).await
    }

    async fn fetch_sample(&self, collection: &str, size: usize) -> StoreResult<Vec<Document>> {
        StoreBackend::fetch_sample(self, collection, size).await
    }

    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        StoreBackend::create_collection(self, name).await
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        StoreBackend::drop_collection(self, name).await
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        StoreBackend::list_collections(self).await
    }

    async fn shutdown_boxed(self: Box<Self>) -> StoreResult<()> {
        StoreBackend::shutdown(*self).await
    }
}

#[async_trait]
impl StoreBackend for Box<dyn DynStoreBackend> {
    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
    ) -> StoreResult<Vec<ObjectId>> {
        DynStoreBackend::insert_documents(&**self, documents, collection).await
    }

    async fn update_document(
        &self,
        id: ObjectId,
        changes: Document,
        collection: &str,
    ) -> StoreResult<Option<Document>> {
        DynStoreBackend::update_document(&**self, id, changes, collection).await
    }

    async fn replace_document(
        &self,
        id: ObjectId,
        document: Document,
        collection: &str,
    ) -> StoreResult<ReplaceOutcome> {
        DynStoreBackend::replace_document(&**self, id, document, collection).await
    }

    async fn delete_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<u64> {
        DynStoreBackend::delete_documents(&**self, ids, collection).await
    }

    async fn get_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<Vec<Document>> {
        DynStoreBackend::get_documents(&**self, ids, collection).await
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>> {
        DynStoreBackend::query_documents(&**self, query, collection).await
    }

    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> StoreResult<u64> {
        DynStoreBackend::count_documents(&**self, filter, collection).await
    }

    async fn fetch_sample(&self, collection: &str, size: usize) -> StoreResult<Vec<Document>> {
        DynStoreBackend::fetch_sample(&**self, collection, size).await
    }

    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        DynStoreBackend::create_collection(&**self, name).await
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        DynStoreBackend::drop_collection(&**self, name).await
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        DynStoreBackend::list_collections(&**self).await
    }

    async fn shutdown(self) -> StoreResult<()> {
        DynStoreBackend::shutdown_boxed(self).await
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
