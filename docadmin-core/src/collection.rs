//! Collection handles.
//!
//! A [`Collection`] binds a collection name to a backend reference so callers
//! don't have to thread the name through every call.
//!
//! # Example
//!
//! ```ignore
//! use bson::doc;
//!
//! let products = store.collection("products");
//! let ids = products.insert(vec![doc! { "name": "A", "price": 9.99 }]).await?;
//! let sample = products.sample(10).await?;
//! ```

use bson::{Document, oid::ObjectId};

use crate::{
    backend::{ReplaceOutcome, StoreBackend},
    error::StoreResult,
    query::{Expr, Query},
};

/// A named collection with a reference to a storage backend.
#[derive(Debug)]
pub struct Collection<'a, B: StoreBackend> {
    name: String,
    backend: &'a B,
}

impl<'a, B: StoreBackend> Collection<'a, B> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts documents, assigning ids where missing.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if an id is taken or the store fails.
    pub async fn insert(&self, documents: Vec<Document>) -> StoreResult<Vec<ObjectId>> {
        self.backend
            .insert_documents(documents, self.name())
            .await
    }

    /// Sets fields on a single document and returns the updated document.
    pub async fn update(&self, id: ObjectId, changes: Document) -> StoreResult<Option<Document>> {
        self.backend
            .update_document(id, changes, self.name())
            .await
    }

    /// Replaces a document's body without upserting.
    pub async fn replace(&self, id: ObjectId, document: Document) -> StoreResult<ReplaceOutcome> {
        self.backend
            .replace_document(id, document, self.name())
            .await
    }

    /// Deletes documents by id and returns how many were removed.
    pub async fn delete(&self, ids: Vec<ObjectId>) -> StoreResult<u64> {
        self.backend
            .delete_documents(ids, self.name())
            .await
    }

    /// Retrieves documents by id. Missing ids are omitted.
    pub async fn get(&self, ids: Vec<ObjectId>) -> StoreResult<Vec<Document>> {
        self.backend
            .get_documents(ids, self.name())
            .await
    }

    /// Retrieves a single document by id.
    pub async fn get_one(&self, id: ObjectId) -> StoreResult<Option<Document>> {
        Ok(self.get(vec![id]).await?.into_iter().next())
    }

    /// Runs a structured query against this collection.
    pub async fn query(&self, query: Query) -> StoreResult<Vec<Document>> {
        self.backend
            .query_documents(query, self.name())
            .await
    }

    /// Counts documents matching an optional filter.
    pub async fn count(&self, filter: Option<Expr>) -> StoreResult<u64> {
        self.backend
            .count_documents(filter, self.name())
            .await
    }

    /// Reads up to `size` documents in natural order.
    pub async fn sample(&self, size: usize) -> StoreResult<Vec<Document>> {
        self.backend
            .fetch_sample(self.name(), size)
            .await
    }
}
