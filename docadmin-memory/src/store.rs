//! In-memory storage implementation.
//!
//! Documents live in insertion-ordered maps behind an async read-write lock, so
//! the natural retrieval order is stable and matches insertion order.

use std::sync::Arc;
use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use indexmap::IndexMap;
use mea::rwlock::RwLock;

use docadmin_core::{
    backend::{ReplaceOutcome, StoreBackend, StoreBackendBuilder},
    document::{ID_FIELD, ensure_object_id},
    error::{StoreError, StoreResult},
    query::{Expr, Query, SortDirection},
};

use crate::evaluator::{DocumentEvaluator, compare_field};

type CollectionMap = IndexMap<ObjectId, Document>;
type StoreMap = IndexMap<String, CollectionMap>;


/// Thread-safe in-memory document storage backend.
///
/// Clones share the same underlying data.
///
/// # Example
///
/// ```ignore
/// use docadmin_memory::InMemoryStore;
/// use docadmin_core::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let ids = store.insert_documents(vec![doc! { "name": "Alice" }], "users").await?;
/// let docs = store.get_documents(ids, "users").await?;
/// assert_eq!(docs.len(), 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> (document id -> document)
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    fn select(collection_map: &CollectionMap, filter: Option<&Expr>) -> StoreResult<Vec<Document>> {
        let mut selected = Vec::new();

        for document in collection_map.values() {
            if DocumentEvaluator::matches(document, filter)? {
                selected.push(document.clone());
            }
        }

        Ok(selected)
    }
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_documents(&self, documents: Vec<Document>, collection: &str) -> StoreResult<Vec<ObjectId>> {
        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.to_string())
            .or_default();

        let mut prepared = Vec::with_capacity(documents.len());
        for mut document in documents {
            let id = ensure_object_id(&mut document)?;

            if collection_map.contains_key(&id) || prepared.iter().any(|(seen, _)| *seen == id) {
                return Err(StoreError::DocumentAlreadyExists(id.to_hex(), collection.to_string()));
            }

            prepared.push((id, document));
        }

        let ids = prepared.iter().map(|(id, _)| *id).collect();
        collection_map.extend(prepared);

        Ok(ids)
    }

    async fn update_document(&self, id: ObjectId, changes: Document, collection: &str) -> StoreResult<Option<Document>> {
        let mut store = self.store.write().await;
        let Some(document) = store
            .get_mut(collection)
            .and_then(|collection_map| collection_map.get_mut(&id))
        else {
            return Ok(None);
        };

        for (key, value) in changes {
            if key != ID_FIELD {
                document.insert(key, value);
            }
        }

        Ok(Some(document.clone()))
    }

    async fn replace_document(&self, id: ObjectId, document: Document, collection: &str) -> StoreResult<ReplaceOutcome> {
        let mut store = self.store.write().await;
        let Some(existing) = store
            .get_mut(collection)
            .and_then(|collection_map| collection_map.get_mut(&id))
        else {
            return Ok(ReplaceOutcome::default());
        };

        let mut replacement = Document::new();
        replacement.insert(ID_FIELD, id);
        for (key, value) in document {
            if key != ID_FIELD {
                replacement.insert(key, value);
            }
        }

        let modified = *existing != replacement;
        *existing = replacement;

        Ok(ReplaceOutcome { matched: 1, modified: modified as u64 })
    }

    async fn delete_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(collection) else {
            return Ok(0);
        };

        Ok(ids
            .iter()
            .filter(|id| collection_map.shift_remove(*id).is_some())
            .count() as u64)
    }

    async fn get_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(vec![]);
        };

        Ok(ids
            .iter()
            .filter_map(|id| collection_map.get(id).cloned())
            .collect())
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut documents = Self::select(collection_map, query.filter.as_ref())?;

        if let Some(sort) = &query.sort {
            // sort_by is stable, so ties keep insertion order
            documents.sort_by(|a, b| match sort.direction {
                SortDirection::Asc => compare_field(a, b, &sort.field),
                SortDirection::Desc => compare_field(b, a, &sort.field),
            });
        }

        Ok(documents
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> StoreResult<u64> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(0);
        };

        let mut count = 0;
        for document in collection_map.values() {
            if DocumentEvaluator::matches(document, filter.as_ref())? {
                count += 1;
            }
        }

        Ok(count)
    }

    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        self.store
            .write()
            .await
            .entry(name.to_string())
            .or_default();

        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        let mut store = self.store.write().await;

        if store.shift_remove(name).is_none() {
            return Err(StoreError::CollectionNotFound(name.to_string()));
        }

        Ok(())
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        Ok(
            self.store
                .read()
                .await
                .keys()
                .cloned()
                .collect()
        )
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
///
/// Seed documents added with [`InMemoryStoreBuilder::with_documents`] are
/// inserted in order when the store is built.
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    seed: Vec<(String, Vec<Document>)>,
}

impl InMemoryStoreBuilder {
    /// Queues documents to insert into `collection` on build.
    pub fn with_documents(mut self, collection: &str, documents: Vec<Document>) -> Self {
        self.seed.push((collection.to_string(), documents));
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        let store = InMemoryStore::new();

        for (collection, documents) in self.seed {
            store.create_collection(&collection).await?;
            store.insert_documents(documents, &collection).await?;
        }

        Ok(store)
    }
}
