use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, oid::ObjectId, doc};
use mongodb::{
    Client, Collection as MongoCollection,
    error::{Error as DriverError, ErrorKind, WriteFailure},
    options::{ClientOptions, FindOptions, ReturnDocument},
};
use tracing::warn;
use docadmin_core::{
    backend::{ReplaceOutcome, StoreBackend, StoreBackendBuilder},
    document::{ID_FIELD, ensure_object_id},
    error::{StoreError, StoreResult},
    query::{Expr, Query, QueryVisitor, SortDirection},
};

use crate::query::MongoQueryTranslator;

const DUPLICATE_KEY: i32 = 11000;

/// Maps a driver error onto the store error taxonomy.
///
/// Failures that mean the server could not be reached become
/// [`StoreError::StoreUnavailable`]; everything else is a backend error.
pub(crate) fn map_driver_error(err: DriverError) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => {
            warn!(error = %err, "mongodb unreachable");
            StoreError::StoreUnavailable(err.to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

fn ensure_listed(listed: &[String], name: &str) -> StoreResult<()> {
    if !listed.iter().any(|candidate| candidate == name) {
        return Err(StoreError::CollectionNotFound(name.to_string()));
    }

    Ok(())
}

/// Returns the position of the first write rejected for a duplicate key.
fn duplicate_key_index(kind: &ErrorKind) -> Option<usize> {
    match kind {
        ErrorKind::Write(WriteFailure::WriteError(err)) if err.code == DUPLICATE_KEY => Some(0),
        ErrorKind::InsertMany(err) => err
            .write_errors
            .as_ref()?
            .iter()
            .find(|write| write.code == DUPLICATE_KEY)
            .map(|write| write.index),
        _ => None,
    }
}

/// Maps an insert failure, reporting duplicate keys as
/// [`StoreError::DocumentAlreadyExists`] for the offending id.
pub(crate) fn map_insert_error(err: DriverError, ids: &[ObjectId], collection: &str) -> StoreError {
    match duplicate_key_index(err.kind.as_ref()) {
        Some(index) => StoreError::DocumentAlreadyExists(
            ids.get(index).map(|id| id.to_hex()).unwrap_or_default(),
            collection.to_string(),
        ),
        None => map_driver_error(err),
    }
}

#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    fn translate_filter(filter: Option<&Expr>) -> StoreResult<Document> {
        match filter {
            Some(expr) => MongoQueryTranslator.visit_expr(expr),
            None => Ok(doc! {}),
        }
    }

    async fn shutdown(self) -> StoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn insert_documents(&self, documents: Vec<Document>, collection: &str) -> StoreResult<Vec<ObjectId>> {
        if documents.is_empty() {
            return Ok(vec![]);
        }

        let mut ids = Vec::with_capacity(documents.len());
        let mut prepared = Vec::with_capacity(documents.len());
        for mut document in documents {
            ids.push(ensure_object_id(&mut document)?);
            prepared.push(document);
        }

        self.get_collection(collection)
            .insert_many(prepared)
            .await
            .map_err(|err| map_insert_error(err, &ids, collection))?;

        Ok(ids)
    }

    async fn update_document(&self, id: ObjectId, mut changes: Document, collection: &str) -> StoreResult<Option<Document>> {
        changes.remove(ID_FIELD);

        if changes.is_empty() {
            return self.get_collection(collection)
                .find_one(doc! { ID_FIELD: id })
                .await
                .map_err(map_driver_error);
        }

        self.get_collection(collection)
            .find_one_and_update(doc! { ID_FIELD: id }, doc! { "$set": changes })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_driver_error)
    }

    async fn replace_document(&self, id: ObjectId, mut document: Document, collection: &str) -> StoreResult<ReplaceOutcome> {
        document.remove(ID_FIELD);

        let result = self.get_collection(collection)
            .replace_one(doc! { ID_FIELD: id }, document)
            .await
            .map_err(map_driver_error)?;

        Ok(ReplaceOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<u64> {
        Ok(
            self.get_collection(collection)
                .delete_many(doc! { ID_FIELD: { "$in": ids } })
                .await
                .map_err(map_driver_error)?
                .deleted_count
        )
    }

    async fn get_documents(&self, ids: Vec<ObjectId>, collection: &str) -> StoreResult<Vec<Document>> {
        self.get_collection(collection)
            .find(doc! { ID_FIELD: { "$in": ids } })
            .await
            .map_err(map_driver_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(map_driver_error)
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>> {
        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(limit as i64);
        }
        if let Some(skip) = query.offset {
            options.skip = Some(skip as u64);
        }
        if let Some(sort) = &query.sort {
            options.sort = Some(doc! {
                sort.field.clone(): match sort.direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                }
            })
        }

        self.get_collection(collection)
            .find(Self::translate_filter(query.filter.as_ref())?)
            .with_options(options)
            .await
            .map_err(map_driver_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(map_driver_error)
    }

    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> StoreResult<u64> {
        self.get_collection(collection)
            .count_documents(Self::translate_filter(filter.as_ref())?)
            .await
            .map_err(map_driver_error)
    }

    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        self.client
            .database(&self.database)
            .create_collection(name)
            .await
            .map_err(map_driver_error)
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        let existing = self.client
            .database(&self.database)
            .list_collection_names()
            .filter(doc! { "name": name })
            .await
            .map_err(map_driver_error)?;
        ensure_listed(&existing, name)?;

        self.get_collection(name)
            .drop()
            .await
            .map_err(map_driver_error)
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        let mut names = self.client
            .database(&self.database)
            .list_collection_names()
            .await
            .map_err(map_driver_error)?
            .into_iter()
            .filter(|name| !name.starts_with("system."))
            .collect::<Vec<_>>();

        names.sort();

        Ok(names)
    }

    async fn shutdown(self) -> StoreResult<()> {
        self.shutdown().await
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| StoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| StoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::error::{InsertManyError, WriteError};
    use serde_json::json;

    fn write_error(code: i32) -> DriverError {
        let err: WriteError = serde_json::from_value(json!({ "code": code, "errmsg": "write failed" })).unwrap();
        DriverError::from(ErrorKind::Write(WriteFailure::WriteError(err)))
    }

    #[test]
    fn test_io_error_is_unavailable() {
        let err = DriverError::from(std::io::Error::from(std::io::ErrorKind::ConnectionRefused));

        assert!(matches!(map_driver_error(err), StoreError::StoreUnavailable(_)));
    }

    #[test]
    fn test_other_errors_are_backend() {
        assert!(matches!(map_driver_error(write_error(121)), StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn test_server_selection_timeout_is_unavailable() {
        let store = MongoDbStore::builder("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=100", "admin_test")
            .build()
            .await
            .unwrap();

        let result = store.list_collections().await;

        assert!(matches!(result, Err(StoreError::StoreUnavailable(_))));
    }

    #[test]
    fn test_duplicate_key_write_is_already_exists() {
        let id = ObjectId::new();

        let mapped = map_insert_error(write_error(DUPLICATE_KEY), &[id], "users");

        assert!(matches!(
            mapped,
            StoreError::DocumentAlreadyExists(ref hex, ref collection) if *hex == id.to_hex() && collection == "users"
        ));
    }

    #[test]
    fn test_duplicate_key_in_insert_many_names_offending_id() {
        let ids = [ObjectId::new(), ObjectId::new(), ObjectId::new()];
        let err: InsertManyError = serde_json::from_value(json!({
            "writeErrors": [{ "index": 1, "code": DUPLICATE_KEY, "errmsg": "E11000 duplicate key error" }]
        }))
        .unwrap();

        let mapped = map_insert_error(DriverError::from(ErrorKind::InsertMany(err)), &ids, "users");

        assert!(matches!(
            mapped,
            StoreError::DocumentAlreadyExists(ref hex, _) if *hex == ids[1].to_hex()
        ));
    }

    #[test]
    fn test_unlisted_collection_is_not_found() {
        let listed = vec!["users".to_string()];

        assert!(ensure_listed(&listed, "users").is_ok());
        assert!(matches!(
            ensure_listed(&listed, "orders"),
            Err(StoreError::CollectionNotFound(ref name)) if name == "orders"
        ));
        assert!(matches!(ensure_listed(&[], "users"), Err(StoreError::CollectionNotFound(_))));
    }

    #[test]
    fn test_non_duplicate_insert_failure_is_backend() {
        assert!(matches!(
            map_insert_error(write_error(121), &[ObjectId::new()], "users"),
            StoreError::Backend(_)
        ));
    }
}
