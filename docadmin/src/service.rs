//! Collection administration service.
//!
//! [`CollectionService`] is the operation surface an admin UI is built on. It
//! speaks plain JSON: documents are returned with `_id` rendered as a hex
//! string, and request bodies are JSON objects.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use docadmin_core::{
    backend::StoreBackend,
    document::{ID_FIELD, document_to_json, from_plain_json, parse_object_id},
    error::{StoreError, StoreResult},
    page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageParams},
    query::{Expr, Filter, Query, Sort, SortDirection},
    store::DocumentStore,
};
use docadmin_schema::{resolver::SchemaResolver, sample::SampleSize, schema::CollectionSchema};

/// Most fields a free-text search is spread across.
const MAX_SEARCH_FIELDS: usize = 10;

/// Most items one bulk request may carry.
pub const MAX_BULK_ITEMS: usize = 1000;

/// A page of documents rendered as plain JSON.
pub type DocumentPage = Page<Value>;

/// Result of [`CollectionService::bulk_create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCreated {
    pub inserted_count: usize,
    /// Hex ids of the new documents, in input order.
    pub inserted_ids: Vec<String>,
}

/// Result of [`CollectionService::bulk_delete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleted {
    pub deleted_count: u64,
    /// Number of ids requested, malformed ones included.
    pub total: usize,
}

/// One operation of [`CollectionService::bulk_update`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkUpdate {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// Replacement body. An `_id` inside it is ignored.
    #[serde(default = "empty_object")]
    pub data: Value,
}

impl BulkUpdate {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self { id: Some(id.into()), data }
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Result of [`CollectionService::bulk_update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdated {
    /// Documents whose content actually changed.
    pub updated_count: u64,
    pub matched_count: u64,
    /// Number of operations requested, rejected ones included.
    pub total: usize,
    /// One message per rejected operation, `None` when all were accepted.
    pub errors: Option<Vec<String>>,
}

/// Options for [`CollectionService::list_documents`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    pub skip: usize,
    /// Page size. Defaults to [`DEFAULT_PAGE_SIZE`] and is capped by the service.
    pub limit: Option<usize>,
    pub sort: Option<Sort>,
    pub filter: Option<Expr>,
    /// Free text matched case-insensitively against the searchable fields of
    /// the collection's schema.
    pub search: Option<String>,
}

impl ListOptions {
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(Sort { field: field.into(), direction });
        self
    }

    pub fn filter(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }
}

/// Administration operations over every collection of one store.
#[derive(Debug)]
pub struct CollectionService<B: StoreBackend> {
    store: DocumentStore<B>,
    resolver: SchemaResolver,
    max_page_size: usize,
}

impl<B: StoreBackend> CollectionService<B> {
    pub fn new(store: DocumentStore<B>, resolver: SchemaResolver) -> Self {
        Self { store, resolver, max_page_size: MAX_PAGE_SIZE }
    }

    /// Caps listing pages at `max_page_size` documents. Zero is treated as one.
    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    pub fn store(&self) -> &DocumentStore<B> {
        &self.store
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// Lists collection names in the store.
    pub async fn list_collections(&self) -> StoreResult<Vec<String>> {
        self.store.list_collections().await
    }

    /// Lists one page of documents.
    ///
    /// When `search` is set, the collection schema is resolved and the text is
    /// matched against its string fields; a collection without string fields
    /// ignores the search.
    pub async fn list_documents(&self, collection: &str, options: ListOptions) -> StoreResult<DocumentPage> {
        let params = PageParams::with_max(
            options.skip,
            options.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            self.max_page_size,
        );

        let mut filter = options.filter;
        if let Some(text) = options.search.as_deref().map(str::trim).filter(|text| !text.is_empty()) {
            if let Some(search) = self.search_filter(collection, text).await? {
                filter = Some(match filter {
                    Some(existing) => existing.and(search),
                    None => search,
                });
            }
        }

        let handle = self.store.collection(collection);
        let total = handle.count(filter.clone()).await?;
        let documents = handle
            .query(Query {
                filter,
                limit: Some(params.limit),
                offset: Some(params.skip),
                sort: options.sort,
            })
            .await?;

        debug!(collection, total, returned = documents.len(), "listed documents");

        Ok(Page::builder(documents.iter().map(document_to_json).collect())
            .with_total(total)
            .with_skip(params.skip)
            .with_limit(params.limit)
            .build())
    }

    async fn search_filter(&self, collection: &str, text: &str) -> StoreResult<Option<Expr>> {
        let schema = self.resolver.resolve_default(self.store.backend(), collection).await?;

        let clauses: Vec<Expr> = schema
            .searchable_fields()
            .into_iter()
            .take(MAX_SEARCH_FIELDS)
            .map(|field| Filter::contains(field, text))
            .collect();

        if clauses.is_empty() {
            debug!(collection, "no searchable fields, ignoring search");
            return Ok(None);
        }

        Ok(Some(Filter::or(clauses)))
    }

    /// Fetches one document by its hex id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentifier`] for a malformed id and
    /// [`StoreError::DocumentNotFound`] when no document has it.
    pub async fn get_document(&self, collection: &str, id: &str) -> StoreResult<Value> {
        let oid = parse_object_id(id)?;

        self.fetch(collection, oid).await
    }

    async fn fetch(&self, collection: &str, oid: ObjectId) -> StoreResult<Value> {
        self.store
            .collection(collection)
            .get_one(oid)
            .await?
            .map(|document| document_to_json(&document))
            .ok_or_else(|| StoreError::DocumentNotFound(oid.to_hex(), collection.to_string()))
    }

    /// Creates a document from a JSON object and returns it as stored.
    ///
    /// Any `_id` in the body is discarded; the store assigns a fresh one.
    pub async fn create_document(&self, collection: &str, body: Value) -> StoreResult<Value> {
        let document = from_plain_json(without_id(body))?;
        let ids = self.store.collection(collection).insert(vec![document]).await?;

        let oid = ids
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("insert returned no id".to_string()))?;

        info!(collection, id = %oid, "created document");

        self.fetch(collection, oid).await
    }

    /// Sets the fields in `body` on an existing document and returns the result.
    ///
    /// Fields not named in `body` are left untouched, and `_id` cannot be changed.
    pub async fn update_document(&self, collection: &str, id: &str, body: Value) -> StoreResult<Value> {
        let oid = parse_object_id(id)?;
        let changes = from_plain_json(without_id(body))?;

        let updated = self
            .store
            .collection(collection)
            .update(oid, changes)
            .await?
            .ok_or_else(|| StoreError::DocumentNotFound(oid.to_hex(), collection.to_string()))?;

        info!(collection, id = %oid, "updated document");

        Ok(document_to_json(&updated))
    }

    /// Deletes one document by its hex id.
    pub async fn delete_document(&self, collection: &str, id: &str) -> StoreResult<()> {
        let oid = parse_object_id(id)?;

        let removed = self.store.collection(collection).delete(vec![oid]).await?;
        if removed == 0 {
            return Err(StoreError::DocumentNotFound(oid.to_hex(), collection.to_string()));
        }

        info!(collection, id = %oid, "deleted document");

        Ok(())
    }

    /// Creates many documents at once. Client-supplied `_id`s are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDocument`] for more than [`MAX_BULK_ITEMS`] bodies.
    pub async fn bulk_create(&self, collection: &str, bodies: Vec<Value>) -> StoreResult<BulkCreated> {
        check_bulk_size(bodies.len())?;

        let documents = bodies
            .into_iter()
            .map(|body| from_plain_json(without_id(body)))
            .collect::<StoreResult<Vec<_>>>()?;

        let ids = self.store.collection(collection).insert(documents).await?;

        info!(collection, count = ids.len(), "created documents");

        Ok(BulkCreated {
            inserted_count: ids.len(),
            inserted_ids: ids.iter().map(|id| id.to_hex()).collect(),
        })
    }

    /// Deletes many documents by hex id.
    ///
    /// Malformed ids are skipped but still counted in `total`. More than
    /// [`MAX_BULK_ITEMS`] ids is rejected with [`StoreError::InvalidDocument`].
    pub async fn bulk_delete(&self, collection: &str, ids: &[String]) -> StoreResult<BulkDeleted> {
        check_bulk_size(ids.len())?;

        let oids: Vec<ObjectId> = ids
            .iter()
            .filter_map(|id| match parse_object_id(id) {
                Ok(oid) => Some(oid),
                Err(_) => {
                    warn!(collection, id = %id, "skipping malformed id");
                    None
                }
            })
            .collect();

        let total = ids.len();
        if oids.is_empty() {
            return Ok(BulkDeleted { deleted_count: 0, total });
        }

        let deleted_count = self.store.collection(collection).delete(oids).await?;

        info!(collection, deleted_count, total, "deleted documents");

        Ok(BulkDeleted { deleted_count, total })
    }

    /// Replaces many documents, each named by the `_id` of its operation.
    ///
    /// Operations with a missing or malformed id, or a body that is not an
    /// object, are reported in `errors` and skipped. Ids that match nothing
    /// are not inserted. More than [`MAX_BULK_ITEMS`] operations is rejected
    /// with [`StoreError::InvalidDocument`].
    pub async fn bulk_update(&self, collection: &str, updates: Vec<BulkUpdate>) -> StoreResult<BulkUpdated> {
        check_bulk_size(updates.len())?;

        let total = updates.len();
        let mut errors = Vec::new();
        let mut replacements = Vec::with_capacity(total);

        for update in updates {
            let Some(id) = update.id.filter(|id| !id.is_empty()) else {
                errors.push("Missing _id in update operation".to_string());
                continue;
            };
            let Ok(oid) = parse_object_id(&id) else {
                warn!(collection, id = %id, "skipping malformed id");
                errors.push(format!("Invalid _id format: {id}"));
                continue;
            };

            match from_plain_json(without_id(update.data)) {
                Ok(document) => replacements.push((oid, document)),
                Err(err) => errors.push(format!("Error preparing update for {id}: {err}")),
            }
        }

        let handle = self.store.collection(collection);
        let mut updated_count = 0;
        let mut matched_count = 0;
        for (oid, document) in replacements {
            let outcome = handle.replace(oid, document).await?;
            matched_count += outcome.matched;
            updated_count += outcome.modified;
        }

        info!(collection, updated_count, matched_count, total, rejected = errors.len(), "replaced documents");

        Ok(BulkUpdated {
            updated_count,
            matched_count,
            total,
            errors: (!errors.is_empty()).then_some(errors),
        })
    }

    /// Resolves the schema of a collection.
    ///
    /// Without a sample size the resolver's configured default is used.
    pub async fn schema(&self, collection: &str, sample_size: Option<i64>) -> StoreResult<CollectionSchema> {
        let sample_size = sample_size
            .map(SampleSize::new)
            .unwrap_or(self.resolver.config().default_sample_size);

        self.resolver.resolve(self.store.backend(), collection, sample_size).await
    }

    /// Shuts down the underlying store.
    pub async fn shutdown(self) -> StoreResult<()> {
        self.store.shutdown().await
    }
}

fn check_bulk_size(len: usize) -> StoreResult<()> {
    if len > MAX_BULK_ITEMS {
        return Err(StoreError::InvalidDocument(format!(
            "bulk requests are limited to {MAX_BULK_ITEMS} items, got {len}"
        )));
    }

    Ok(())
}

fn without_id(mut body: Value) -> Value {
    if let Value::Object(map) = &mut body {
        map.shift_remove(ID_FIELD);
    }
    body
}
