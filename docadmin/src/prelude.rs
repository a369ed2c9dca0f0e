//! Convenient re-exports of commonly used types from docadmin.
//!
//! ```ignore
//! use docadmin::prelude::*;
//! ```
//!
//! This provides access to:
//! - Store backends, builders and the store handle
//! - Query construction and paging
//! - Schema inference and its declarations
//! - The collection service and error types

pub use docadmin_core::{
    backend::{ReplaceOutcome, StoreBackend, StoreBackendBuilder},
    collection::Collection,
    document::{ID_FIELD, document_to_json, from_plain_json, parse_object_id},
    error::{StoreError, StoreResult},
    page::{Page, PageParams},
    query::{Expr, FieldOp, Filter, Query, QueryBuilder, QueryVisitor, Sort, SortDirection},
    store::{DocumentStore, DynDocumentStore},
};

pub use docadmin_schema::prelude::*;

pub use crate::{
    config::{AdminConfig, StoreConfig},
    service::{
        BulkCreated, BulkDeleted, BulkUpdate, BulkUpdated, CollectionService, DocumentPage,
        ListOptions, MAX_BULK_ITEMS,
    },
};
