//! Error types and result types for store operations.
//!
//! Every backend reports failures through [`StoreError`]. Use [`StoreResult<T>`]
//! as the return type for fallible store operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when talking to a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached, timed out, or the request was cancelled.
    ///
    /// This is the only failure the schema resolver surfaces to its callers.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    /// Conversion between BSON, JSON and Rust values failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A document with the given ID already exists in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// The requested document was not found in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document not found {0} in collection {1}")]
    DocumentNotFound(String, String),
    /// The requested collection does not exist in the store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// The document has an invalid structure (for example a non-object JSON body).
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// A document identifier could not be parsed.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// Any other failure reported by the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns `true` when the error means the store itself could not be used,
    /// as opposed to a problem with the request.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::StoreUnavailable(_))
    }
}

/// A specialized `Result` type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
