//! Error types for schema inference.
//!
//! Resolving a schema fails only when the store does, and surfaces the
//! store's own [`StoreError`](docadmin_core::error::StoreError). These
//! variants come from loading declarations out of text.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    /// An API description could not be parsed as JSON.
    #[error("Invalid API document: {0}")]
    InvalidApiDocument(String),
    /// A structured model definition could not be parsed.
    #[error("Invalid model definition: {0}")]
    InvalidModelDefinition(String),
}

/// A type alias for `Result<T, InferenceError>`.
pub type InferenceResult<T> = Result<T, InferenceError>;
