//! Generic administration of document-store collections.
//!
//! This crate is the entry point for the docadmin framework. It re-exports the
//! core store abstractions and the schema inference engine, and adds the
//! [`service::CollectionService`] an admin UI talks to: listing collections,
//! paging and searching documents, create/update/delete by id, and inferred
//! collection schemas.
//!
//! # Features
//!
//! - **Backend-agnostic** - in-memory and MongoDB backends behind one trait
//! - **Schema inference** - schemas sampled from live documents, with structured
//!   models and OpenAPI declarations as fallbacks for empty collections
//! - **Plain JSON surface** - documents go in and out as plain JSON values
//!
//! # Quick Start
//!
//! ```ignore
//! use docadmin::{prelude::*, memory::InMemoryStore};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await.unwrap());
//!     let service = CollectionService::new(store, SchemaResolver::default());
//!
//!     service
//!         .create_document("products", json!({ "name": "A", "price": 9.99 }))
//!         .await
//!         .unwrap();
//!
//!     let page = service
//!         .list_documents("products", ListOptions::default().search("a"))
//!         .await
//!         .unwrap();
//!
//!     let schema = service.schema("products", None).await.unwrap();
//!     println!("{} documents, schema: {}", page.total, schema.to_json());
//!
//!     service.shutdown().await.unwrap();
//! }
//! ```
//!
//! # Runtime Backend Selection
//!
//! [`config::AdminConfig`] picks a backend from configuration and returns a
//! dynamically dispatched store:
//!
//! ```ignore
//! use docadmin::{config::AdminConfig, prelude::*};
//!
//! let config = AdminConfig::from_json_str(r#"{ "store": { "type": "memory" } }"#)?;
//! let service = config.into_service(ModelRegistry::new(), ApiDeclarations::new()).await?;
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - MongoDB backend (requires the `mongodb` feature)

pub mod config;
pub mod prelude;
pub mod service;

pub use docadmin_core::{backend, collection, document, error, page, query, store};

/// Schema inference.
pub use docadmin_schema as schema;

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docadmin_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docadmin_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
