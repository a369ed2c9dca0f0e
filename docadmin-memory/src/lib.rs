//! In-memory storage backend for docadmin.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! Collections keep documents in insertion order, which makes schema sampling
//! deterministic. It is meant for development, tests and small deployments.
//!
//! # Quick Start
//!
//! ```ignore
//! use docadmin_core::backend::StoreBackendBuilder;
//! use docadmin_memory::InMemoryStore;
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = InMemoryStore::builder()
//!         .with_documents("products", vec![doc! { "name": "A", "price": 9.99 }])
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docadmin_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
