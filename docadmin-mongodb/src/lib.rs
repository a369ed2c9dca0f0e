//! MongoDB backend implementation for docadmin.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait.
//! Documents are read and written as-is, `_id` included, so existing collections
//! can be administered without migration.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docadmin = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! Connectivity failures (server selection, I/O, cleared pools) surface as
//! `StoreError::StoreUnavailable`.
//!
//! # Example
//!
//! ```ignore
//! use docadmin::{backend::StoreBackendBuilder, mongodb::MongoDbStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "shop")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docadmin_mongodb;

pub mod store;
pub mod query;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
