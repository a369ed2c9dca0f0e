//! Core building blocks for administering document-store collections.
//!
//! This crate provides:
//!
//! - **Documents** ([`document`]) - identity helpers and plain-JSON rendering of BSON documents
//! - **Store backend abstraction** ([`backend`]) - the trait every storage backend implements
//! - **Query and filtering API** ([`query`]) - backend-agnostic filters, sorting and windows
//! - **Collections interface** ([`collection`]) - a collection name bound to a backend
//! - **Document store** ([`store`]) - the store handle, static or dynamically dispatched
//! - **Pagination** ([`page`]) - listing windows and result pages
//! - **Error handling** ([`error`]) - store errors and result types
//!
//! # Example
//!
//! ```ignore
//! use docadmin_core::{store::DocumentStore, query::{Filter, Query}};
//! use bson::doc;
//!
//! let store = DocumentStore::new(backend);
//! let users = store.collection("users");
//! users.insert(vec![doc! { "name": "Alice" }]).await?;
//! let found = users.query(Query::builder().filter(Filter::eq("name", "Alice")).build()).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docadmin_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod page;
pub mod query;
pub mod store;
