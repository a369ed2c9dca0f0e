//! Schema inference for document-store collections.
//!
//! Given a collection name, [`resolver::SchemaResolver`] produces a
//! [`schema::CollectionSchema`] describing its fields. It samples stored
//! documents first and falls back to declared sources when the collection is
//! empty:
//!
//! - **Classification** ([`classify`]) - maps values to [`tag::TypeTag`]s
//! - **Sampling** ([`scanner`]) - infers a schema from stored documents
//! - **Structured models** ([`model`], [`builder`], [`registry`]) - declared record types
//! - **API declarations** ([`openapi`]) - named schemas from an OpenAPI document
//! - **Resolution** ([`resolver`]) - picks the first source that yields fields
//!
//! # Example
//!
//! ```ignore
//! use docadmin_schema::prelude::*;
//!
//! let resolver = SchemaResolver::builder()
//!     .models(ModelRegistry::from_models(vec![product_model]))
//!     .declarations(ApiDeclarations::from_json_str(openapi_json)?)
//!     .build();
//!
//! let schema = resolver.resolve(&backend, "products", SampleSize::new(20)).await?;
//! println!("{}", schema.to_json());
//! ```

pub mod builder;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod naming;
pub mod openapi;
pub mod registry;
pub mod resolver;
pub mod sample;
pub mod scanner;
pub mod schema;
pub mod tag;

pub mod prelude {
    pub use crate::{
        builder::build_model_schema,
        classify::{classify, classify_json, classify_str},
        config::ResolverConfig,
        error::{InferenceError, InferenceResult},
        model::{DeclaredType, FieldDefinition, ModelDefinition, StructuredModel},
        naming::{MatchKind, collection_name_for},
        openapi::ApiDeclarations,
        registry::ModelRegistry,
        resolver::{SchemaResolver, resolve},
        sample::SampleSize,
        scanner::scan,
        schema::{CollectionSchema, Constraints, FieldSchema, SchemaSource},
        tag::TypeTag,
    };
}
