//! Runtime configuration.
//!
//! [`AdminConfig`] selects a store backend and carries resolver settings. It
//! deserializes from camelCase JSON:
//!
//! ```json
//! {
//!   "store": { "type": "mongodb", "uri": "mongodb://localhost:27017", "database": "shop" },
//!   "resolver": { "defaultSampleSize": 20 },
//!   "maxPageSize": 200
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use docadmin_core::{
    backend::StoreBackendBuilder,
    error::StoreResult,
    page::MAX_PAGE_SIZE,
    store::{DocumentStore, DynDocumentStore},
};
use docadmin_memory::InMemoryStore;
use docadmin_schema::{
    config::ResolverConfig,
    openapi::ApiDeclarations,
    registry::ModelRegistry,
    resolver::SchemaResolver,
};

use crate::service::CollectionService;

/// Which backend to connect to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    #[default]
    Memory,
    #[serde(rename = "mongodb")]
    MongoDb { uri: String, database: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminConfig {
    pub store: StoreConfig,
    pub resolver: ResolverConfig,
    pub max_page_size: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            resolver: ResolverConfig::default(),
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl AdminConfig {
    /// Parses a configuration from JSON text. Missing keys take their defaults.
    pub fn from_json_str(text: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Connects to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`docadmin_core::error::StoreError::Initialization`] when the
    /// backend cannot be set up, including a MongoDB store requested from a
    /// build without the `mongodb` feature.
    pub async fn connect(&self) -> StoreResult<DynDocumentStore> {
        match &self.store {
            StoreConfig::Memory => {
                info!("using in-memory store");
                Ok(DocumentStore::new(InMemoryStore::builder().build().await?).into_dyn())
            }
            StoreConfig::MongoDb { uri, database } => connect_mongodb(uri, database).await,
        }
    }

    /// Connects and wraps the store in a [`CollectionService`] using the
    /// configured resolver settings.
    pub async fn into_service(
        self,
        models: ModelRegistry,
        declarations: ApiDeclarations,
    ) -> StoreResult<CollectionService<Box<dyn docadmin_core::backend::DynStoreBackend>>> {
        let store = self.connect().await?;
        let resolver = SchemaResolver::builder()
            .models(models)
            .declarations(declarations)
            .config(self.resolver)
            .build();

        Ok(CollectionService::new(store, resolver).with_max_page_size(self.max_page_size))
    }
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb(uri: &str, database: &str) -> StoreResult<DynDocumentStore> {
    info!(database, "connecting to MongoDB");

    let backend = docadmin_mongodb::MongoDbStoreBuilder::new(uri, database).build().await?;

    Ok(DocumentStore::new(backend).into_dyn())
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongodb(_uri: &str, _database: &str) -> StoreResult<DynDocumentStore> {
    Err(docadmin_core::error::StoreError::Initialization(
        "MongoDB support requires the `mongodb` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdminConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AdminConfig::default());
        assert_eq!(config.store, StoreConfig::Memory);
        assert_eq!(config.max_page_size, 200);
        assert_eq!(config.resolver.default_sample_size.get(), 10);
    }

    #[test]
    fn test_mongodb_store() {
        let config = AdminConfig::from_json_str(
            r#"{
                "store": { "type": "mongodb", "uri": "mongodb://localhost:27017", "database": "shop" },
                "resolver": { "defaultSampleSize": 500, "openapiSchemaMap": { "line_items": "OrderItem" } },
                "maxPageSize": 50
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.store,
            StoreConfig::MongoDb { uri: "mongodb://localhost:27017".into(), database: "shop".into() }
        );
        assert_eq!(config.resolver.default_sample_size.get(), 100);
        assert_eq!(config.max_page_size, 50);
    }

    #[test]
    fn test_invalid_json() {
        assert!(AdminConfig::from_json_str("{ store: ").is_err());
    }
}
