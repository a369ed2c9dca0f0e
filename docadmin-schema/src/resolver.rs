//! Schema resolution across every inference source.
//!
//! For a requested collection the resolver tries, in order:
//!
//! 1. a sample of stored documents
//! 2. a registered structured model
//! 3. a declared API schema
//! 4. the empty schema
//!
//! The first source that yields at least one field wins. Sources are never
//! merged.

use tracing::{debug, instrument};

use docadmin_core::{backend::StoreBackend, error::StoreResult};

use crate::{
    builder::build_model_schema,
    config::ResolverConfig,
    openapi::ApiDeclarations,
    registry::ModelRegistry,
    sample::SampleSize,
    scanner::scan,
    schema::CollectionSchema,
};

/// Resolves collection schemas from documents, models and API declarations.
///
/// The resolver only holds declarations; the store is passed on each call.
/// It is cheap to share and safe to use from many tasks at once.
#[derive(Debug, Clone, Default)]
pub struct SchemaResolver {
    models: ModelRegistry,
    declarations: ApiDeclarations,
    config: ResolverConfig,
}

impl SchemaResolver {
    pub fn new(models: ModelRegistry, declarations: ApiDeclarations) -> Self {
        Self { models, declarations, config: ResolverConfig::default() }
    }

    pub fn builder() -> SchemaResolverBuilder {
        SchemaResolverBuilder::default()
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn declarations(&self) -> &ApiDeclarations {
        &self.declarations
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves the schema for `collection`, sampling at most `sample_size`
    /// documents.
    ///
    /// # Errors
    ///
    /// Only a store failure while sampling is reported. Every other condition,
    /// including a missing collection or unknown declarations, resolves to a
    /// schema.
    #[instrument(level = "debug", skip(self, backend))]
    pub async fn resolve<B: StoreBackend>(
        &self,
        backend: &B,
        collection: &str,
        sample_size: SampleSize,
    ) -> StoreResult<CollectionSchema> {
        let scanned = scan(backend, collection, sample_size).await?;
        if !scanned.is_empty() {
            debug!(source = %scanned.source(), fields = scanned.len(), "resolved schema");
            return Ok(scanned);
        }

        let declared = self.resolve_declared(collection);
        debug!(source = %declared.source(), fields = declared.len(), "resolved schema");

        Ok(declared)
    }

    /// Resolves using the configured default sample size.
    pub async fn resolve_default<B: StoreBackend>(
        &self,
        backend: &B,
        collection: &str,
    ) -> StoreResult<CollectionSchema> {
        self.resolve(backend, collection, self.config.default_sample_size).await
    }

    /// Resolves from declarations alone, without touching the store.
    pub fn resolve_declared(&self, collection: &str) -> CollectionSchema {
        if let Some(found) = self.models.find(collection) {
            let schema = build_model_schema(found.model);
            if !schema.is_empty() {
                debug!(collection, model = %found.model.name, matched = %found.kind, "using structured model");
                return schema;
            }
        }

        if let Some(found) = self.declarations.find(collection) {
            let schema = self.declarations.extract(found.schema);
            if !schema.is_empty() {
                debug!(collection, schema = found.name, matched = %found.kind, "using API schema");
                return schema;
            }
        }

        CollectionSchema::empty()
    }
}

#[derive(Debug, Default)]
pub struct SchemaResolverBuilder {
    models: ModelRegistry,
    declarations: ApiDeclarations,
    config: ResolverConfig,
}

impl SchemaResolverBuilder {
    pub fn models(mut self, models: ModelRegistry) -> Self {
        self.models = models;
        self
    }

    pub fn declarations(mut self, declarations: ApiDeclarations) -> Self {
        self.declarations = declarations;
        self
    }

    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the resolver, applying the configured schema overrides to the
    /// API declarations.
    pub fn build(self) -> SchemaResolver {
        let declarations = self.declarations.with_overrides(self.config.openapi_schema_map.clone());

        SchemaResolver { models: self.models, declarations, config: self.config }
    }
}

/// Resolves a schema in one call, for callers without a long-lived resolver.
pub async fn resolve<B: StoreBackend>(
    backend: &B,
    collection: &str,
    sample_size: SampleSize,
    models: &ModelRegistry,
    declarations: &ApiDeclarations,
) -> StoreResult<CollectionSchema> {
    SchemaResolver::new(models.clone(), declarations.clone())
        .resolve(backend, collection, sample_size)
        .await
}
