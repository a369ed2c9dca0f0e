//! Structured model registry.
//!
//! Models are registered in one of two shapes:
//!
//! - **List**: each model is keyed by its conventional collection name
//!   ([`collection_name_for`]) and can also be found by its singular or
//!   `snake_case` name.
//! - **Mapping**: each model is keyed by an explicit collection name and is
//!   only found by that name, exactly or case-insensitively.
//!
//! A registry loaded from JSON accepts either shape: an array of model
//! definitions or an object of collection name to definition.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    error::{InferenceError, InferenceResult},
    model::{ModelDefinition, StructuredModel},
    naming::{MatchKind, NameIndex, collection_name_for},
};

/// A registered model found for a requested collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelMatch<'a> {
    /// The collection name the model is registered under.
    pub key: &'a str,
    pub model: &'a ModelDefinition,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRegistry {
    models: Vec<ModelDefinition>,
    index: NameIndex,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    /// Registers models in list shape.
    pub fn from_models(models: impl IntoIterator<Item = ModelDefinition>) -> Self {
        models.into_iter().fold(Self::builder(), ModelRegistryBuilder::model).build()
    }

    /// Registers models in mapping shape.
    pub fn from_mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, ModelDefinition)>) -> Self {
        entries
            .into_iter()
            .fold(Self::builder(), |builder, (key, model)| builder.mapping(key, model))
            .build()
    }

    /// Loads a registry from JSON text in either shape.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::InvalidModelDefinition`] when the text is
    /// neither an array nor an object of model definitions.
    pub fn from_json_str(text: &str) -> InferenceResult<Self> {
        serde_json::from_str::<Registration>(text)
            .map(Self::from)
            .map_err(|err| InferenceError::InvalidModelDefinition(err.to_string()))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Collection names models are registered under, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys()
    }

    /// Finds the model for a requested collection name.
    pub fn find(&self, collection: &str) -> Option<ModelMatch<'_>> {
        let (position, kind) = self.index.find(collection)?;
        let key = self.index.keys().nth(position)?;
        let model = self.models.get(position)?;

        Some(ModelMatch { key, model, kind })
    }
}

#[derive(Debug, Default)]
pub struct ModelRegistryBuilder {
    registry: ModelRegistry,
}

impl ModelRegistryBuilder {
    /// Adds a model keyed by its conventional collection name.
    pub fn model(mut self, model: ModelDefinition) -> Self {
        let key = collection_name_for(&model.name);
        self.registry.index.push(key, model.name.clone(), true);
        self.registry.models.push(model);
        self
    }

    /// Adds a Rust type's model definition keyed by its conventional collection name.
    pub fn structured<T: StructuredModel>(self) -> Self {
        self.model(T::model_definition())
    }

    /// Adds a model under an explicit collection name.
    pub fn mapping(mut self, collection: impl Into<String>, model: ModelDefinition) -> Self {
        self.registry.index.push(collection, model.name.clone(), false);
        self.registry.models.push(model);
        self
    }

    pub fn build(self) -> ModelRegistry {
        self.registry
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Registration {
    List(Vec<ModelDefinition>),
    Mapping(IndexMap<String, ModelDefinition>),
}

impl From<Registration> for ModelRegistry {
    fn from(value: Registration) -> Self {
        match value {
            Registration::List(models) => ModelRegistry::from_models(models),
            Registration::Mapping(models) => ModelRegistry::from_mapping(models),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldDefinition;

    fn model(name: &str) -> ModelDefinition {
        ModelDefinition::new(name).field(FieldDefinition::new("name", "str"))
    }

    #[test]
    fn test_list_registration() {
        let registry = ModelRegistry::from_models(vec![model("Product"), model("OrderItem")]);

        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["products", "order_items"]);

        let found = registry.find("products").unwrap();
        assert_eq!(found.model.name, "Product");
        assert_eq!(found.kind, MatchKind::Exact);

        let found = registry.find("order_item").unwrap();
        assert_eq!(found.model.name, "OrderItem");
        assert_eq!(found.key, "order_items");
        assert_eq!(found.kind, MatchKind::Inflection);
    }

    #[test]
    fn test_mapping_registration() {
        let registry = ModelRegistry::from_mapping(vec![("people", model("Person"))]);

        assert_eq!(registry.find("people").unwrap().kind, MatchKind::Exact);
        assert_eq!(registry.find("PEOPLE").unwrap().kind, MatchKind::CaseInsensitive);
        assert!(registry.find("person").is_none());
    }

    #[test]
    fn test_exact_beats_case_insensitive() {
        let registry = ModelRegistry::from_mapping(vec![
            ("products", model("Product")),
            ("Products", model("LegacyProduct")),
        ]);

        assert_eq!(registry.find("Products").unwrap().model.name, "LegacyProduct");
        assert_eq!(registry.find("PRODUCTS").unwrap().model.name, "Product");
    }

    #[test]
    fn test_structured_model() {
        struct Invoice;

        impl StructuredModel for Invoice {
            fn model_definition() -> ModelDefinition {
                ModelDefinition::new("Invoice").field(FieldDefinition::new("total", "Decimal"))
            }
        }

        let registry = ModelRegistry::builder().structured::<Invoice>().build();
        assert_eq!(registry.find("invoices").unwrap().model.name, "Invoice");
    }

    #[test]
    fn test_from_json_either_shape() {
        let list = ModelRegistry::from_json_str(r#"[{ "name": "User", "fields": [] }]"#).unwrap();
        assert!(list.find("users").is_some());

        let mapping = ModelRegistry::from_json_str(r#"{ "members": { "name": "User", "fields": [] } }"#).unwrap();
        assert!(mapping.find("members").is_some());
        assert!(mapping.find("users").is_none());

        assert!(ModelRegistry::from_json_str("42").is_err());
    }

    #[test]
    fn test_empty_registry() {
        let registry = ModelRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.find("anything").is_none());
    }
}
