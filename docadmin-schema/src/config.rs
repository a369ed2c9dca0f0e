//! Resolver configuration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::sample::SampleSize;

/// Settings for a [`crate::resolver::SchemaResolver`].
///
/// Deserializes from camelCase JSON; every key is optional.
///
/// ```json
/// { "defaultSampleSize": 25, "openapiSchemaMap": { "line_items": "OrderItem" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverConfig {
    /// Sample size used when a caller does not pass one.
    pub default_sample_size: SampleSize,
    /// Explicit collection to API schema name overrides.
    pub openapi_schema_map: IndexMap<String, String>,
}

impl ResolverConfig {
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// Sets the default sample size. Out-of-range values are clamped.
    pub fn default_sample_size(mut self, size: i64) -> Self {
        self.config.default_sample_size = SampleSize::new(size);
        self
    }

    /// Maps a collection to a named API schema.
    pub fn map_schema(mut self, collection: impl Into<String>, schema: impl Into<String>) -> Self {
        self.config.openapi_schema_map.insert(collection.into(), schema.into());
        self
    }

    pub fn build(self) -> ResolverConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.default_sample_size.get(), 10);
        assert!(config.openapi_schema_map.is_empty());
    }

    #[test]
    fn test_from_json() {
        let config: ResolverConfig = serde_json::from_str(
            r#"{ "defaultSampleSize": 0, "openapiSchemaMap": { "line_items": "OrderItem" } }"#,
        )
        .unwrap();

        assert_eq!(config.default_sample_size.get(), 1);
        assert_eq!(config.openapi_schema_map.get("line_items").map(String::as_str), Some("OrderItem"));

        let empty: ResolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ResolverConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = ResolverConfig::builder()
            .default_sample_size(1000)
            .map_schema("line_items", "OrderItem")
            .build();

        assert_eq!(config.default_sample_size.get(), 100);
        assert_eq!(config.openapi_schema_map.len(), 1);
    }
}
