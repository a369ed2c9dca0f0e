//! Inferred schema snapshots.
//!
//! A [`CollectionSchema`] is what every inference source produces: an ordered
//! map of field names to [`FieldSchema`] plus the number of documents it was
//! derived from and a [`SchemaSource`] tag. Schemas are built once and handed
//! out by value, so callers never observe one changing after it is returned.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

use docadmin_core::document::ID_FIELD;

use crate::tag::TypeTag;

/// Where a schema came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaSource {
    /// Scanned from stored documents.
    Documents,
    /// Built from a registered structured model.
    StructuredModel,
    /// Extracted from an API schema declaration.
    ApiSchema,
    /// No source produced any field.
    Empty,
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchemaSource::Documents => "documents",
            SchemaSource::StructuredModel => "structured_model",
            SchemaSource::ApiSchema => "api_schema",
            SchemaSource::Empty => "empty",
        })
    }
}

/// Validation bounds carried over from a declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ge: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub le: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.ge.is_none()
            && self.gt.is_none()
            && self.le.is_none()
            && self.lt.is_none()
            && self.pattern.is_none()
    }

    pub fn with_min_length(mut self, value: u64) -> Self {
        self.min_length = Some(value);
        self
    }

    pub fn with_max_length(mut self, value: u64) -> Self {
        self.max_length = Some(value);
        self
    }

    pub fn with_ge(mut self, value: impl Into<Number>) -> Self {
        self.ge = Some(value.into());
        self
    }

    pub fn with_gt(mut self, value: impl Into<Number>) -> Self {
        self.gt = Some(value.into());
        self
    }

    pub fn with_le(mut self, value: impl Into<Number>) -> Self {
        self.le = Some(value.into());
        self
    }

    pub fn with_lt(mut self, value: impl Into<Number>) -> Self {
        self.lt = Some(value.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Returns `None` for an empty set so serialized schemas omit the key.
    pub(crate) fn non_empty(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

/// The inferred description of a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// The primary type: the first type observed, or the declared type.
    #[serde(rename = "type")]
    pub primary: TypeTag,
    /// Every distinct non-null type observed, in first-seen order.
    pub types: Vec<TypeTag>,
    /// A representative value. Serialized as `null` when there is none.
    pub example: Option<Value>,
    pub nullable: bool,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

impl FieldSchema {
    /// A field with a single declared type.
    pub fn declared(primary: TypeTag, nullable: bool) -> Self {
        let types = if primary == TypeTag::Null { Vec::new() } else { vec![primary] };

        Self {
            primary,
            types,
            example: None,
            nullable,
            enum_values: None,
            constraints: None,
        }
    }

    pub fn with_example(mut self, example: Option<Value>) -> Self {
        self.example = example.filter(|value| !value.is_null());
        self
    }

    pub fn with_enum(mut self, values: Option<Vec<Value>>) -> Self {
        self.enum_values = values;
        self
    }

    pub fn with_constraints(mut self, constraints: Option<Constraints>) -> Self {
        self.constraints = constraints.and_then(Constraints::non_empty);
        self
    }

    /// Whether an admin UI should offer this field as a filter.
    ///
    /// True for enumerated fields and for boolean and calendar fields.
    pub fn is_filterable(&self) -> bool {
        self.enum_values.is_some()
            || matches!(self.primary, TypeTag::Boolean | TypeTag::Date | TypeTag::Datetime)
    }
}

/// The inferred description of a whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    fields: IndexMap<String, FieldSchema>,
    sample_count: usize,
    source: SchemaSource,
}

impl CollectionSchema {
    pub(crate) fn new(
        fields: IndexMap<String, FieldSchema>,
        sample_count: usize,
        source: SchemaSource,
    ) -> Self {
        Self { fields, sample_count, source }
    }

    /// The schema reported when no source yields anything.
    pub fn empty() -> Self {
        Self::new(IndexMap::new(), 0, SchemaSource::Empty)
    }

    pub fn fields(&self) -> &IndexMap<String, FieldSchema> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Number of documents the schema was derived from. Zero for declared schemas.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn source(&self) -> SchemaSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields whose primary type is `string`, excluding the identifier field.
    ///
    /// Used to build free-text search filters.
    pub fn searchable_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(name, field)| name.as_str() != ID_FIELD && field.primary == TypeTag::String)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Fields an admin UI should offer as filters.
    pub fn filterable_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, field)| field.is_filterable())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Renders the schema in its JSON wire shape.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Default for CollectionSchema {
    fn default() -> Self {
        Self::empty()
    }
}
