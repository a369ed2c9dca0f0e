//! Schemas from an OpenAPI description.
//!
//! [`ApiDeclarations`] holds the named schemas under `components.schemas` of
//! an OpenAPI 3.x document. Each schema is treated as the declaration of the
//! collection [`collection_name_for`] derives from its name, so `OrderItem`
//! describes `order_items`. Explicit overrides map a collection to a schema
//! name directly.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::{
    error::{InferenceError, InferenceResult},
    naming::{MatchKind, NameIndex, collection_name_for},
    schema::{CollectionSchema, Constraints, FieldSchema, SchemaSource},
    tag::TypeTag,
};

const COMPONENT_PREFIX: &str = "#/components/schemas/";
const MAX_REF_DEPTH: usize = 16;

/// A declared schema found for a requested collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApiMatch<'a> {
    pub name: &'a str,
    pub schema: &'a Value,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiDeclarations {
    schemas: IndexMap<String, Value>,
    overrides: IndexMap<String, String>,
    index: NameIndex,
}

impl ApiDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the named schemas from a parsed OpenAPI document.
    ///
    /// A document without `components.schemas` yields no declarations.
    pub fn from_openapi(document: &Value) -> Self {
        let schemas = document
            .get("components")
            .and_then(|components| components.get("schemas"))
            .and_then(Value::as_object);

        let Some(schemas) = schemas else {
            debug!("API document declares no component schemas");
            return Self::default();
        };

        Self::from_schemas(schemas.iter().map(|(name, schema)| (name.clone(), schema.clone())))
    }

    /// Parses OpenAPI JSON text and reads its named schemas.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::InvalidApiDocument`] when the text is not JSON.
    pub fn from_json_str(text: &str) -> InferenceResult<Self> {
        let document: Value = serde_json::from_str(text)
            .map_err(|err| InferenceError::InvalidApiDocument(err.to_string()))?;

        Ok(Self::from_openapi(&document))
    }

    /// Builds declarations from already separated named schemas.
    pub fn from_schemas(schemas: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut declarations = Self::default();

        for (name, schema) in schemas {
            declarations.index.push(collection_name_for(&name), name.clone(), true);
            declarations.schemas.insert(name, schema);
        }

        declarations
    }

    /// Adds collection-to-schema overrides. Overrides are consulted before any
    /// name matching; an override naming a missing schema is ignored.
    pub fn with_overrides<C, S>(mut self, overrides: impl IntoIterator<Item = (C, S)>) -> Self
    where
        C: Into<String>,
        S: Into<String>,
    {
        self.overrides
            .extend(overrides.into_iter().map(|(collection, schema)| (collection.into(), schema.into())));
        self
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn schema_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Finds the declared schema for a requested collection name.
    pub fn find(&self, collection: &str) -> Option<ApiMatch<'_>> {
        if let Some(target) = self.overrides.get(collection) {
            match self.schemas.get_key_value(target) {
                Some((name, schema)) => {
                    return Some(ApiMatch { name, schema, kind: MatchKind::Override });
                }
                None => warn!(collection, schema = %target, "override names an unknown schema"),
            }
        }

        let (position, kind) = self.index.find(collection)?;
        let (name, schema) = self.schemas.get_index(position)?;

        Some(ApiMatch { name, schema, kind })
    }

    /// Extracts a collection schema from one declared object schema.
    ///
    /// Only top-level properties become fields, in declaration order.
    pub fn extract(&self, schema: &Value) -> CollectionSchema {
        let target = self.follow_ref(schema, 0).unwrap_or(schema);

        let required: Vec<&str> = target
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let fields: IndexMap<String, FieldSchema> = target
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, property)| {
                        (name.clone(), self.property_schema(property, required.contains(&name.as_str())))
                    })
                    .collect()
            })
            .unwrap_or_default();

        CollectionSchema::new(fields, 0, SchemaSource::ApiSchema)
    }

    fn follow_ref<'a>(&'a self, schema: &'a Value, depth: usize) -> Option<&'a Value> {
        let reference = schema.get("$ref")?.as_str()?;
        let name = reference.strip_prefix(COMPONENT_PREFIX).unwrap_or(reference);

        match self.schemas.get(name) {
            Some(target) if depth < MAX_REF_DEPTH => Some(self.follow_ref(target, depth + 1).unwrap_or(target)),
            Some(_) => None,
            None => {
                warn!(reference, "unresolved schema reference");
                None
            }
        }
    }

    fn property_schema(&self, property: &Value, required: bool) -> FieldSchema {
        let typed = self.type_of(property, 0);

        FieldSchema::declared(typed.tag, typed.nullable || !required)
            .with_example(example_of(property))
            .with_enum(typed.enum_values)
            .with_constraints(Some(constraints_of(property)))
    }

    fn type_of(&self, schema: &Value, depth: usize) -> Typed {
        if depth >= MAX_REF_DEPTH {
            return Typed::plain(TypeTag::String);
        }

        let nullable = schema.get("nullable").and_then(Value::as_bool).unwrap_or(false);

        if schema.get("$ref").is_some() {
            let typed = match self.follow_ref(schema, 0) {
                Some(target) if target.get("enum").is_some() => self.type_of(target, depth + 1),
                _ => Typed::plain(TypeTag::Object),
            };
            return typed.or_nullable(nullable);
        }

        for combinator in ["allOf", "anyOf", "oneOf"] {
            if let Some(members) = schema.get(combinator).and_then(Value::as_array) {
                let has_null = members.iter().any(is_null_schema);
                let typed = members
                    .iter()
                    .find(|member| !is_null_schema(member))
                    .map(|member| self.type_of(member, depth + 1))
                    .unwrap_or_else(|| Typed::plain(TypeTag::Null).or_nullable(true));

                return typed.or_nullable(nullable || has_null);
            }
        }

        let (type_name, null_in_type) = declared_type_name(schema);
        let format = schema.get("format").and_then(Value::as_str).unwrap_or_default();

        let tag = match type_name {
            Some("array") => TypeTag::List,
            Some("string") => match format {
                "date-time" => TypeTag::Datetime,
                "date" => TypeTag::Date,
                _ => TypeTag::String,
            },
            Some("number") => match format {
                "decimal" | "money" => TypeTag::Decimal,
                _ => TypeTag::Float,
            },
            Some("integer") => TypeTag::Integer,
            Some("boolean") => TypeTag::Boolean,
            Some("object") => TypeTag::Object,
            Some("null") => TypeTag::Null,
            None if schema.get("properties").is_some() => TypeTag::Object,
            _ => TypeTag::String,
        };

        let enum_values = schema.get("enum").and_then(Value::as_array).cloned();
        let null_in_enum = enum_values.as_ref().is_some_and(|values| values.iter().any(Value::is_null));

        Typed {
            tag,
            nullable: nullable || null_in_type || null_in_enum || tag == TypeTag::Null,
            enum_values,
        }
    }
}

#[derive(Debug)]
struct Typed {
    tag: TypeTag,
    nullable: bool,
    enum_values: Option<Vec<Value>>,
}

impl Typed {
    fn plain(tag: TypeTag) -> Self {
        Self { tag, nullable: false, enum_values: None }
    }

    fn or_nullable(mut self, nullable: bool) -> Self {
        self.nullable |= nullable;
        self
    }
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

/// The declared `type`, which OpenAPI 3.1 allows to be a list such as
/// `["string", "null"]`. Returns the first non-null entry and whether `null`
/// was listed.
fn declared_type_name(schema: &Value) -> (Option<&str>, bool) {
    match schema.get("type") {
        Some(Value::String(name)) => (Some(name.as_str()), false),
        Some(Value::Array(names)) => {
            let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
            let first = names.iter().copied().find(|name| *name != "null");
            (first.or(names.first().copied()), names.contains(&"null"))
        }
        _ => (None, false),
    }
}

fn example_of(property: &Value) -> Option<Value> {
    let non_null = |value: &Value| (!value.is_null()).then(|| value.clone());

    property
        .get("example")
        .and_then(non_null)
        .or_else(|| property.get("examples").and_then(Value::as_array).and_then(|all| all.first()).and_then(non_null))
        .or_else(|| property.get("default").and_then(non_null))
}

fn number(property: &Map<String, Value>, key: &str) -> Option<Number> {
    property.get(key).and_then(|value| value.as_number()).cloned()
}

fn constraints_of(property: &Value) -> Constraints {
    let Some(property) = property.as_object() else {
        return Constraints::default();
    };

    let mut constraints = Constraints {
        min_length: property.get("minLength").and_then(Value::as_u64),
        max_length: property.get("maxLength").and_then(Value::as_u64),
        pattern: property.get("pattern").and_then(Value::as_str).map(str::to_string),
        ..Constraints::default()
    };

    let minimum = number(property, "minimum");
    let maximum = number(property, "maximum");

    match property.get("exclusiveMinimum") {
        Some(Value::Number(bound)) => {
            constraints.gt = Some(bound.clone());
            constraints.ge = minimum;
        }
        Some(Value::Bool(true)) => constraints.gt = minimum,
        _ => constraints.ge = minimum,
    }

    match property.get("exclusiveMaximum") {
        Some(Value::Number(bound)) => {
            constraints.lt = Some(bound.clone());
            constraints.le = maximum;
        }
        Some(Value::Bool(true)) => constraints.lt = maximum,
        _ => constraints.le = maximum,
    }

    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "openapi": "3.1.0",
            "components": {
                "schemas": {
                    "OrderItem": {
                        "type": "object",
                        "required": ["sku", "quantity"],
                        "properties": {
                            "sku": { "type": "string", "minLength": 3, "maxLength": 12, "pattern": "^[A-Z0-9-]+$" },
                            "quantity": { "type": "integer", "minimum": 1, "example": 2 },
                            "price": { "type": "number", "format": "decimal", "exclusiveMinimum": 0 },
                            "status": { "$ref": "#/components/schemas/ItemStatus" },
                            "shipped_on": { "type": "string", "format": "date" },
                            "updated_at": { "type": ["string", "null"], "format": "date-time" },
                            "supplier": { "$ref": "#/components/schemas/Supplier" },
                            "tags": { "type": "array", "items": { "type": "string" }, "examples": [["red"]] },
                            "note": { "anyOf": [{ "type": "null" }, { "type": "string" }], "default": "none" }
                        }
                    },
                    "ItemStatus": { "type": "string", "enum": ["open", "shipped"] },
                    "Supplier": { "type": "object", "properties": { "name": { "type": "string" } } }
                }
            }
        })
    }

    #[test]
    fn test_extracts_properties() {
        let declarations = ApiDeclarations::from_openapi(&document());
        let found = declarations.find("order_items").unwrap();
        assert_eq!(found.name, "OrderItem");
        assert_eq!(found.kind, MatchKind::Exact);

        let schema = declarations.extract(found.schema);
        assert_eq!(schema.source(), SchemaSource::ApiSchema);
        assert_eq!(schema.sample_count(), 0);

        let sku = schema.field("sku").unwrap();
        assert_eq!(sku.primary, TypeTag::String);
        assert!(!sku.nullable);
        let constraints = sku.constraints.as_ref().unwrap();
        assert_eq!(constraints.min_length, Some(3));
        assert_eq!(constraints.max_length, Some(12));
        assert_eq!(constraints.pattern.as_deref(), Some("^[A-Z0-9-]+$"));

        let quantity = schema.field("quantity").unwrap();
        assert_eq!(quantity.primary, TypeTag::Integer);
        assert_eq!(quantity.example, Some(json!(2)));
        assert_eq!(quantity.constraints.as_ref().unwrap().ge, Some(Number::from(1)));

        let price = schema.field("price").unwrap();
        assert_eq!(price.primary, TypeTag::Decimal);
        assert!(price.nullable);
        assert_eq!(price.constraints.as_ref().unwrap().gt, Some(Number::from(0)));
    }

    #[test]
    fn test_references_and_formats() {
        let declarations = ApiDeclarations::from_openapi(&document());
        let schema = declarations.extract(declarations.find("order_items").unwrap().schema);

        let status = schema.field("status").unwrap();
        assert_eq!(status.primary, TypeTag::String);
        assert_eq!(status.enum_values, Some(vec![json!("open"), json!("shipped")]));

        assert_eq!(schema.field("supplier").unwrap().primary, TypeTag::Object);
        assert_eq!(schema.field("shipped_on").unwrap().primary, TypeTag::Date);
        assert_eq!(schema.field("updated_at").unwrap().primary, TypeTag::Datetime);
        assert!(schema.field("updated_at").unwrap().nullable);

        let tags = schema.field("tags").unwrap();
        assert_eq!(tags.primary, TypeTag::List);
        assert_eq!(tags.example, Some(json!(["red"])));

        let note = schema.field("note").unwrap();
        assert_eq!(note.primary, TypeTag::String);
        assert!(note.nullable);
        assert_eq!(note.example, Some(json!("none")));
    }

    #[test]
    fn test_legacy_exclusive_bounds() {
        let constraints = constraints_of(&json!({
            "type": "number", "minimum": 0, "exclusiveMinimum": true, "maximum": 10
        }));

        assert_eq!(constraints.gt, Some(Number::from(0)));
        assert_eq!(constraints.ge, None);
        assert_eq!(constraints.le, Some(Number::from(10)));
    }

    #[test]
    fn test_inflection_and_overrides() {
        let declarations = ApiDeclarations::from_openapi(&document())
            .with_overrides([("line_items", "OrderItem"), ("broken", "Missing")]);

        assert_eq!(declarations.find("order_item").unwrap().kind, MatchKind::Inflection);

        let found = declarations.find("line_items").unwrap();
        assert_eq!(found.name, "OrderItem");
        assert_eq!(found.kind, MatchKind::Override);

        assert!(declarations.find("broken").is_none());
    }

    #[test]
    fn test_document_without_components() {
        let declarations = ApiDeclarations::from_openapi(&json!({ "openapi": "3.0.0", "paths": {} }));
        assert!(declarations.is_empty());
        assert!(declarations.find("anything").is_none());
    }

    #[test]
    fn test_invalid_json_text() {
        assert!(matches!(
            ApiDeclarations::from_json_str("{ not json"),
            Err(InferenceError::InvalidApiDocument(_))
        ));
    }
}
