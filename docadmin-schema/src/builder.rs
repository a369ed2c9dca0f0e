//! Schema construction from structured models.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::{
    classify::classify_json,
    model::{DeclaredType, FieldDefinition, ModelDefinition},
    schema::{CollectionSchema, FieldSchema, SchemaSource},
    tag::TypeTag,
};

/// A declared type reduced to what a field schema needs.
#[derive(Debug, Clone, PartialEq)]
struct Resolved {
    tag: TypeTag,
    nullable: bool,
    enum_values: Option<Vec<Value>>,
}

impl Resolved {
    fn plain(tag: TypeTag) -> Self {
        Self { tag, nullable: false, enum_values: None }
    }

    fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

fn resolve(declared: &DeclaredType) -> Resolved {
    match declared {
        DeclaredType::String => Resolved::plain(TypeTag::String),
        DeclaredType::Integer => Resolved::plain(TypeTag::Integer),
        DeclaredType::Float => Resolved::plain(TypeTag::Float),
        DeclaredType::Decimal => Resolved::plain(TypeTag::Decimal),
        DeclaredType::Boolean => Resolved::plain(TypeTag::Boolean),
        DeclaredType::Date => Resolved::plain(TypeTag::Date),
        DeclaredType::DateTime => Resolved::plain(TypeTag::Datetime),
        DeclaredType::Timestamp => Resolved::plain(TypeTag::Timestamp),
        DeclaredType::Identifier => Resolved::plain(TypeTag::Identifier),
        DeclaredType::Null => Resolved::plain(TypeTag::Null).nullable(),
        DeclaredType::List(_) => Resolved::plain(TypeTag::List),
        DeclaredType::Object | DeclaredType::Model(_) => Resolved::plain(TypeTag::Object),
        DeclaredType::Optional(inner) => resolve(inner).nullable(),
        DeclaredType::Union(members) => {
            let has_null = members.iter().any(|member| *member == DeclaredType::Null);
            let resolved = members
                .iter()
                .find(|member| **member != DeclaredType::Null)
                .map(resolve)
                .unwrap_or_else(|| Resolved::plain(TypeTag::Null).nullable());

            if has_null { resolved.nullable() } else { resolved }
        }
        DeclaredType::Literal(values) => {
            let tag = values
                .iter()
                .map(classify_json)
                .find(|tag| *tag != TypeTag::Null)
                .unwrap_or(TypeTag::String);

            Resolved {
                tag,
                nullable: values.iter().any(Value::is_null),
                enum_values: Some(values.clone()),
            }
        }
        DeclaredType::Enum(values) => {
            let integral = !values.is_empty() && values.iter().all(|value| value.is_i64() || value.is_u64());

            Resolved {
                tag: if integral { TypeTag::Integer } else { TypeTag::String },
                nullable: false,
                enum_values: Some(values.clone()),
            }
        }
        DeclaredType::Unknown(text) => {
            warn!(declared = %text, "unrecognised declared type, treating as string");
            Resolved::plain(TypeTag::String)
        }
    }
}

fn field_schema(field: &FieldDefinition) -> FieldSchema {
    let resolved = resolve(&field.declared);

    let example = field
        .example
        .clone()
        .filter(|value| !value.is_null())
        .or_else(|| field.default.clone().filter(|value| !value.is_null()));

    FieldSchema::declared(resolved.tag, resolved.nullable || field.optional)
        .with_example(example)
        .with_enum(field.enum_values.clone().or(resolved.enum_values))
        .with_constraints(field.constraints.clone())
}

/// Builds a schema from a structured model declaration.
///
/// Fields keep declaration order, `sample_count` is zero and the source is
/// [`SchemaSource::StructuredModel`]. Unrecognised declared types are treated
/// as strings.
pub fn build_model_schema(model: &ModelDefinition) -> CollectionSchema {
    let fields: IndexMap<String, FieldSchema> = model
        .fields
        .iter()
        .map(|field| (field.name.clone(), field_schema(field)))
        .collect();

    CollectionSchema::new(fields, 0, SchemaSource::StructuredModel)
}
