//! Schema inference from stored documents.

use bson::{Bson, Document};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use docadmin_core::{backend::StoreBackend, document::to_plain_json, error::StoreResult};

use crate::{
    classify::classify,
    sample::SampleSize,
    schema::{CollectionSchema, FieldSchema, SchemaSource},
    tag::TypeTag,
};

#[derive(Debug, Default)]
struct FieldAccumulator {
    types: Vec<TypeTag>,
    example: Option<Value>,
    explicit_null: bool,
    occurrences: usize,
}

impl FieldAccumulator {
    fn observe(&mut self, field: &str, value: &Bson) {
        self.occurrences += 1;

        let tag = classify(value);
        if tag == TypeTag::Null {
            self.explicit_null = true;
            return;
        }

        if !self.types.contains(&tag) {
            trace!(field, tag = %tag, "observed new type");
            self.types.push(tag);
        }

        if self.example.is_none() {
            self.example = Some(to_plain_json(value));
        }
    }

    fn finish(self, sample_count: usize) -> FieldSchema {
        FieldSchema {
            primary: self.types.first().copied().unwrap_or(TypeTag::Null),
            nullable: self.explicit_null || self.occurrences < sample_count,
            types: self.types,
            example: self.example,
            enum_values: None,
            constraints: None,
        }
    }
}

/// Derives a schema from documents already in hand.
///
/// Fields appear in first-seen order. A field is nullable when it holds an
/// explicit null in some document or is missing from at least one. Explicit
/// nulls never enter `types`, so a field that is only ever null has empty
/// `types` and a `null` primary type. Nested documents and arrays are
/// classified as a whole and are not descended into.
pub fn schema_from_documents(documents: &[Document]) -> CollectionSchema {
    let mut fields: IndexMap<String, FieldAccumulator> = IndexMap::new();

    for document in documents {
        for (name, value) in document {
            fields.entry(name.clone()).or_default().observe(name, value);
        }
    }

    let sample_count = documents.len();
    let fields = fields
        .into_iter()
        .map(|(name, accumulator)| (name, accumulator.finish(sample_count)))
        .collect();

    CollectionSchema::new(fields, sample_count, SchemaSource::Documents)
}

/// Reads up to `sample_size` documents from `collection` in natural order and
/// infers a schema from them.
///
/// An empty or absent collection yields an empty schema with
/// `sample_count == 0`; the caller decides whether to fall back to declared
/// sources.
///
/// # Errors
///
/// Propagates any [`docadmin_core::error::StoreError`] raised while reading.
pub async fn scan<B: StoreBackend>(
    backend: &B,
    collection: &str,
    sample_size: SampleSize,
) -> StoreResult<CollectionSchema> {
    let documents = backend.fetch_sample(collection, sample_size.get()).await?;

    debug!(collection, sampled = documents.len(), limit = sample_size.get(), "scanned sample");

    Ok(schema_from_documents(&documents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};
    use serde_json::json;

    #[test]
    fn test_mixed_numeric_types() {
        let documents = vec![
            doc! { "_id": ObjectId::new(), "name": "A", "price": 9.99 },
            doc! { "_id": ObjectId::new(), "name": "B", "price": 10 },
        ];

        let schema = schema_from_documents(&documents);
        let price = schema.field("price").unwrap();

        assert_eq!(schema.sample_count(), 2);
        assert_eq!(schema.source(), SchemaSource::Documents);
        assert_eq!(price.primary, TypeTag::Float);
        assert_eq!(price.types, vec![TypeTag::Float, TypeTag::Integer]);
        assert_eq!(price.example, Some(json!(9.99)));
        assert!(!price.nullable);
        assert_eq!(schema.field("_id").unwrap().primary, TypeTag::Identifier);
    }

    #[test]
    fn test_missing_and_null_fields_are_nullable() {
        let documents = vec![
            doc! { "email": "a@x.com", "nickname": Bson::Null },
            doc! { "nickname": "bee" },
        ];

        let schema = schema_from_documents(&documents);
        let email = schema.field("email").unwrap();
        let nickname = schema.field("nickname").unwrap();

        assert!(email.nullable);
        assert_eq!(email.types, vec![TypeTag::String]);
        assert!(nickname.nullable);
        assert_eq!(nickname.types, vec![TypeTag::String]);
        assert_eq!(nickname.example, Some(json!("bee")));
    }

    #[test]
    fn test_only_null_field() {
        let documents = vec![doc! { "deleted_at": Bson::Null }];

        let field = schema_from_documents(&documents).field("deleted_at").cloned().unwrap();

        assert_eq!(field.primary, TypeTag::Null);
        assert!(field.types.is_empty());
        assert!(field.nullable);
        assert_eq!(field.example, None);
    }

    #[test]
    fn test_nested_values_are_not_descended() {
        let documents = vec![doc! { "address": { "city": "Oslo" }, "tags": ["a", "b"] }];

        let schema = schema_from_documents(&documents);

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.field("address").unwrap().primary, TypeTag::Object);
        assert_eq!(schema.field("address").unwrap().example, Some(json!({ "city": "Oslo" })));
        assert_eq!(schema.field("tags").unwrap().primary, TypeTag::List);
    }

    #[test]
    fn test_no_documents() {
        let schema = schema_from_documents(&[]);
        assert!(schema.is_empty());
        assert_eq!(schema.sample_count(), 0);
    }

    #[test]
    fn test_first_seen_field_order() {
        let documents = vec![doc! { "b": 1, "a": 1 }, doc! { "c": 1, "a": 2 }];
        let names: Vec<_> = schema_from_documents(&documents).fields().keys().cloned().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
