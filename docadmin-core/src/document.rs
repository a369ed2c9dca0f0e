//! Document identity and JSON rendering helpers.
//!
//! Documents are plain [`bson::Document`] values keyed by an [`ObjectId`] stored
//! under `_id`. The admin surface speaks plain JSON, so this module also converts
//! between BSON values and the JSON shapes clients send and receive: identifiers
//! become 24-character hex strings and timestamps become RFC 3339 strings.

use bson::{Bson, Document, oid::ObjectId, spec::BinarySubtype};
use serde_json::{Map, Number, Value};

use crate::error::{StoreError, StoreResult};

/// The field every stored document is keyed by.
pub const ID_FIELD: &str = "_id";

/// Parses a 24-character hex string into an [`ObjectId`].
///
/// # Errors
///
/// Returns [`StoreError::InvalidIdentifier`] if the string is not a valid object id.
pub fn parse_object_id(value: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(value).map_err(|_| StoreError::InvalidIdentifier(value.to_string()))
}

/// Returns the object id stored under `_id`, if the document carries one.
pub fn document_id(document: &Document) -> Option<ObjectId> {
    match document.get(ID_FIELD) {
        Some(Bson::ObjectId(oid)) => Some(*oid),
        _ => None,
    }
}

/// Makes sure the document carries an object id under `_id` and returns it.
///
/// A missing `_id` is filled with a freshly generated id. A hex string is
/// promoted to an [`ObjectId`] in place.
///
/// # Errors
///
/// Returns [`StoreError::InvalidIdentifier`] when `_id` holds anything else.
pub fn ensure_object_id(document: &mut Document) -> StoreResult<ObjectId> {
    let oid = match document.get(ID_FIELD) {
        None | Some(Bson::Null) => ObjectId::new(),
        Some(Bson::ObjectId(oid)) => *oid,
        Some(Bson::String(hex)) => parse_object_id(hex)?,
        Some(other) => return Err(StoreError::InvalidIdentifier(other.to_string())),
    };

    document.insert(ID_FIELD, oid);

    Ok(oid)
}

/// Renders a BSON value as plain JSON.
///
/// Store-native wrappers are flattened into the representation an admin UI can
/// display directly rather than MongoDB extended JSON.
pub fn to_plain_json(value: &Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::from(*i),
        Bson::Int64(i) => Value::from(*i),
        Bson::Double(f) => Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s.clone()),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(dt.to_chrono().to_rfc3339()),
        Bson::Timestamp(ts) => Value::from(ts.time),
        Bson::Decimal128(d) => Value::String(d.to_string()),
        Bson::Binary(binary) if binary.subtype == BinarySubtype::Uuid => {
            match uuid::Uuid::from_slice(&binary.bytes) {
                Ok(uuid) => Value::String(uuid.to_string()),
                Err(_) => Value::String(value.to_string()),
            }
        }
        Bson::Array(items) => Value::Array(items.iter().map(to_plain_json).collect()),
        Bson::Document(doc) => document_to_json(doc),
        other => Value::String(other.to_string()),
    }
}

/// Renders a whole document as a plain JSON object, preserving field order.
pub fn document_to_json(document: &Document) -> Value {
    Value::Object(
        document
            .iter()
            .map(|(key, value)| (key.clone(), to_plain_json(value)))
            .collect::<Map<_, _>>(),
    )
}

/// Builds a BSON document from a plain JSON object.
///
/// A hex string under the top-level `_id` key is turned into an [`ObjectId`];
/// every other string is kept as-is.
///
/// # Errors
///
/// Returns [`StoreError::InvalidDocument`] if `value` is not a JSON object, and
/// [`StoreError::InvalidIdentifier`] if `_id` is a string that is not an object id.
pub fn from_plain_json(value: Value) -> StoreResult<Document> {
    let Value::Object(map) = value else {
        return Err(StoreError::InvalidDocument("expected a JSON object".to_string()));
    };

    let mut document = Document::new();

    for (key, value) in map {
        let converted = match (key.as_str(), value) {
            (ID_FIELD, Value::String(hex)) => Bson::ObjectId(parse_object_id(&hex)?),
            (_, value) => json_to_bson(value),
        };
        document.insert(key, converted);
    }

    Ok(document)
}

fn json_to_bson(value: Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => match i32::try_from(i) {
                Ok(small) => Bson::Int32(small),
                Err(_) => Bson::Int64(i),
            },
            None => Bson::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(items.into_iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(
            map.into_iter()
                .map(|(k, v)| (k, json_to_bson(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde_json::json;

    #[test]
    fn test_object_id_renders_as_hex() {
        let oid = ObjectId::new();
        assert_eq!(to_plain_json(&Bson::ObjectId(oid)), json!(oid.to_hex()));
    }

    #[test]
    fn test_nested_document_to_json() {
        let oid = ObjectId::new();
        let document = doc! {
            "_id": oid,
            "name": "A",
            "tags": ["x", "y"],
            "meta": { "owner": oid, "score": 1.5 },
        };

        assert_eq!(
            document_to_json(&document),
            json!({
                "_id": oid.to_hex(),
                "name": "A",
                "tags": ["x", "y"],
                "meta": { "owner": oid.to_hex(), "score": 1.5 },
            })
        );
    }

    #[test]
    fn test_non_finite_double_becomes_null() {
        assert_eq!(to_plain_json(&Bson::Double(f64::NAN)), Value::Null);
    }

    #[test]
    fn test_from_plain_json_promotes_id() {
        let oid = ObjectId::new();
        let document = from_plain_json(json!({ "_id": oid.to_hex(), "count": 3, "big": 5_000_000_000i64 }))
            .unwrap();

        assert_eq!(document_id(&document), Some(oid));
        assert_eq!(document.get("count"), Some(&Bson::Int32(3)));
        assert_eq!(document.get("big"), Some(&Bson::Int64(5_000_000_000)));
    }

    #[test]
    fn test_from_plain_json_rejects_non_objects() {
        assert!(matches!(
            from_plain_json(json!([1, 2])),
            Err(StoreError::InvalidDocument(_))
        ));
        assert!(matches!(
            from_plain_json(json!({ "_id": "not-an-id" })),
            Err(StoreError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_ensure_object_id() {
        let mut fresh = doc! { "name": "A" };
        let assigned = ensure_object_id(&mut fresh).unwrap();
        assert_eq!(document_id(&fresh), Some(assigned));

        let oid = ObjectId::new();
        let mut hex = doc! { "_id": oid.to_hex() };
        assert_eq!(ensure_object_id(&mut hex).unwrap(), oid);

        let mut bad = doc! { "_id": 42 };
        assert!(ensure_object_id(&mut bad).is_err());
    }
}
