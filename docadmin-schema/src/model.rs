//! Structured model declarations.
//!
//! A [`ModelDefinition`] is a named list of [`FieldDefinition`]s, each with a
//! [`DeclaredType`]. Definitions can be written in Rust, loaded from JSON, or
//! produced by a type implementing [`StructuredModel`].
//!
//! Declared types are written the way typed-record libraries spell them:
//!
//! ```text
//! str, int, float, bool, Decimal, date, datetime, ObjectId
//! Optional[int], int | None, Union[str, int]
//! list[str], List[Address], dict[str, Any]
//! Literal["draft", "live"]
//! Address                       (another model)
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::{
    error::{InferenceError, InferenceResult},
    schema::Constraints,
};

/// The type a structured model declares for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeclaredType {
    String,
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Timestamp,
    Identifier,
    Null,
    List(Option<Box<DeclaredType>>),
    Object,
    /// A reference to another model by name.
    Model(String),
    Optional(Box<DeclaredType>),
    Union(Vec<DeclaredType>),
    Literal(Vec<Value>),
    Enum(Vec<Value>),
    /// Anything the parser did not recognise, kept verbatim.
    Unknown(String),
}

impl DeclaredType {
    pub fn optional(inner: DeclaredType) -> Self {
        DeclaredType::Optional(Box::new(inner))
    }

    pub fn list_of(inner: DeclaredType) -> Self {
        DeclaredType::List(Some(Box::new(inner)))
    }

    /// Parses a declared type from its textual form. Never fails; text that
    /// cannot be understood becomes [`DeclaredType::Unknown`].
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return DeclaredType::Unknown(String::new());
        }

        let members = split_top_level(text, '|');
        if members.len() > 1 {
            return union_of(members.into_iter().map(DeclaredType::parse).collect());
        }

        match text.find('[') {
            Some(open) if text.ends_with(']') => {
                let name = base_name(&text[..open]);
                let args = split_top_level(&text[open + 1..text.len() - 1], ',');
                parse_generic(&name, args, text)
            }
            Some(_) => DeclaredType::Unknown(text.to_string()),
            None => parse_scalar(text),
        }
    }
}

fn base_name(text: &str) -> String {
    let trimmed = text.trim();
    trimmed.rsplit('.').next().unwrap_or(trimmed).to_string()
}

fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (index, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => {
                parts.push(text[start..index].trim());
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }

    parts.push(text[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

fn union_of(members: Vec<DeclaredType>) -> DeclaredType {
    let has_null = members.iter().any(|member| *member == DeclaredType::Null);
    let mut rest: Vec<_> = members.into_iter().filter(|member| *member != DeclaredType::Null).collect();

    let inner = match rest.len() {
        0 => return DeclaredType::Null,
        1 => rest.remove(0),
        _ => DeclaredType::Union(rest),
    };

    if has_null { DeclaredType::optional(inner) } else { inner }
}

fn parse_generic(name: &str, args: Vec<&str>, original: &str) -> DeclaredType {
    match name.to_ascii_lowercase().as_str() {
        "optional" => match args.as_slice() {
            [inner] => DeclaredType::optional(DeclaredType::parse(inner)),
            _ => DeclaredType::Unknown(original.to_string()),
        },
        "union" => union_of(args.into_iter().map(DeclaredType::parse).collect()),
        "list" | "sequence" | "set" | "frozenset" | "tuple" | "vec" | "array" => {
            DeclaredType::List(args.first().map(|inner| Box::new(DeclaredType::parse(inner))))
        }
        "dict" | "mapping" | "map" | "hashmap" | "btreemap" | "indexmap" => DeclaredType::Object,
        "literal" => DeclaredType::Literal(args.into_iter().map(parse_literal).collect()),
        "enum" => DeclaredType::Enum(args.into_iter().map(parse_literal).collect()),
        "annotated" => match args.first() {
            Some(inner) => DeclaredType::parse(inner),
            None => DeclaredType::Unknown(original.to_string()),
        },
        _ => DeclaredType::Unknown(original.to_string()),
    }
}

fn parse_scalar(text: &str) -> DeclaredType {
    let name = base_name(text);

    match name.to_ascii_lowercase().as_str() {
        "str" | "string" | "emailstr" | "httpurl" | "anyurl" => DeclaredType::String,
        "int" | "integer" | "i32" | "i64" | "u32" | "u64" | "usize" => DeclaredType::Integer,
        "float" | "number" | "f32" | "f64" | "double" => DeclaredType::Float,
        "decimal" | "bigdecimal" => DeclaredType::Decimal,
        "bool" | "boolean" => DeclaredType::Boolean,
        "date" | "naivedate" => DeclaredType::Date,
        "datetime" | "naivedatetime" => DeclaredType::DateTime,
        "timestamp" => DeclaredType::Timestamp,
        "objectid" | "pydanticobjectid" | "oid" | "uuid" => DeclaredType::Identifier,
        "none" | "nonetype" | "null" => DeclaredType::Null,
        "list" | "vec" | "set" | "tuple" => DeclaredType::List(None),
        "dict" | "object" | "map" | "json" => DeclaredType::Object,
        "any" => DeclaredType::Unknown(name),
        _ if is_model_name(&name) => DeclaredType::Model(name),
        _ => DeclaredType::Unknown(text.to_string()),
    }
}

fn is_model_name(name: &str) -> bool {
    name.chars().next().is_some_and(|ch| ch.is_ascii_uppercase())
        && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn parse_literal(text: &str) -> Value {
    let text = text.trim();

    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        return Value::String(text[1..text.len() - 1].to_string());
    }

    match text {
        "None" => Value::Null,
        "True" => Value::Bool(true),
        "False" => Value::Bool(false),
        _ => serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())),
    }
}

fn join(types: &[DeclaredType], separator: &str) -> String {
    types.iter().map(ToString::to_string).collect::<Vec<_>>().join(separator)
}

fn join_values(values: &[Value]) -> String {
    values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::String => f.write_str("str"),
            DeclaredType::Integer => f.write_str("int"),
            DeclaredType::Float => f.write_str("float"),
            DeclaredType::Decimal => f.write_str("Decimal"),
            DeclaredType::Boolean => f.write_str("bool"),
            DeclaredType::Date => f.write_str("date"),
            DeclaredType::DateTime => f.write_str("datetime"),
            DeclaredType::Timestamp => f.write_str("timestamp"),
            DeclaredType::Identifier => f.write_str("ObjectId"),
            DeclaredType::Null => f.write_str("None"),
            DeclaredType::List(None) => f.write_str("list"),
            DeclaredType::List(Some(inner)) => write!(f, "list[{inner}]"),
            DeclaredType::Object => f.write_str("dict"),
            DeclaredType::Model(name) => f.write_str(name),
            DeclaredType::Optional(inner) => write!(f, "Optional[{inner}]"),
            DeclaredType::Union(members) => write!(f, "Union[{}]", join(members, ", ")),
            DeclaredType::Literal(values) => write!(f, "Literal[{}]", join_values(values)),
            DeclaredType::Enum(values) => write!(f, "Enum[{}]", join_values(values)),
            DeclaredType::Unknown(text) => f.write_str(text),
        }
    }
}

impl From<String> for DeclaredType {
    fn from(value: String) -> Self {
        DeclaredType::parse(&value)
    }
}

impl From<&str> for DeclaredType {
    fn from(value: &str) -> Self {
        DeclaredType::parse(value)
    }
}

impl From<DeclaredType> for String {
    fn from(value: DeclaredType) -> Self {
        value.to_string()
    }
}

/// One field of a structured model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub declared: DeclaredType,
    /// Set when the field may be omitted even though its type is not optional.
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, declared: impl Into<DeclaredType>) -> Self {
        Self {
            name: name.into(),
            declared: declared.into(),
            optional: false,
            default: None,
            example: None,
            enum_values: None,
            constraints: None,
            description: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_example(mut self, value: impl Into<Value>) -> Self {
        self.example = Some(value.into());
        self
    }

    pub fn with_enum(mut self, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A named, ordered set of field declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Parses a model definition from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::InvalidModelDefinition`] when the
    /// text is not a valid definition.
    pub fn from_json_str(text: &str) -> InferenceResult<Self> {
        serde_json::from_str(text).map_err(|err| InferenceError::InvalidModelDefinition(err.to_string()))
    }
}

/// A Rust type that can describe itself as a structured model.
///
/// ```ignore
/// struct Product { name: String, price: f64 }
///
/// impl StructuredModel for Product {
///     fn model_definition() -> ModelDefinition {
///         ModelDefinition::new("Product")
///             .field(FieldDefinition::new("name", DeclaredType::String))
///             .field(FieldDefinition::new("price", DeclaredType::Float))
///     }
/// }
/// ```
pub trait StructuredModel {
    fn model_definition() -> ModelDefinition;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(DeclaredType::parse("str"), DeclaredType::String);
        assert_eq!(DeclaredType::parse("int"), DeclaredType::Integer);
        assert_eq!(DeclaredType::parse("float"), DeclaredType::Float);
        assert_eq!(DeclaredType::parse("Decimal"), DeclaredType::Decimal);
        assert_eq!(DeclaredType::parse("bool"), DeclaredType::Boolean);
        assert_eq!(DeclaredType::parse("datetime.date"), DeclaredType::Date);
        assert_eq!(DeclaredType::parse("datetime"), DeclaredType::DateTime);
        assert_eq!(DeclaredType::parse("ObjectId"), DeclaredType::Identifier);
        assert_eq!(DeclaredType::parse("Address"), DeclaredType::Model("Address".into()));
    }

    #[test]
    fn test_parse_optional_forms() {
        let expected = DeclaredType::optional(DeclaredType::Integer);
        assert_eq!(DeclaredType::parse("Optional[int]"), expected);
        assert_eq!(DeclaredType::parse("typing.Optional[int]"), expected);
        assert_eq!(DeclaredType::parse("int | None"), expected);
        assert_eq!(DeclaredType::parse("Union[int, None]"), expected);
    }

    #[test]
    fn test_parse_unions_and_containers() {
        assert_eq!(
            DeclaredType::parse("Union[str, int]"),
            DeclaredType::Union(vec![DeclaredType::String, DeclaredType::Integer])
        );
        assert_eq!(DeclaredType::parse("list[str]"), DeclaredType::list_of(DeclaredType::String));
        assert_eq!(DeclaredType::parse("List[Dict[str, Any]]"), DeclaredType::list_of(DeclaredType::Object));
        assert_eq!(DeclaredType::parse("dict[str, int]"), DeclaredType::Object);
        assert_eq!(DeclaredType::parse("list"), DeclaredType::List(None));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(
            DeclaredType::parse("Literal['draft', \"live\", 3, True]"),
            DeclaredType::Literal(vec![json!("draft"), json!("live"), json!(3), json!(true)])
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(DeclaredType::parse("frobnicate"), DeclaredType::Unknown("frobnicate".into()));
        assert_eq!(DeclaredType::parse("Optional[int"), DeclaredType::Unknown("Optional[int".into()));
    }

    #[test]
    fn test_display_parses_back() {
        for text in ["Optional[int]", "list[str]", "Union[str, int]", "Literal[\"a\", 1]", "Decimal"] {
            let parsed = DeclaredType::parse(text);
            assert_eq!(DeclaredType::parse(&parsed.to_string()), parsed);
        }
    }

    #[test]
    fn test_model_from_json() {
        let model = ModelDefinition::from_json_str(
            r#"{
                "name": "Product",
                "fields": [
                    { "name": "name", "type": "str", "constraints": { "max_length": 80 } },
                    { "name": "price", "type": "Optional[float]", "default": 0.0 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(model.name, "Product");
        assert_eq!(model.fields[0].declared, DeclaredType::String);
        assert_eq!(model.fields[0].constraints.as_ref().unwrap().max_length, Some(80));
        assert_eq!(model.fields[1].declared, DeclaredType::optional(DeclaredType::Float));
        assert_eq!(model.fields[1].default, Some(json!(0.0)));
    }

    #[test]
    fn test_invalid_model_json() {
        assert!(ModelDefinition::from_json_str("{\"fields\": 3}").is_err());
    }
}
