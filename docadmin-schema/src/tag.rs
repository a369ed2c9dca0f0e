//! Canonical semantic type tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of semantic type labels a field can carry.
///
/// Tags serialize as lower-case strings (`"integer"`, `"datetime"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    Datetime,
    Timestamp,
    List,
    Object,
    Identifier,
    Null,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::Decimal => "decimal",
            TypeTag::Boolean => "boolean",
            TypeTag::Date => "date",
            TypeTag::Datetime => "datetime",
            TypeTag::Timestamp => "timestamp",
            TypeTag::List => "list",
            TypeTag::Object => "object",
            TypeTag::Identifier => "identifier",
            TypeTag::Null => "null",
        }
    }

    /// Date, datetime and timestamp tags.
    pub fn is_temporal(&self) -> bool {
        matches!(self, TypeTag::Date | TypeTag::Datetime | TypeTag::Timestamp)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeTag::Integer | TypeTag::Float | TypeTag::Decimal)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
