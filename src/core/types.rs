//! TZ-001: Inferred types and runtime values.
//!
//! Captured command output is classified into a closed set of semantic
//! types (`InferredType`) and parsed into a matching tagged value
//! (`Value`). The Json variant is deliberately shallow: a flat list or a
//! flat string map produced by the comma splitter in `core::parse`, not
//! a full JSON document.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use std::fmt;

// ============================================================================
// Inferred types
// ============================================================================

/// Semantic type of a raw output blob. Exactly one tag applies to any
/// input; selection order lives in `core::detect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredType {
    Nothing,
    Int,
    Float,
    Bool,
    DateTime,
    IntArray,
    FloatArray,
    StringArray,
    Json,
    Dict,
    Str,
}

impl InferredType {
    /// Resolve a user-supplied type name (CLI `--type` flag).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "nothing" => Some(Self::Nothing),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            "datetime" => Some(Self::DateTime),
            "int_array" | "intarray" => Some(Self::IntArray),
            "float_array" | "floatarray" => Some(Self::FloatArray),
            "string_array" | "stringarray" => Some(Self::StringArray),
            "json" => Some(Self::Json),
            "dict" => Some(Self::Dict),
            "str" | "string" => Some(Self::Str),
            _ => None,
        }
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => write!(f, "nothing"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "bool"),
            Self::DateTime => write!(f, "datetime"),
            Self::IntArray => write!(f, "int_array"),
            Self::FloatArray => write!(f, "float_array"),
            Self::StringArray => write!(f, "string_array"),
            Self::Json => write!(f, "json"),
            Self::Dict => write!(f, "dict"),
            Self::Str => write!(f, "str"),
        }
    }
}

// ============================================================================
// Values
// ============================================================================

/// Shape of a shallow-parsed bracket span: `[...]` becomes a list of raw
/// segments, `{...}` a string-to-string map.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonShape {
    List(Vec<String>),
    Map(IndexMap<String, String>),
}

/// A typed value parsed from raw text. The variant matches the
/// `InferredType` that selected it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nothing,
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
    StringArray(Vec<String>),
    Json(JsonShape),
    Dict(IndexMap<String, String>),
    Str(String),
}

impl Value {
    /// The tag this value carries.
    pub fn type_of(&self) -> InferredType {
        match self {
            Self::Nothing => InferredType::Nothing,
            Self::Int(_) => InferredType::Int,
            Self::Float(_) => InferredType::Float,
            Self::Bool(_) => InferredType::Bool,
            Self::DateTime(_) => InferredType::DateTime,
            Self::IntArray(_) => InferredType::IntArray,
            Self::FloatArray(_) => InferredType::FloatArray,
            Self::StringArray(_) => InferredType::StringArray,
            Self::Json(_) => InferredType::Json,
            Self::Dict(_) => InferredType::Dict,
            Self::Str(_) => InferredType::Str,
        }
    }

    /// Render for a shell `export KEY='VALUE'` line. Only scalar values
    /// a shell can hold round-trip; everything else is omitted.
    pub fn export_string(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(x) => Some(x.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Convert to a JSON document for CLI output and the run log.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Nothing => serde_json::Value::Null,
            Self::Int(n) => serde_json::Value::from(*n),
            Self::Float(x) => serde_json::Number::from_f64(*x)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::DateTime(dt) => {
                serde_json::Value::String(dt.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            Self::IntArray(v) => v.iter().copied().map(serde_json::Value::from).collect(),
            Self::FloatArray(v) => v
                .iter()
                .map(|x| {
                    serde_json::Number::from_f64(*x)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                })
                .collect(),
            Self::StringArray(v) => v.iter().cloned().map(serde_json::Value::from).collect(),
            Self::Json(JsonShape::List(v)) => {
                v.iter().cloned().map(serde_json::Value::from).collect()
            }
            Self::Json(JsonShape::Map(m)) | Self::Dict(m) => serde_json::Value::Object(
                m.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v.clone())))
                    .collect(),
            ),
            Self::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => Ok(()),
            Self::Str(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tz001_type_display() {
        assert_eq!(InferredType::Int.to_string(), "int");
        assert_eq!(InferredType::IntArray.to_string(), "int_array");
        assert_eq!(InferredType::Str.to_string(), "str");
    }

    #[test]
    fn test_tz001_type_from_name() {
        assert_eq!(InferredType::from_name("int"), Some(InferredType::Int));
        assert_eq!(InferredType::from_name("STRING"), Some(InferredType::Str));
        assert_eq!(
            InferredType::from_name("int_array"),
            Some(InferredType::IntArray)
        );
        assert_eq!(InferredType::from_name("tuple"), None);
    }

    #[test]
    fn test_tz001_type_name_roundtrip() {
        for t in [
            InferredType::Nothing,
            InferredType::Int,
            InferredType::Float,
            InferredType::Bool,
            InferredType::DateTime,
            InferredType::IntArray,
            InferredType::FloatArray,
            InferredType::StringArray,
            InferredType::Json,
            InferredType::Dict,
            InferredType::Str,
        ] {
            assert_eq!(InferredType::from_name(&t.to_string()), Some(t));
        }
    }

    #[test]
    fn test_tz001_value_type_of() {
        assert_eq!(Value::Int(3).type_of(), InferredType::Int);
        assert_eq!(Value::Nothing.type_of(), InferredType::Nothing);
        assert_eq!(
            Value::IntArray(vec![1, 2]).type_of(),
            InferredType::IntArray
        );
    }

    #[test]
    fn test_tz001_export_string_scalars() {
        assert_eq!(Value::Str("hi".into()).export_string(), Some("hi".into()));
        assert_eq!(Value::Int(-5).export_string(), Some("-5".into()));
        assert_eq!(Value::Bool(true).export_string(), Some("true".into()));
        assert_eq!(Value::Float(1.5).export_string(), Some("1.5".into()));
    }

    #[test]
    fn test_tz001_export_string_omits_structured() {
        assert_eq!(Value::Nothing.export_string(), None);
        assert_eq!(Value::IntArray(vec![1]).export_string(), None);
        assert_eq!(Value::Dict(IndexMap::new()).export_string(), None);
        assert_eq!(
            Value::Json(JsonShape::List(vec!["a".into()])).export_string(),
            None
        );
    }

    #[test]
    fn test_tz001_to_json() {
        assert_eq!(Value::Int(7).to_json(), serde_json::json!(7));
        assert_eq!(Value::Nothing.to_json(), serde_json::Value::Null);
        assert_eq!(
            Value::IntArray(vec![1, 2, 3]).to_json(),
            serde_json::json!([1, 2, 3])
        );
        let mut m = IndexMap::new();
        m.insert("a".to_string(), "1".to_string());
        assert_eq!(Value::Dict(m).to_json(), serde_json::json!({"a": "1"}));
    }

    #[test]
    fn test_tz001_display_str_verbatim() {
        assert_eq!(Value::Str("plain text".into()).to_string(), "plain text");
        assert_eq!(Value::Nothing.to_string(), "");
        assert_eq!(Value::IntArray(vec![1, 2]).to_string(), "[1,2]");
    }
}
