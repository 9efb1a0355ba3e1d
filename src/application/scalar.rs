//! Scalar payload for documents loaded from TOML or JSON

use std::fmt;

use serde::Serialize;

use crate::domain::Project;

/// Leaf value of a loaded document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Returns the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Text(_) => "text",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Attributes available for mapped projection: `type`, `len` and `text`.
///
/// `len` counts characters of text, is 0 for null and 1 for any other scalar.
impl Project for Scalar {
    type Output = Scalar;

    fn project(&self, name: &str) -> Option<Scalar> {
        match name {
            "type" => Some(Scalar::Text(self.type_name().to_string())),
            "len" => {
                let len = match self {
                    Scalar::Text(text) => text.chars().count(),
                    Scalar::Null => 0,
                    _ => 1,
                };
                i64::try_from(len).ok().map(Scalar::Int)
            }
            "text" => Some(Scalar::Text(self.to_string())),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

impl From<&str> for Scalar {
    fn from(text: &str) -> Self {
        Scalar::Text(text.to_string())
    }
}

impl From<String> for Scalar {
    fn from(text: String) -> Self {
        Scalar::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Scalar::Null, "null", 0)]
    #[case(Scalar::Bool(true), "bool", 1)]
    #[case(Scalar::Int(42), "int", 1)]
    #[case(Scalar::Float(0.5), "float", 1)]
    #[case(Scalar::from("héllo"), "text", 5)]
    fn projects_type_and_len(#[case] scalar: Scalar, #[case] type_name: &str, #[case] len: i64) {
        assert_eq!(scalar.project("type"), Some(Scalar::from(type_name)));
        assert_eq!(scalar.project("len"), Some(Scalar::Int(len)));
        assert_eq!(scalar.project("missing"), None);
    }
}
