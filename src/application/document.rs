//! Loading TOML/JSON documents into structured containers
//!
//! Tables become nested containers, arrays of scalars become groups, scalars
//! become values. A key named `root` becomes the container root.

use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::{debug, instrument};

use crate::application::{
    ApplicationError, ApplicationResult, IoResultExt, ParseResultExt, Scalar,
};
use crate::domain::{Metadata, Slot, Structured};

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        match path.extension().and_then(OsStr::to_str) {
            Some("toml") => Ok(Format::Toml),
            Some("json") => Ok(Format::Json),
            _ => Err(ApplicationError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A loaded document: the container plus where it came from.
#[derive(Debug, Clone)]
pub struct Document {
    path: Option<PathBuf>,
    structured: Structured<Scalar>,
}

impl Document {
    pub fn from_toml_str(content: &str) -> ApplicationResult<Self> {
        Self::parse(content, Format::Toml)
    }

    pub fn from_json_str(content: &str) -> ApplicationResult<Self> {
        Self::parse(content, Format::Json)
    }

    #[instrument(level = "debug", skip(content), fields(len = content.len()))]
    pub fn parse(content: &str, format: Format) -> ApplicationResult<Self> {
        let structured = match format {
            Format::Toml => {
                let table: toml::Table = toml::from_str(content).for_format(format.name())?;
                from_toml_table(table, "")?
            }
            Format::Json => {
                let value: serde_json::Value =
                    serde_json::from_str(content).for_format(format.name())?;
                match value {
                    serde_json::Value::Object(object) => from_json_object(object, "")?,
                    other => {
                        return Err(ApplicationError::unsupported_shape(
                            "",
                            format!("top level must be an object, found {}", json_kind(&other)),
                        ))
                    }
                }
            }
        };
        debug!(slots = structured.len(), %format, "parsed document");
        Ok(Self {
            path: None,
            structured,
        })
    }

    /// Read and parse `path`; the format follows the file extension.
    ///
    /// The source path and format are attached as container metadata.
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> ApplicationResult<Self> {
        let format = Format::from_path(path)?;
        let content = fs::read_to_string(path).with_path_context("read document", path)?;
        let mut document = Self::parse(&content, format)?;

        let mut metadata = Metadata::new();
        metadata.insert("source".into(), json!(path.display().to_string()));
        metadata.insert("format".into(), json!(format.name()));
        document.structured.set_metadata(Some(metadata));
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    /// Register names for mapped projection on the top-level container.
    pub fn with_mapped_attrs<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        for name in names {
            self.structured.add_mapped_attr(name);
        }
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn structured(&self) -> &Structured<Scalar> {
        &self.structured
    }

    pub fn structured_mut(&mut self) -> &mut Structured<Scalar> {
        &mut self.structured
    }

    pub fn into_structured(self) -> Structured<Scalar> {
        self.structured
    }

    /// Pretty JSON of the mapping view.
    pub fn to_json(&self, recurse: bool) -> ApplicationResult<String> {
        serde_json::to_string_pretty(&self.structured.to_dict(recurse)).map_err(|e| {
            ApplicationError::OperationFailed {
                context: "serialize document".into(),
                source: Box::new(e),
            }
        })
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn from_toml_table(table: toml::Table, path: &str) -> ApplicationResult<Structured<Scalar>> {
    let slots = table
        .into_iter()
        .map(|(key, value)| {
            let child = child_path(path, &key);
            let slot = match value {
                toml::Value::Table(table) => Slot::Nested(from_toml_table(table, &child)?),
                toml::Value::Array(items) => Slot::Group(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| toml_scalar(item, &format!("{child}[{i}]")))
                        .collect::<ApplicationResult<_>>()?,
                ),
                other => Slot::Value(toml_scalar(other, &child)?),
            };
            Ok((key, slot))
        })
        .collect::<ApplicationResult<Vec<_>>>()?;
    Ok(Structured::new(None, slots)?)
}

fn toml_scalar(value: toml::Value, path: &str) -> ApplicationResult<Scalar> {
    match value {
        toml::Value::String(text) => Ok(Scalar::Text(text)),
        toml::Value::Integer(n) => Ok(Scalar::Int(n)),
        toml::Value::Float(x) => Ok(Scalar::Float(x)),
        toml::Value::Boolean(b) => Ok(Scalar::Bool(b)),
        toml::Value::Datetime(dt) => Ok(Scalar::Text(dt.to_string())),
        toml::Value::Array(_) | toml::Value::Table(_) => Err(ApplicationError::unsupported_shape(
            path,
            "groups may only hold scalar values",
        )),
    }
}

fn from_json_object(
    object: serde_json::Map<String, serde_json::Value>,
    path: &str,
) -> ApplicationResult<Structured<Scalar>> {
    let slots = object
        .into_iter()
        .map(|(key, value)| {
            let child = child_path(path, &key);
            let slot = match value {
                serde_json::Value::Object(object) => Slot::Nested(from_json_object(object, &child)?),
                serde_json::Value::Array(items) => Slot::Group(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| json_scalar(item, &format!("{child}[{i}]")))
                        .collect::<ApplicationResult<_>>()?,
                ),
                other => Slot::Value(json_scalar(other, &child)?),
            };
            Ok((key, slot))
        })
        .collect::<ApplicationResult<Vec<_>>>()?;
    Ok(Structured::new(None, slots)?)
}

fn json_scalar(value: serde_json::Value, path: &str) -> ApplicationResult<Scalar> {
    match value {
        serde_json::Value::Null => Ok(Scalar::Null),
        serde_json::Value::Bool(b) => Ok(Scalar::Bool(b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Scalar::Int)
            .or_else(|| n.as_f64().map(Scalar::Float))
            .ok_or_else(|| ApplicationError::unsupported_shape(path, format!("number {n} out of range"))),
        serde_json::Value::String(text) => Ok(Scalar::Text(text)),
        other => Err(ApplicationError::unsupported_shape(
            path,
            format!("groups may only hold scalar values, found {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StructuredError;

    #[test]
    fn toml_root_and_groups() {
        let doc = Document::from_toml_str(
            r#"
root = [1, 2]
b = 3

[c]
x = "y"
"#,
        )
        .unwrap();
        let s = doc.structured();
        assert_eq!(s.root(), Some(&Slot::group([Scalar::Int(1), Scalar::Int(2)])));
        assert_eq!(s.get("b").unwrap(), &Slot::value(Scalar::Int(3)));
        let c = s.get("c").unwrap().as_nested().unwrap();
        assert_eq!(c.get("x").unwrap(), &Slot::value(Scalar::from("y")));
    }

    #[test]
    fn json_keeps_key_order() {
        let doc = Document::from_json_str(r#"{"z": 1, "a": 2, "m": null}"#).unwrap();
        assert_eq!(doc.structured().keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
    }

    #[test]
    fn nested_arrays_are_rejected() {
        let err = Document::from_json_str(r#"{"a": [[1]]}"#).unwrap_err();
        assert!(
            matches!(&err, ApplicationError::UnsupportedShape { path, .. } if path == "a[0]"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn reserved_keys_are_rejected() {
        let err = Document::from_toml_str("_hidden = 1").unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Structured(StructuredError::InvalidKey { .. })
        ));
    }

    #[test]
    fn top_level_must_be_object() {
        assert!(matches!(
            Document::from_json_str("[1, 2]").unwrap_err(),
            ApplicationError::UnsupportedShape { .. }
        ));
    }
}
