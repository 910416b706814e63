//! Pandoc JSON document tree used by the theorem numbering filter.
//!
//! Nodes are kept as `serde_json::Value` objects of the form
//! `{"t": kind, "c": content}` so every element pandoc emits passes through
//! untouched, whatever the pandoc version. Metadata is typed
//! ([`MetaValue`]) because the filter reads its configuration from it.

pub mod elements;
pub mod meta;
pub mod walk;

use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub use elements::stringify;
pub use meta::MetaValue;
pub use walk::{map_inline_lists, try_walk, try_walk_list, walk, walk_list, Action};

/// Document metadata, keyed by variable name.
pub type Meta = BTreeMap<String, MetaValue>;

/// Key carrying the API version in modern documents.
pub const API_VERSION_KEY: &str = "pandoc-api-version";

#[derive(Debug, thiserror::Error)]
pub enum AstError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unrecognized document container")]
    UnknownShape,
    #[error("invalid pandoc version '{0}'")]
    InvalidVersion(String),
    #[error("pandoc {version} implies a {expected:?} document but found {found:?}")]
    ShapeMismatch {
        version: String,
        expected: Shape,
        found: Shape,
    },
}

/// Top-level container layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `{"pandoc-api-version": [..], "meta": {..}, "blocks": [..]}` (pandoc >= 1.18)
    Modern,
    /// `[{"unMeta": {..}}, [block, ..]]`
    Legacy,
    /// `[{"unMeta": {..}}, block, ..]`
    LegacyFlat,
}

impl Shape {
    pub fn detect(value: &Value) -> Option<Shape> {
        match value {
            Value::Object(map) if map.contains_key("blocks") => Some(Shape::Modern),
            Value::Array(items) => {
                let head = items.first()?;
                if head.get("unMeta").is_none() {
                    return None;
                }
                match items.get(1) {
                    Some(Value::Array(_)) if items.len() == 2 => Some(Shape::Legacy),
                    _ => Some(Shape::LegacyFlat),
                }
            }
            _ => None,
        }
    }

    pub fn is_legacy(self) -> bool {
        !matches!(self, Shape::Modern)
    }
}

/// Returns true when `version` is at least `major.minor`.
pub fn version_at_least(version: &str, major: u32, minor: u32) -> Result<bool, AstError> {
    let mut parts = version.trim().split('.');
    let mut next = || -> Result<u32, AstError> {
        match parts.next() {
            None => Ok(0),
            Some(p) => p
                .parse::<u32>()
                .map_err(|_| AstError::InvalidVersion(version.to_string())),
        }
    };
    let found = (next()?, next()?);
    Ok(found >= (major, minor))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub shape: Shape,
    pub meta: Meta,
    pub blocks: Vec<Value>,
    /// Top-level keys other than `meta`/`blocks` (modern shape only).
    extra: Map<String, Value>,
}

impl Document {
    pub fn new(meta: Meta, blocks: Vec<Value>) -> Self {
        let mut extra = Map::new();
        extra.insert(
            API_VERSION_KEY.to_string(),
            Value::Array(vec![1.into(), 23.into(), 1.into()]),
        );
        Self {
            shape: Shape::Modern,
            meta,
            blocks,
            extra,
        }
    }

    /// Parse a document, optionally checking its layout against the pandoc
    /// version that produced it.
    pub fn from_json(input: &str, pandoc_version: Option<&str>) -> Result<Self, AstError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(value, pandoc_version)
    }

    pub fn from_value(value: Value, pandoc_version: Option<&str>) -> Result<Self, AstError> {
        let shape = Shape::detect(&value).ok_or(AstError::UnknownShape)?;
        if let Some(version) = pandoc_version {
            let expected = if version_at_least(version, 1, 18)? {
                Shape::Modern
            } else {
                Shape::Legacy
            };
            if expected.is_legacy() != shape.is_legacy() {
                return Err(AstError::ShapeMismatch {
                    version: version.to_string(),
                    expected,
                    found: shape,
                });
            }
        }

        match value {
            Value::Object(mut map) => {
                let meta = match map.remove("meta") {
                    Some(meta) => serde_json::from_value(meta)?,
                    None => Meta::new(),
                };
                let blocks = match map.remove("blocks") {
                    Some(Value::Array(blocks)) => blocks,
                    _ => return Err(AstError::UnknownShape),
                };
                Ok(Self {
                    shape,
                    meta,
                    blocks,
                    extra: map,
                })
            }
            Value::Array(items) => {
                let mut items = items.into_iter();
                let head = items.next().ok_or(AstError::UnknownShape)?;
                let meta = match head {
                    Value::Object(mut head) => match head.remove("unMeta") {
                        Some(meta) => serde_json::from_value(meta)?,
                        None => Meta::new(),
                    },
                    _ => return Err(AstError::UnknownShape),
                };
                let blocks = match (shape, items.next()) {
                    (Shape::Legacy, Some(Value::Array(blocks))) => blocks,
                    (_, first) => first.into_iter().chain(items).collect(),
                };
                Ok(Self {
                    shape,
                    meta,
                    blocks,
                    extra: Map::new(),
                })
            }
            _ => Err(AstError::UnknownShape),
        }
    }

    /// Serialize back into the layout the document was read from.
    pub fn to_value(&self) -> Result<Value, AstError> {
        let meta = serde_json::to_value(&self.meta)?;
        let value = match self.shape {
            Shape::Modern => {
                let mut map = self.extra.clone();
                map.insert("meta".to_string(), meta);
                map.insert("blocks".to_string(), Value::Array(self.blocks.clone()));
                Value::Object(map)
            }
            Shape::Legacy => {
                let mut head = Map::new();
                head.insert("unMeta".to_string(), meta);
                Value::Array(vec![Value::Object(head), Value::Array(self.blocks.clone())])
            }
            Shape::LegacyFlat => {
                let mut head = Map::new();
                head.insert("unMeta".to_string(), meta);
                let mut items = vec![Value::Object(head)];
                items.extend(self.blocks.iter().cloned());
                Value::Array(items)
            }
        };
        Ok(value)
    }

    pub fn to_json(&self) -> Result<String, AstError> {
        Ok(serde_json::to_string(&self.to_value()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_modern_and_legacy_shapes() {
        assert_eq!(
            Shape::detect(&json!({"pandoc-api-version": [1, 22], "meta": {}, "blocks": []})),
            Some(Shape::Modern)
        );
        assert_eq!(
            Shape::detect(&json!([{"unMeta": {}}, []])),
            Some(Shape::Legacy)
        );
        assert_eq!(
            Shape::detect(&json!([{"unMeta": {}}, {"t": "Para", "c": []}, {"t": "HorizontalRule"}])),
            Some(Shape::LegacyFlat)
        );
        assert_eq!(Shape::detect(&json!({"meta": {}})), None);
    }

    #[test]
    fn version_comparison() {
        assert!(version_at_least("1.18", 1, 18).unwrap());
        assert!(version_at_least("2.9.2.1", 1, 18).unwrap());
        assert!(!version_at_least("1.17.2", 1, 18).unwrap());
        assert!(version_at_least("x.y", 1, 18).is_err());
    }

    #[test]
    fn version_mismatch_is_reported() {
        let err = Document::from_json(r#"[{"unMeta": {}}, []]"#, Some("2.0")).unwrap_err();
        assert!(matches!(err, AstError::ShapeMismatch { .. }));
    }

    #[test]
    fn modern_document_keeps_api_version() {
        let input = r#"{"pandoc-api-version":[1,22,2],"meta":{},"blocks":[{"t":"HorizontalRule"}]}"#;
        let doc = Document::from_json(input, None).unwrap();
        let out = doc.to_value().unwrap();
        assert_eq!(out["pandoc-api-version"], json!([1, 22, 2]));
        assert_eq!(out["blocks"][0]["t"], "HorizontalRule");
    }
}
