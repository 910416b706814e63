//! Typed pandoc metadata values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::elements::{content, stringify, tag};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum MetaValue {
    MetaMap(BTreeMap<String, MetaValue>),
    MetaList(Vec<MetaValue>),
    MetaBool(bool),
    MetaString(String),
    MetaInlines(Vec<Value>),
    MetaBlocks(Vec<Value>),
}

impl MetaValue {
    /// Plain-text reading of a scalar value, the way filters see metadata
    /// written in YAML (`key: text` arrives as inlines).
    pub fn to_text(&self) -> Option<String> {
        match self {
            MetaValue::MetaString(s) => Some(s.clone()),
            MetaValue::MetaBool(b) => Some(b.to_string()),
            MetaValue::MetaInlines(inlines) => Some(stringify(&Value::Array(inlines.clone()))),
            MetaValue::MetaBlocks(blocks) => Some(stringify(&Value::Array(blocks.clone()))),
            MetaValue::MetaMap(_) | MetaValue::MetaList(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::MetaBool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[MetaValue]> {
        match self {
            MetaValue::MetaList(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, MetaValue>> {
        match self {
            MetaValue::MetaMap(map) => Some(map),
            _ => None,
        }
    }

    /// Concatenated text of every raw fragment and string in this value.
    pub fn raw_text(&self) -> String {
        let mut out = String::new();
        self.collect_raw(&mut out);
        out
    }

    fn collect_raw(&self, out: &mut String) {
        match self {
            MetaValue::MetaString(s) => {
                out.push_str(s);
                out.push('\n');
            }
            MetaValue::MetaBool(_) => {}
            MetaValue::MetaList(items) => items.iter().for_each(|item| item.collect_raw(out)),
            MetaValue::MetaMap(map) => map.values().for_each(|item| item.collect_raw(out)),
            MetaValue::MetaInlines(nodes) | MetaValue::MetaBlocks(nodes) => {
                for node in nodes {
                    collect_raw_nodes(node, out);
                }
            }
        }
    }
}

fn collect_raw_nodes(node: &Value, out: &mut String) {
    match node {
        Value::Array(items) => items.iter().for_each(|item| collect_raw_nodes(item, out)),
        Value::Object(_) => match tag(node) {
            Some("RawBlock") | Some("RawInline") => {
                if let Some(text) = content(node).and_then(|c| c.get(1)).and_then(Value::as_str) {
                    out.push_str(text);
                    out.push('\n');
                }
            }
            Some(_) => {
                if let Some(c) = content(node) {
                    collect_raw_nodes(c, out);
                }
            }
            None => {}
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{raw_block, str_node};
    use serde_json::json;

    #[test]
    fn deserializes_pandoc_meta() {
        let meta: BTreeMap<String, MetaValue> = serde_json::from_value(json!({
            "flag": {"t": "MetaBool", "c": true},
            "level": {"t": "MetaInlines", "c": [{"t": "Str", "c": "1"}]},
            "names": {"t": "MetaList", "c": [
                {"t": "MetaMap", "c": {"id": {"t": "MetaInlines", "c": [{"t": "Str", "c": "lemma"}]}}}
            ]}
        }))
        .unwrap();
        assert_eq!(meta["flag"].as_bool(), Some(true));
        assert_eq!(meta["level"].to_text().as_deref(), Some("1"));
        let first = &meta["names"].as_list().unwrap()[0];
        assert_eq!(first.as_map().unwrap()["id"].to_text().as_deref(), Some("lemma"));
    }

    #[test]
    fn raw_text_collects_fragments() {
        let value = MetaValue::MetaList(vec![
            MetaValue::MetaBlocks(vec![raw_block("tex", "\\usepackage{cleveref}")]),
            MetaValue::MetaInlines(vec![str_node("ignored")]),
        ]);
        let text = value.raw_text();
        assert!(text.contains("\\usepackage{cleveref}"));
        assert!(!text.contains("ignored"));
    }
}
