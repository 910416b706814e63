//! Generic tree walking.
//!
//! The walker visits tagged nodes inside every list in document order. The
//! action decides per node whether to keep it, replace it, or splice a list
//! of nodes in its place. Kept and replacement nodes are descended into
//! afterwards; a replacement is not offered to the action again.

use serde_json::{Map, Value};
use std::convert::Infallible;

use crate::elements::{content, is_inline, tag};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Keep,
    Replace(Value),
    /// Replace the node by zero or more nodes.
    Splice(Vec<Value>),
}

pub fn try_walk<E, F>(value: Value, action: &mut F) -> Result<Value, E>
where
    F: FnMut(&str, &Value) -> Result<Action, E>,
{
    match value {
        Value::Array(items) => Ok(Value::Array(try_walk_list(items, action)?)),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                out.insert(key, try_walk(child, action)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other),
    }
}

pub fn try_walk_list<E, F>(items: Vec<Value>, action: &mut F) -> Result<Vec<Value>, E>
where
    F: FnMut(&str, &Value) -> Result<Action, E>,
{
    let null = Value::Null;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let outcome = match tag(&item) {
            Some(kind) => action(kind, content(&item).unwrap_or(&null))?,
            None => Action::Keep,
        };
        match outcome {
            Action::Keep => out.push(try_walk(item, action)?),
            Action::Replace(node) => out.push(try_walk(node, action)?),
            Action::Splice(nodes) => {
                for node in nodes {
                    out.push(try_walk(node, action)?);
                }
            }
        }
    }
    Ok(out)
}

pub fn walk<F>(value: Value, mut action: F) -> Value
where
    F: FnMut(&str, &Value) -> Action,
{
    let result: Result<Value, Infallible> =
        try_walk(value, &mut |kind: &str, c: &Value| Ok(action(kind, c)));
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

pub fn walk_list<F>(items: Vec<Value>, mut action: F) -> Vec<Value>
where
    F: FnMut(&str, &Value) -> Action,
{
    let result: Result<Vec<Value>, Infallible> =
        try_walk_list(items, &mut |kind: &str, c: &Value| Ok(action(kind, c)));
    match result {
        Ok(items) => items,
        Err(never) => match never {},
    }
}

/// Rewrite every non-empty list made only of inline nodes, innermost first.
pub fn map_inline_lists<F>(value: Value, f: &mut F) -> Value
where
    F: FnMut(Vec<Value>) -> Vec<Value>,
{
    match value {
        Value::Array(items) => {
            let mut mapped = Vec::with_capacity(items.len());
            for item in items {
                mapped.push(map_inline_lists(item, f));
            }
            if !mapped.is_empty() && mapped.iter().all(is_inline) {
                Value::Array(f(mapped))
            } else {
                Value::Array(mapped)
            }
        }
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                out.insert(key, map_inline_lists(child, f));
            }
            Value::Object(out)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{para, space, str_node};
    use serde_json::json;

    #[test]
    fn replaces_and_splices_nodes() {
        let blocks = vec![para(vec![str_node("a"), space(), str_node("b")])];
        let out = walk_list(blocks, |kind, c| match (kind, c.as_str()) {
            ("Str", Some("a")) => Action::Replace(str_node("A")),
            ("Space", _) => Action::Splice(vec![]),
            _ => Action::Keep,
        });
        assert_eq!(out, vec![para(vec![str_node("A"), str_node("b")])]);
    }

    #[test]
    fn errors_stop_the_walk() {
        let blocks = vec![para(vec![str_node("bad")])];
        let result: Result<Vec<Value>, String> = try_walk_list(blocks, &mut |kind: &str, _: &Value| {
            if kind == "Str" {
                Err("stop".to_string())
            } else {
                Ok(Action::Keep)
            }
        });
        assert_eq!(result.unwrap_err(), "stop");
    }

    #[test]
    fn inline_lists_are_mapped_bottom_up() {
        let doc = json!([para(vec![str_node("x"), json!({"t": "Emph", "c": [str_node("y")]})])]);
        let mut seen = Vec::new();
        let _ = map_inline_lists(doc, &mut |inlines: Vec<Value>| {
            seen.push(inlines.len());
            inlines
        });
        assert_eq!(seen, vec![1, 2]);
    }
}
