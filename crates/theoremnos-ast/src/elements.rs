//! Constructors and accessors for pandoc tree nodes.

use serde_json::{json, Value};

/// Inline element kinds across pandoc API versions.
pub const INLINE_KINDS: &[&str] = &[
    "Str",
    "Emph",
    "Underline",
    "Strong",
    "Strikeout",
    "Superscript",
    "Subscript",
    "SmallCaps",
    "Quoted",
    "Cite",
    "Code",
    "Space",
    "SoftBreak",
    "LineBreak",
    "Math",
    "RawInline",
    "Link",
    "Image",
    "Note",
    "Span",
];

pub fn tag(node: &Value) -> Option<&str> {
    node.get("t")?.as_str()
}

pub fn content(node: &Value) -> Option<&Value> {
    node.get("c")
}

pub fn is_kind(node: &Value, kind: &str) -> bool {
    tag(node) == Some(kind)
}

pub fn is_inline(node: &Value) -> bool {
    tag(node).is_some_and(|t| INLINE_KINDS.contains(&t))
}

/// Text of a `Str` node.
pub fn str_text(node: &Value) -> Option<&str> {
    if !is_kind(node, "Str") {
        return None;
    }
    content(node)?.as_str()
}

pub fn node(kind: &str, content: Value) -> Value {
    json!({ "t": kind, "c": content })
}

pub fn leaf(kind: &str) -> Value {
    json!({ "t": kind })
}

/// Attribute triple `[id, [classes], [[key, value], ..]]`.
pub fn attr(id: &str, classes: &[&str], pairs: &[(&str, &str)]) -> Value {
    let pairs: Vec<Value> = pairs.iter().map(|(k, v)| json!([k, v])).collect();
    json!([id, classes, pairs])
}

pub fn empty_attr() -> Value {
    attr("", &[], &[])
}

pub fn str_node(text: impl Into<String>) -> Value {
    node("Str", Value::String(text.into()))
}

pub fn space() -> Value {
    leaf("Space")
}

pub fn raw_inline(format: &str, text: impl Into<String>) -> Value {
    let text: String = text.into();
    node("RawInline", json!([format, text]))
}

pub fn raw_block(format: &str, text: impl Into<String>) -> Value {
    let text: String = text.into();
    node("RawBlock", json!([format, text]))
}

pub fn inline_math(tex: impl Into<String>) -> Value {
    let tex: String = tex.into();
    node("Math", json!([{ "t": "InlineMath" }, tex]))
}

pub fn plain(inlines: Vec<Value>) -> Value {
    node("Plain", Value::Array(inlines))
}

pub fn para(inlines: Vec<Value>) -> Value {
    node("Para", Value::Array(inlines))
}

pub fn header(level: u32, attr: Value, inlines: Vec<Value>) -> Value {
    node("Header", json!([level, attr, inlines]))
}

pub fn div(attr: Value, blocks: Vec<Value>) -> Value {
    node("Div", json!([attr, blocks]))
}

pub fn span(attr: Value, inlines: Vec<Value>) -> Value {
    node("Span", json!([attr, inlines]))
}

pub fn link(attr: Value, inlines: Vec<Value>, url: &str, title: &str) -> Value {
    node("Link", json!([attr, inlines, [url, title]]))
}

/// A definition list item is `[term, [definition, ..]]`.
pub fn definition_list(items: Vec<Value>) -> Value {
    node("DefinitionList", Value::Array(items))
}

pub fn citation(id: &str) -> Value {
    json!({
        "citationId": id,
        "citationPrefix": [],
        "citationSuffix": [],
        "citationMode": { "t": "NormalCitation" },
        "citationNoteNum": 0,
        "citationHash": 0
    })
}

pub fn cite(citations: Vec<Value>, inlines: Vec<Value>) -> Value {
    node("Cite", json!([citations, inlines]))
}

/// Flatten a node or list of nodes to plain text.
pub fn stringify(value: &Value) -> String {
    let mut out = String::new();
    collect_text(value, &mut out);
    out
}

fn collect_text(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_text(item, out)),
        Value::Object(_) => match tag(value) {
            Some("Str") => {
                if let Some(text) = content(value).and_then(Value::as_str) {
                    out.push_str(text);
                }
            }
            Some("Code") | Some("Math") => {
                if let Some(text) = content(value).and_then(|c| c.get(1)).and_then(Value::as_str) {
                    out.push_str(text);
                }
            }
            Some("Space") | Some("SoftBreak") | Some("LineBreak") => out.push(' '),
            Some("RawInline") | Some("RawBlock") => {}
            Some("Cite") => {
                if let Some(inlines) = content(value).and_then(|c| c.get(1)) {
                    collect_text(inlines, out);
                }
            }
            Some(_) => {
                if let Some(c) = content(value) {
                    collect_text(c, out);
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

    #[test]
    fn stringify_flattens_inlines() {
        let inlines = json!([
            str_node("Main"),
            space(),
            node("Emph", json!([str_node("result")])),
            space(),
            inline_math("x^2"),
            raw_inline("tex", "\\relax"),
        ]);
        assert_eq!(stringify(&inlines), "Main result x^2");
    }

    #[test]
    fn stringify_cite_uses_rendered_text() {
        let c = cite(vec![citation("lemma:a")], vec![str_node("@lemma:a")]);
        assert_eq!(stringify(&c), "@lemma:a");
    }

    #[test]
    fn str_text_only_reads_str_nodes() {
        assert_eq!(str_text(&str_node("a")), Some("a"));
        assert_eq!(str_text(&space()), None);
        assert!(is_inline(&space()));
        assert!(!is_inline(&para(vec![])));
    }
}
