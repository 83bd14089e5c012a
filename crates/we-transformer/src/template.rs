//! Markup rewriting.
//!
//! Walks the template tree in place, turning legacy directive attributes
//! into their Vue forms and collecting every tag name it meets.

use indexmap::IndexSet;
use smol_str::SmolStr;
use we_parser::{Attribute, Document, NodeId};

use crate::expression::{compile, has_interpolation, strip_full_span};
use crate::names::{
    camel_case, is_builtin_event, is_builtin_tag, quote, renamed_tag, DEFAULT_REPEAT_VALUE,
};

/// Tag whose text content is trimmed.
const TEXT_TAG: &str = "text";

/// Rewrites `node` and its subtree, appending each tag name to `tags` in
/// pre-order the first time it is seen.
pub fn rewrite(doc: &mut Document, node: NodeId, tags: &mut IndexSet<SmolStr>) {
    let Some(element) = doc.element_mut(node) else {
        return;
    };

    if let Some(renamed) = renamed_tag(&element.name) {
        element.name = SmolStr::new_static(renamed);
    }
    let tag = element.name.clone();

    for attr in &mut element.attributes {
        if let Some((name, value)) = rewrite_attribute(&tag, attr) {
            attr.name = name;
            attr.value = value;
        }
    }

    if tag == TEXT_TAG {
        trim_text(doc, node);
    }
    tags.insert(tag);

    for child in doc.children(node).to_vec() {
        rewrite(doc, child, tags);
    }
}

fn trim_text(doc: &mut Document, node: NodeId) {
    let texts: Vec<NodeId> = doc
        .descendants(node)
        .filter(|&id| doc.node(id).as_text().is_some())
        .collect();
    for id in texts {
        if let Some(text) = doc.text_mut(id) {
            let trimmed = text.value.trim();
            if trimmed.len() != text.value.len() {
                text.value = trimmed.to_string();
            }
        }
    }
}

/// Returns the replacement name and value for `attr`, or `None` when the
/// attribute stays as it is.
fn rewrite_attribute(tag: &str, attr: &Attribute) -> Option<(SmolStr, String)> {
    let value = attr.value.as_str();
    match attr.name.as_str() {
        "id" => {
            let value = value.trim();
            let compiled = compile(value);
            if compiled.dynamic {
                Some((SmolStr::new_static(":ref"), compiled.code))
            } else {
                Some((SmolStr::new_static("ref"), value.to_string()))
            }
        }
        "class" => rewrite_class(value).map(|code| (SmolStr::new_static(":class"), code)),
        "style" => rewrite_style(value).map(|code| (SmolStr::new_static(":style"), code)),
        "if" => Some((SmolStr::new_static("v-if"), compile(value).code)),
        "else" => Some((SmolStr::new_static("v-else"), String::new())),
        "repeat" => Some((SmolStr::new_static("v-for"), rewrite_repeat(value))),
        name if name.len() > 2 && name.starts_with("on") => {
            let event = &name[2..];
            let binding = if !is_builtin_tag(tag) && is_builtin_event(event) {
                format!("@{event}.native")
            } else {
                format!("@{event}")
            };
            Some((SmolStr::new(binding), compile(value).code))
        }
        name => {
            let compiled = compile(value);
            compiled
                .dynamic
                .then(|| (SmolStr::new(format!(":{name}")), compiled.code))
        }
    }
}

/// Splits a class list on whitespace outside `{{ }}` and builds an array
/// binding when any class is dynamic.
fn rewrite_class(value: &str) -> Option<String> {
    let tokens = split_class(value);
    if !tokens.iter().any(|token| has_interpolation(token)) {
        return None;
    }
    let items: Vec<String> = tokens
        .iter()
        .map(|token| {
            let compiled = compile(token);
            if compiled.dynamic {
                compiled.code
            } else {
                quote(token)
            }
        })
        .collect();
    Some(format!("[{}]", items.join(", ")))
}

fn split_class(value: &str) -> Vec<&str> {
    let bytes = value.as_bytes();
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i..].starts_with(b"{{") {
            depth += 1;
            start.get_or_insert(i);
            i += 2;
            continue;
        }
        if depth > 0 && bytes[i..].starts_with(b"}}") {
            depth -= 1;
            i += 2;
            continue;
        }
        if depth == 0 && bytes[i].is_ascii_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(&value[s..i]);
            }
        } else {
            start.get_or_insert(i);
        }
        i += 1;
    }
    if let Some(s) = start {
        tokens.push(&value[s..]);
    }
    tokens
}

/// Builds an object binding from a declaration list when any value is
/// dynamic.
fn rewrite_style(value: &str) -> Option<String> {
    if !has_interpolation(value) {
        return None;
    }
    let mut entries = Vec::new();
    let mut dynamic = false;
    for declaration in value.split(';') {
        let Some((key, raw)) = declaration.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let compiled = compile(raw.trim());
        dynamic |= compiled.dynamic;
        let value = if compiled.dynamic {
            compiled.code
        } else {
            quote(raw.trim())
        };
        entries.push(format!("{}: {}", camel_case(key), value));
    }
    dynamic.then(|| format!("{{ {} }}", entries.join(", ")))
}

/// Converts a `repeat` value to a `v-for` expression.
fn rewrite_repeat(value: &str) -> String {
    let value = strip_full_span(value);
    let Some(at) = value.rfind(" in ") else {
        return format!("{DEFAULT_REPEAT_VALUE} in {value}");
    };
    let binding = value[..at].trim();
    let list = value[at + 4..].trim();

    let pair = binding
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .and_then(|inner| inner.split_once(','));
    match pair {
        Some((key, item)) => format!("({}, {}) in {list}", item.trim(), key.trim()),
        None => format!("{binding} in {list}"),
    }
}
