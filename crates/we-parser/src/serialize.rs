//! Markup serializer.

use crate::dom::{Document, NodeId, NodeKind};
use crate::entities::{escape_attribute, escape_text};
use crate::parser::{is_raw_text_element, is_void_element};

impl Document {
    /// Serializes the whole document.
    pub fn serialize(&self) -> String {
        self.serialize_children(self.root())
    }

    /// Serializes the children of `id`, without `id` itself.
    pub fn serialize_children(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serializes `id` and its subtree.
    pub fn serialize_node(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.node(id).kind {
            NodeKind::Root => {
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.name);
                for attr in &element.attributes {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(&attr.value));
                    out.push('"');
                }
                out.push('>');

                if is_void_element(&element.name) {
                    return;
                }
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
            NodeKind::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|parent| self.tag_name(parent))
                    .is_some_and(is_raw_text_element);
                if raw {
                    out.push_str(&text.value);
                } else {
                    out.push_str(&escape_text(&text.value));
                }
            }
            NodeKind::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(&comment.data);
                out.push_str("-->");
            }
        }
    }
}
