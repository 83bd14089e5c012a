//! Arena document tree.
//!
//! Every node lives in one `Vec` owned by the [`Document`]. Children are
//! ordered lists of [`NodeId`] handles and each node keeps a non-owning handle
//! to its parent, so moving or merging nodes never creates ownership cycles.

use smol_str::SmolStr;
use source_edit::Span;

/// A handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A parsed markup document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// What this node is.
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The node variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root. Always `NodeId(0)`.
    Root,
    Element(Element),
    Text(Text),
    Comment(Comment),
}

/// An element with its attributes. Children are stored on the [`Node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The lowercased tag name.
    pub name: SmolStr,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    /// Whether the source used `/>`.
    pub self_closing: bool,
    /// The span of the opening tag.
    pub span: Span,
}

/// A `name="value"` pair. Valueless attributes have an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The lowercased attribute name.
    pub name: SmolStr,
    /// The value with character references decoded.
    pub value: String,
    /// The span of the whole attribute in the source, or an empty span for
    /// attributes created by a rewrite.
    pub span: Span,
}

/// A text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// The text with character references decoded (raw for script/style).
    pub value: String,
    pub span: Span,
}

/// An HTML comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// The text between `<!--` and `-->`.
    pub data: String,
    pub span: Span,
}

impl Attribute {
    /// Creates an attribute that has no source location.
    pub fn new(name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            span: Span::default(),
        }
    }
}

impl Element {
    /// Creates an element with no attributes.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            self_closing: false,
            span: Span::default(),
        }
    }

    /// Returns the value of the first attribute with the given name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|attr| attr.name == name)
    }

    /// Appends an attribute unless one with the same name already exists.
    pub fn push_attr(&mut self, attr: Attribute) {
        if !self.has_attr(&attr.name) {
            self.attributes.push(attr);
        }
    }
}

impl Node {
    /// Returns the parent of this node, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the ordered children of this node.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not created by this document.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Returns the children of `id`.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut Text> {
        match &mut self.node_mut(id).kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the tag name of `id` if it is an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.name.as_str())
    }

    /// Adds a detached node to the arena.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Adds a detached text node to the arena.
    pub fn create_text(&mut self, value: impl Into<String>) -> NodeId {
        self.create(NodeKind::Text(Text {
            value: value.into(),
            span: Span::default(),
        }))
    }

    /// Appends `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Inserts `child` at `index` among the children of `parent`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Removes `id` from its parent. The node stays in the arena and can be
    /// reattached or serialized on its own.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|&child| child != id);
        }
    }

    /// Returns `id` followed by all of its descendants in document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            stack: vec![id],
        }
    }

    /// Concatenates the values of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|node| self.node(node).as_text())
            .map(|text| text.value.as_str())
            .collect()
    }

    /// Replaces the children of `id` with a single text node holding `value`.
    ///
    /// The first existing text child is reused so its span survives. An empty
    /// value leaves `id` without children.
    pub fn set_text_content(&mut self, id: NodeId, value: impl Into<String>) {
        let value = value.into();
        let reuse = self
            .children(id)
            .iter()
            .copied()
            .find(|&child| self.node(child).as_text().is_some());

        for child in self.children(id).to_vec() {
            if Some(child) != reuse {
                self.detach(child);
            }
        }

        if value.is_empty() {
            if let Some(text) = reuse {
                self.detach(text);
            }
            return;
        }

        match reuse {
            Some(text) => {
                if let Some(text) = self.text_mut(text) {
                    text.value = value;
                }
            }
            None => {
                let text = self.create_text(value);
                self.append_child(id, text);
            }
        }
    }
}

/// Pre-order iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.document.children(id).iter().rev().copied());
        Some(id)
    }
}
