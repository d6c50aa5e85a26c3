//! Input tree for the converter.
//!
//! Whatever produced the DOM (html5ever, a CDP snapshot, a browser bridge) builds a
//! [`Node`] tree and hands it to [`TurndownService`](crate::TurndownService). The
//! converter only reads it; each conversion copies it into its own
//! [`Tree`](crate::tree::Tree).

/// Kind of a node, numbered like the DOM `nodeType` property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
    DocumentFragment = 11,
}

impl NodeType {
    /// Whether a node of this type can be the root of a conversion
    pub fn is_container(self) -> bool {
        matches!(
            self,
            NodeType::Element | NodeType::Document | NodeType::DocumentFragment
        )
    }
}

/// One node of a captured DOM subtree.
///
/// Elements carry an upper-case `node_name` (`"DIV"`), text and comment nodes
/// carry `"#text"` / `"#comment"` and their content in `node_value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub node_type: NodeType,
    pub node_name: String,
    pub node_value: Option<String>,
    /// Attributes in document order; names are unique ignoring ASCII case
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Node {
    fn bare(node_type: NodeType, node_name: String, node_value: Option<String>) -> Self {
        Self {
            node_type,
            node_name,
            node_value,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Element named `tag_name`, in any case
    pub fn element(tag_name: &str) -> Self {
        Self::bare(NodeType::Element, tag_name.to_uppercase(), None)
    }

    /// Element with attributes set in order; a repeated name overwrites the
    /// earlier value
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        attrs
            .into_iter()
            .fold(Self::element(tag_name), |mut node, (name, value)| {
                node.set_attr(name, value);
                node
            })
    }

    pub fn text(content: &str) -> Self {
        Self::bare(NodeType::Text, "#text".into(), Some(content.into()))
    }

    pub fn comment(content: &str) -> Self {
        Self::bare(NodeType::Comment, "#comment".into(), Some(content.into()))
    }

    pub fn document_fragment() -> Self {
        Self::bare(NodeType::DocumentFragment, "#document-fragment".into(), None)
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Lower-case tag name of an element
    pub fn tag_name(&self) -> String {
        self.node_name.to_lowercase()
    }

    /// Attribute value, looked up ignoring ASCII case
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, overwriting an existing one in place
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let existing = self
            .attributes
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name));
        match existing {
            Some((_, slot)) => *slot = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|n| n.is_element())
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Builder form of [`add_child`](Self::add_child)
    pub fn with_child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    /// Builder shorthand for appending a text child
    pub fn with_text(self, content: &str) -> Self {
        self.with_child(Node::text(content))
    }

    /// Concatenated text of the subtree, comments excluded
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node.node_type {
                NodeType::Text => out.push_str(node.node_value.as_deref().unwrap_or("")),
                NodeType::Comment => {}
                _ => stack.extend(node.children.iter().rev()),
            }
        }
        out
    }

    /// Number of nodes in this subtree, including itself
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

// Dropping a deeply nested tree recursively would overflow the stack.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
