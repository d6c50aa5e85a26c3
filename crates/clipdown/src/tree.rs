//! Working copy of the input tree.
//!
//! The converter needs parent and sibling navigation, per-node flags and a tree it
//! may prune during whitespace normalization. [`Tree`] stores nodes in an arena
//! indexed by [`NodeId`]; parents are plain ids, so the back-reference never owns
//! anything. Every traversal here is iterative so deep input cannot overflow the stack.

use crate::node::{Node, NodeType};
use crate::utilities::{is_block, is_meaningful_when_blank, is_void, EdgeWhitespace};

/// Index of a node in a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    node_type: NodeType,
    /// Lowercase tag name, empty for non-elements
    tag: String,
    /// Text of text and comment nodes
    value: String,
    attributes: Vec<(String, String)>,
    parent: Option<NodeId>,
    /// Position in the parent's child list
    index: usize,
    children: Vec<NodeId>,
}

/// Flags derived once per conversion, see [`Tree::compute_flags`]
#[derive(Debug, Clone, Copy, Default)]
struct NodeFlags {
    is_block: bool,
    is_void: bool,
    is_code: bool,
    is_blank: bool,
    /// Position among the parent's element children
    element_index: usize,
}

/// Whitespace at the edges of a node's text content
#[derive(Debug, Clone, Default)]
struct TextEdges {
    leading: String,
    trailing: String,
    /// The text content is whitespace only; both edges then hold all of it
    blank: bool,
}

impl TextEdges {
    fn of_text(text: &str) -> Self {
        let trimmed = text.trim_start();
        if trimmed.is_empty() {
            return TextEdges {
                leading: text.to_string(),
                trailing: text.to_string(),
                blank: true,
            };
        }
        TextEdges {
            leading: text[..text.len() - trimmed.len()].to_string(),
            trailing: trimmed[trimmed.trim_end().len()..].to_string(),
            blank: false,
        }
    }
}

/// Arena copy of a DOM subtree
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
    flags: Vec<NodeFlags>,
    edges: Vec<TextEdges>,
    root: NodeId,
}

impl Tree {
    /// Copy `node` into a new tree.
    ///
    /// Document and fragment nodes become the root directly. Any other node is placed
    /// under a synthetic fragment root so that it is rendered by its own rule.
    pub fn from_node(node: &Node) -> Self {
        let mut tree = Tree {
            nodes: Vec::with_capacity(node.subtree_len() + 1),
            flags: Vec::new(),
            edges: Vec::new(),
            root: NodeId(0),
        };

        let mut stack: Vec<(&Node, Option<NodeId>)> = Vec::new();
        match node.node_type {
            NodeType::Document | NodeType::DocumentFragment => stack.push((node, None)),
            _ => {
                let root = tree.push(NodeType::DocumentFragment, "", "", Vec::new(), None);
                stack.push((node, Some(root)));
            }
        }

        while let Some((current, parent)) = stack.pop() {
            let tag = if current.is_element() {
                current.tag_name()
            } else {
                String::new()
            };
            let id = tree.push(
                current.node_type,
                &tag,
                current.node_value.as_deref().unwrap_or(""),
                current.attributes.clone(),
                parent,
            );
            stack.extend(current.children.iter().rev().map(|child| (child, Some(id))));
        }

        tree
    }

    fn push(
        &mut self,
        node_type: NodeType,
        tag: &str,
        value: &str,
        attributes: Vec<(String, String)>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let index = match parent {
            Some(p) => {
                let siblings = &mut self.nodes[p.0].children;
                siblings.push(id);
                siblings.len() - 1
            }
            None => 0,
        };
        self.nodes.push(NodeData {
            node_type,
            tag: tag.to_string(),
            value: value.to_string(),
            attributes,
            parent,
            index,
            children: Vec::new(),
        });
        id
    }

    /// The root node
    pub fn root(&self) -> NodeRef<'_> {
        self.get(self.root)
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Number of nodes currently attached to the root
    pub fn len(&self) -> usize {
        self.preorder().len()
    }

    /// Whether the root has no children
    pub fn is_empty(&self) -> bool {
        self.nodes[self.root.0].children.is_empty()
    }

    pub(crate) fn set_text(&mut self, id: NodeId, text: String) {
        self.nodes[id.0].value = text;
    }

    /// Remove `ids` from their parents. Each affected child list is rebuilt and
    /// reindexed once, however many of its children go.
    pub(crate) fn prune(&mut self, ids: &[NodeId]) {
        let mut removed = vec![false; self.nodes.len()];
        let mut parents = Vec::new();
        for &id in ids {
            if let Some(parent) = self.nodes[id.0].parent.take() {
                removed[id.0] = true;
                parents.push(parent);
            }
        }
        parents.sort_unstable_by_key(|p| p.0);
        parents.dedup();

        for parent in parents {
            let mut children = std::mem::take(&mut self.nodes[parent.0].children);
            children.retain(|c| !removed[c.0]);
            for (index, child) in children.iter().enumerate() {
                self.nodes[child.0].index = index;
            }
            self.nodes[parent.0].children = children;
        }
    }

    /// Ids reachable from the root, in document order
    fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev());
        }
        order
    }

    /// Compute and cache the derived flags of every attached node.
    ///
    /// Must run after normalization, since blankness depends on the final text.
    pub fn compute_flags(&mut self) {
        let order = self.preorder();
        let mut flags = vec![NodeFlags::default(); self.nodes.len()];

        for &id in &order {
            let data = &self.nodes[id.0];
            let parent_is_code = data.parent.map(|p| flags[p.0].is_code).unwrap_or(false);
            let element = data.node_type == NodeType::Element;
            flags[id.0].is_block = element && is_block(&data.tag);
            flags[id.0].is_void = element && is_void(&data.tag);
            flags[id.0].is_code = (element && data.tag == "code") || parent_is_code;

            for (position, child) in data
                .children
                .iter()
                .filter(|c| self.nodes[c.0].node_type == NodeType::Element)
                .enumerate()
            {
                flags[child.0].element_index = position;
            }
        }

        // Children before parents: edge whitespace of the text content, and whether
        // a void or meaningful-when-blank element sits somewhere below.
        let mut edges = vec![TextEdges { blank: true, ..Default::default() }; self.nodes.len()];
        let mut has_meaningful = vec![false; self.nodes.len()];
        for &id in order.iter().rev() {
            let data = &self.nodes[id.0];
            match data.node_type {
                NodeType::Text => edges[id.0] = TextEdges::of_text(&data.value),
                NodeType::Comment => {}
                _ => {
                    edges[id.0] = join_edges(&data.children, &self.nodes, &edges);
                    for child in &data.children {
                        let child_data = &self.nodes[child.0];
                        has_meaningful[id.0] |= has_meaningful[child.0]
                            || (child_data.node_type == NodeType::Element
                                && (is_void(&child_data.tag)
                                    || is_meaningful_when_blank(&child_data.tag)));
                    }
                }
            }

            if data.node_type == NodeType::Element {
                flags[id.0].is_blank = !flags[id.0].is_void
                    && !is_meaningful_when_blank(&data.tag)
                    && edges[id.0].blank
                    && !has_meaningful[id.0];
            }
        }

        self.flags = flags;
        self.edges = edges;
    }

    fn flags(&self, id: NodeId) -> NodeFlags {
        self.flags.get(id.0).copied().unwrap_or_default()
    }
}

/// Edges of a container from the edges of its children. Leading whitespace runs on
/// through whitespace-only children until the first child with real text; trailing
/// whitespace mirrors that from the end.
fn join_edges(children: &[NodeId], nodes: &[NodeData], edges: &[TextEdges]) -> TextEdges {
    let texts = || {
        children
            .iter()
            .filter(|c| nodes[c.0].node_type != NodeType::Comment)
            .map(|c| &edges[c.0])
    };

    let mut joined = TextEdges {
        blank: true,
        ..Default::default()
    };
    for child in texts() {
        joined.leading.push_str(&child.leading);
        if !child.blank {
            joined.blank = false;
            break;
        }
    }
    if joined.blank {
        joined.trailing = joined.leading.clone();
        return joined;
    }

    let mut tail = Vec::new();
    for child in texts().rev() {
        tail.push(child.trailing.as_str());
        if !child.blank {
            break;
        }
    }
    joined.trailing = tail.into_iter().rev().collect();
    joined
}

/// Leading and trailing whitespace kept outside an inline replacement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlankingWhitespace {
    pub leading: String,
    pub trailing: String,
}

impl FlankingWhitespace {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// A node together with the tree it lives in.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id.0]
    }

    /// The id of this node
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.data().node_type
    }

    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type() == NodeType::Text
    }

    /// Lowercase tag name, empty for non-element nodes
    pub fn tag_name(&self) -> &'a str {
        &self.data().tag
    }

    /// Text of a text or comment node
    pub fn value(&self) -> &'a str {
        &self.data().value
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.data()
            .attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|id| self.tree.get(id))
    }

    /// Lowercase tag name of the parent, if the parent is an element
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent()
            .filter(|p| p.is_element())
            .map(|p| p.tag_name())
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        self.data().children.iter().map(move |&id| tree.get(id))
    }

    pub fn element_children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children().filter(|n| n.is_element())
    }

    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.data().children.first().map(|&id| self.tree.get(id))
    }

    fn sibling(&self, offset: isize) -> Option<NodeRef<'a>> {
        let parent = self.data().parent?;
        let index = self.data().index.checked_add_signed(offset)?;
        self.tree.nodes[parent.0]
            .children
            .get(index)
            .map(|&id| self.tree.get(id))
    }

    pub fn previous_sibling(&self) -> Option<NodeRef<'a>> {
        self.sibling(-1)
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.sibling(1)
    }

    /// Position among the parent's element children
    pub fn element_index(&self) -> usize {
        self.tree.flags(self.id).element_index
    }

    pub fn is_block(&self) -> bool {
        self.tree.flags(self.id).is_block
    }

    pub fn is_void(&self) -> bool {
        self.tree.flags(self.id).is_void
    }

    /// Whether this node is, or sits inside, a `code` element
    pub fn is_code(&self) -> bool {
        self.tree.flags(self.id).is_code
    }

    pub fn is_blank(&self) -> bool {
        self.tree.flags(self.id).is_blank
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            match node.node_type() {
                NodeType::Text => out.push_str(node.value()),
                NodeType::Comment => {}
                _ => stack.extend(node.children().rev()),
            }
        }
        out
    }

    /// Reconstruct outer HTML (for keep rules)
    pub fn outer_html(&self) -> String {
        enum Step<'a> {
            Open(NodeRef<'a>),
            Close(&'a str),
        }

        let mut out = String::new();
        let mut stack = vec![Step::Open(*self)];
        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Close(tag) => {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                    continue;
                }
                Step::Open(node) => node,
            };

            match node.node_type() {
                NodeType::Text => out.push_str(&escape_html_text(node.value())),
                NodeType::Comment => {
                    out.push_str("<!--");
                    out.push_str(node.value());
                    out.push_str("-->");
                }
                NodeType::Element => {
                    let tag = node.tag_name();
                    out.push('<');
                    out.push_str(tag);
                    for (name, value) in &node.data().attributes {
                        out.push(' ');
                        out.push_str(name);
                        if !value.is_empty() {
                            out.push_str("=\"");
                            out.push_str(&escape_html_attr(value));
                            out.push('"');
                        }
                    }
                    out.push('>');
                    if !is_void(tag) {
                        stack.push(Step::Close(tag));
                        stack.extend(node.children().rev().map(Step::Open));
                    }
                }
                NodeType::Document | NodeType::DocumentFragment => {
                    stack.extend(node.children().rev().map(Step::Open));
                }
            }
        }
        out
    }

    /// Whitespace to keep around this node's replacement.
    ///
    /// Blocks keep none, and neither does code when code is treated as preformatted.
    /// ASCII edge whitespace is dropped unless the neighbouring sibling also has
    /// whitespace on the shared side; non-ASCII edge whitespace is always kept.
    pub fn flanking_whitespace(&self, preformatted_code: bool) -> FlankingWhitespace {
        if self.is_block() || (preformatted_code && self.is_code()) {
            return FlankingWhitespace::default();
        }

        let Some(cached) = self.tree.edges.get(self.id.0) else {
            return FlankingWhitespace::default();
        };
        let edges = EdgeWhitespace::from_edges(&cached.leading, &cached.trailing, cached.blank);
        let mut leading = edges.leading;
        let mut trailing = edges.trailing;

        if !edges.leading_ascii.is_empty() && self.is_flanked_by_whitespace(Side::Left, preformatted_code)
        {
            leading = edges.leading_non_ascii;
        }
        if !edges.trailing_ascii.is_empty()
            && self.is_flanked_by_whitespace(Side::Right, preformatted_code)
        {
            trailing = edges.trailing_non_ascii;
        }

        FlankingWhitespace {
            leading: leading.to_string(),
            trailing: trailing.to_string(),
        }
    }

    fn is_flanked_by_whitespace(&self, side: Side, preformatted_code: bool) -> bool {
        let sibling = match side {
            Side::Left => self.previous_sibling(),
            Side::Right => self.next_sibling(),
        };
        let Some(sibling) = sibling else {
            return false;
        };

        let touches_space = |s: &str| match side {
            Side::Left => s.ends_with(' '),
            Side::Right => s.starts_with(' '),
        };

        match sibling.node_type() {
            NodeType::Text => touches_space(sibling.value()),
            NodeType::Element if preformatted_code && sibling.tag_name() == "code" => false,
            NodeType::Element if !is_block(sibling.tag_name()) => {
                let edges = self.tree.edges.get(sibling.id.0);
                edges
                    .map(|e| match side {
                        Side::Left => e.trailing.ends_with(' '),
                        Side::Right => e.leading.starts_with(' '),
                    })
                    .unwrap_or(false)
            }
            _ => false,
        }
    }
}

/// Escape HTML text content
fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape HTML attribute value
fn escape_html_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
