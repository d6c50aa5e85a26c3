//! Whitespace collapsing pre-pass.
//!
//! Whether a space is significant depends on the text before it and on the block
//! around it, so this is a single forward walk over the working tree that carries the
//! previous text node along. Elements are visited twice, once on the way in and once
//! on the way out, which is what lets block boundaries trim the text that precedes
//! them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::NodeType;
use crate::tree::{NodeId, Tree};
use crate::utilities::{is_block, is_void};

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \r\n\t]+").expect("whitespace pattern is valid"));

/// Collapse whitespace in every text node of `tree` outside preformatted content.
///
/// `pre` is always preformatted; `code` is too when `preformatted_code` is set.
/// Text that ends up empty and comment nodes are removed from the tree.
pub fn collapse_whitespace(tree: &mut Tree, preformatted_code: bool) {
    let is_pre = |tree: &Tree, id: NodeId| {
        let node = tree.get(id);
        node.is_element()
            && (node.tag_name() == "pre" || (preformatted_code && node.tag_name() == "code"))
    };

    let root = tree.root().id();
    if tree.root().first_child().is_none() || is_pre(tree, root) {
        return;
    }

    let mut dropped: Vec<NodeId> = Vec::new();
    let mut prev_text: Option<NodeId> = None;
    let mut keep_leading_ws = false;
    let mut prev: Option<NodeId> = None;
    let mut current = next(tree, prev, root, is_pre(tree, root));

    while current != root {
        let node = tree.get(current);
        match node.node_type() {
            NodeType::Text => {
                let mut text = WHITESPACE_RUN.replace_all(node.value(), " ").into_owned();
                let after_space = prev_text
                    .map(|p| tree.get(p).value().ends_with(' '))
                    .unwrap_or(true);
                if after_space && !keep_leading_ws && text.starts_with(' ') {
                    text.remove(0);
                }

                if text.is_empty() {
                    log::trace!("dropping whitespace-only text node");
                    dropped.push(current);
                } else {
                    tree.set_text(current, text);
                    prev_text = Some(current);
                }
            }
            NodeType::Element => {
                let tag = node.tag_name();
                if is_block(tag) || tag == "br" {
                    if let Some(p) = prev_text {
                        trim_trailing_space(tree, p);
                    }
                    prev_text = None;
                    keep_leading_ws = false;
                } else if is_void(tag) || is_pre(tree, current) {
                    prev_text = None;
                    keep_leading_ws = true;
                } else if prev_text.is_some() {
                    keep_leading_ws = false;
                }
            }
            _ => dropped.push(current),
        }

        let following = next(tree, prev, current, is_pre(tree, current));
        prev = Some(current);
        current = following;
    }

    if let Some(p) = prev_text {
        trim_trailing_space(tree, p);
        if tree.get(p).value().is_empty() {
            dropped.push(p);
        }
    }

    // Dropped nodes stay in place during the walk and go in one pass
    tree.prune(&dropped);
}

fn trim_trailing_space(tree: &mut Tree, id: NodeId) {
    let value = tree.get(id).value();
    if let Some(trimmed) = value.strip_suffix(' ') {
        let trimmed = trimmed.to_string();
        tree.set_text(id, trimmed);
    }
}

/// Next node of the walk: descend unless we are leaving `current` (the previous node
/// was its child) or `current` is preformatted.
fn next(tree: &Tree, prev: Option<NodeId>, current: NodeId, current_is_pre: bool) -> NodeId {
    let node = tree.get(current);
    let leaving = prev
        .and_then(|p| tree.get(p).parent())
        .map(|parent| parent.id() == current)
        .unwrap_or(false);

    let target = if leaving || current_is_pre {
        node.next_sibling().or_else(|| node.parent())
    } else {
        node.first_child()
            .or_else(|| node.next_sibling())
            .or_else(|| node.parent())
    };
    target.map(|n| n.id()).unwrap_or(current)
}
