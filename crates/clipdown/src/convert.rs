//! The conversion walk.
//!
//! Nodes are converted children first, but without recursion: a work stack holds
//! nodes still to visit and elements waiting for their children, and an output stack
//! holds one buffer per open element. When an element finishes, its buffer becomes the
//! `content` handed to its rule and the replacement is joined onto the parent's buffer.

use crate::node::NodeType;
use crate::options::TurndownOptions;
use crate::rules::{ConversionState, Rules};
use crate::tree::{NodeId, NodeRef, Tree};
use crate::utilities::escape_markdown;

enum Work {
    Visit(NodeId),
    Finish(NodeId),
}

/// Convert the children of the tree's root to Markdown, before post-processing
pub(crate) fn process(
    tree: &Tree,
    rules: &Rules,
    options: &TurndownOptions,
    state: &mut ConversionState,
) -> String {
    let mut buffers = vec![String::new()];
    let mut work: Vec<Work> = tree
        .root()
        .children()
        .rev()
        .map(|c| Work::Visit(c.id()))
        .collect();

    while let Some(step) = work.pop() {
        match step {
            Work::Visit(id) => {
                let node = tree.get(id);
                match node.node_type() {
                    NodeType::Text => {
                        let text = if node.is_code() {
                            node.value().to_string()
                        } else {
                            escape_markdown(node.value())
                        };
                        if let Some(buffer) = buffers.last_mut() {
                            join_onto(buffer, &text);
                        }
                    }
                    NodeType::Element => {
                        buffers.push(String::new());
                        work.push(Work::Finish(id));
                        work.extend(node.children().rev().map(|c| Work::Visit(c.id())));
                    }
                    _ => {}
                }
            }
            Work::Finish(id) => {
                let content = buffers.pop().unwrap_or_default();
                let replacement =
                    replacement_for_node(tree.get(id), &content, rules, options, state);
                if let Some(buffer) = buffers.last_mut() {
                    join_onto(buffer, &replacement);
                }
            }
        }
    }

    buffers.pop().unwrap_or_default()
}

fn replacement_for_node(
    node: NodeRef<'_>,
    content: &str,
    rules: &Rules,
    options: &TurndownOptions,
    state: &mut ConversionState,
) -> String {
    let (slot, rule) = rules.resolve(&node, options);
    let whitespace = node.flanking_whitespace(options.preformatted_code);
    let content = if whitespace.is_empty() {
        content
    } else {
        content.trim()
    };

    let replacement = rule.replace(&node, content, options, state.get_mut(slot));
    format!("{}{}{}", whitespace.leading, replacement, whitespace.trailing)
}

/// Join two pieces of output. The newlines at the seam are replaced by as many as
/// the larger side had, but never more than two.
pub fn join(output: &str, replacement: &str) -> String {
    let mut joined = output.to_string();
    join_onto(&mut joined, replacement);
    joined
}

fn join_onto(output: &mut String, replacement: &str) {
    let kept = output.trim_end_matches('\n').len();
    let trailing = output.len() - kept;
    let body = replacement.trim_start_matches('\n');
    let leading = replacement.len() - body.len();

    output.truncate(kept);
    output.push_str(&"\n".repeat(trailing.max(leading).min(2)));
    output.push_str(body);
}
