//! HTML parsing support.
//!
//! This module parses HTML strings with scraper and converts the result to the
//! [`Node`] structure accepted by the converter.

use scraper::{Html, Node as ScraperNode};

use crate::node::Node;

/// Parse an HTML string into a document fragment.
///
/// Elements, text and comments are kept; doctypes and processing instructions are
/// dropped.
///
/// # Example
///
/// ```rust
/// use clipdown::{parse_html, TurndownService};
///
/// let node = parse_html("<h1>Hello <em>World</em></h1>");
///
/// let service = TurndownService::new();
/// let markdown = service.turndown(&node).unwrap();
/// assert_eq!(markdown, "Hello _World_\n=============");
/// ```
pub fn parse_html(html: &str) -> Node {
    // Steps of a depth-first walk; Close finishes the innermost open element
    enum Step<T> {
        Open(T),
        Close,
    }

    let document = Html::parse_fragment(html);
    let root = document.root_element();

    let mut open = vec![Node::document_fragment()];
    let mut work: Vec<Step<_>> = root.children().rev().map(Step::Open).collect();

    while let Some(step) = work.pop() {
        let child = match step {
            Step::Open(child) => child,
            Step::Close => {
                if open.len() > 1 {
                    if let Some(done) = open.pop() {
                        if let Some(parent) = open.last_mut() {
                            parent.add_child(done);
                        }
                    }
                }
                continue;
            }
        };

        match child.value() {
            ScraperNode::Text(text) => {
                if let Some(parent) = open.last_mut() {
                    parent.add_child(Node::text(&text.text));
                }
            }
            ScraperNode::Comment(comment) => {
                if let Some(parent) = open.last_mut() {
                    parent.add_child(Node::comment(&comment.comment));
                }
            }
            ScraperNode::Element(element) => {
                open.push(Node::element_with_attrs(element.name(), element.attrs().collect()));
                work.push(Step::Close);
                work.extend(child.children().rev().map(Step::Open));
            }
            _ => {}
        }
    }

    open.into_iter().next().unwrap_or_else(Node::document_fragment)
}
