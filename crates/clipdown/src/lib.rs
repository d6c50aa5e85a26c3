//! # clipdown
//!
//! Convert DOM trees to Markdown.
//!
//! A rule-dispatch converter in the style of [turndown](https://github.com/mixmark-io/turndown):
//! whitespace is normalized the way a browser renders it, every element is handed
//! to the first rule whose filter matches, and the pieces are joined with at most
//! one blank line between blocks.
//!
//! ## Design
//!
//! The converter accepts a plain [`Node`] tree rather than an HTML string, so any
//! DOM source can feed it: a browser bridge, a CDP snapshot or the bundled
//! [`parse_html`] (feature `html`). Each conversion copies the input into an
//! arena and walks it with an explicit stack, so arbitrarily deep trees are fine.
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use clipdown::{Node, TurndownService};
//!
//! let service = TurndownService::new();
//!
//! let paragraph = Node::element("p")
//!     .with_text("Hello ")
//!     .with_child(Node::element("strong").with_text("world"))
//!     .with_text("!");
//!
//! let markdown = service.turndown(&paragraph).unwrap();
//! assert_eq!(markdown, "Hello **world**!");
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use clipdown::TurndownService;
//!
//! let service = TurndownService::new();
//! let markdown = service.turndown_html("<h1>Hello World</h1>").unwrap();
//! assert_eq!(markdown, "Hello World\n===========");
//! ```

pub mod capture;
mod convert;
#[cfg(feature = "html")]
pub mod html;
pub mod node;
pub mod options;
mod rules;
mod service;
pub mod tree;
mod utilities;
mod whitespace;

pub use capture::{Capture, PageInfo};
pub use convert::join;
#[cfg(feature = "html")]
pub use html::parse_html;
pub use node::{Node, NodeType};
pub use options::{CodeBlockStyle, HeadingStyle, LinkReferenceStyle, LinkStyle, TurndownOptions};
pub use rules::{Accumulator, AppendFn, Filter, PredicateFn, ReplacementFn, Rule, Rules};
pub use service::TurndownService;
pub use tree::{NodeRef, Tree};
pub use utilities::{clean_attribute, escape_markdown, is_block, is_void};

/// Error type for turndown operations
#[derive(Debug, thiserror::Error)]
pub enum TurndownError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid rule filter: {0}")]
    RuleFilter(String),

    #[error("Invalid value {value:?} for option `{option}`")]
    InvalidOption { option: &'static str, value: String },

    #[cfg(feature = "serde")]
    #[error("Invalid options: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TurndownError>;
