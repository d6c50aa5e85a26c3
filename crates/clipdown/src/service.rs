//! TurndownService - the main entry point for tree to Markdown conversion.

use crate::capture::{Capture, PageInfo};
use crate::convert::{join, process};
use crate::node::Node;
use crate::options::TurndownOptions;
use crate::rules::{ConversionState, Filter, Rule, Rules};
use crate::tree::Tree;
use crate::whitespace::collapse_whitespace;
use crate::{Result, TurndownError};

/// The main service for converting DOM trees to Markdown.
///
/// A service holds validated options and the rule set. Conversions borrow it
/// immutably and keep their own state, so one service can convert many documents,
/// from several threads at once.
pub struct TurndownService {
    options: TurndownOptions,
    rules: Rules,
}

impl TurndownService {
    /// Create a new TurndownService with default options
    pub fn new() -> Self {
        Self {
            options: TurndownOptions::default(),
            rules: Rules::new(),
        }
    }

    /// Create a TurndownService with custom options
    pub fn with_options(options: TurndownOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            rules: Rules::new(),
        })
    }

    /// Create a TurndownService from JSON options, see [`TurndownOptions::from_json`]
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        Self::with_options(TurndownOptions::from_json(json)?)
    }

    /// Convert a DOM node to Markdown.
    ///
    /// Element roots are rendered by their own rule; document and fragment roots
    /// render their children. Text and comment nodes are rejected.
    pub fn turndown(&self, node: &Node) -> Result<String> {
        if !node.node_type.is_container() {
            return Err(TurndownError::InvalidInput(format!(
                "cannot convert a {:?} node, expected an element, document or fragment",
                node.node_type
            )));
        }

        let mut tree = Tree::from_node(node);
        collapse_whitespace(&mut tree, self.options.preformatted_code);
        tree.compute_flags();
        log::debug!("converting {} nodes to markdown", tree.len());

        let mut state = self.rules.new_state();
        let output = process(&tree, &self.rules, &self.options, &mut state);
        let markdown = self.post_process(output, &mut state);

        log::debug!("produced {} bytes of markdown", markdown.len());
        Ok(markdown)
    }

    /// Parse an HTML string and convert it to Markdown
    #[cfg(feature = "html")]
    pub fn turndown_html(&self, html: &str) -> Result<String> {
        if html.trim().is_empty() {
            return Ok(String::new());
        }
        self.turndown(&crate::html::parse_html(html))
    }

    /// Convert `node` and wrap the result in a capture document for `page`
    pub fn capture(&self, page: &PageInfo, node: &Node) -> Result<Capture> {
        let markdown = self.turndown(node)?;
        Ok(Capture::new(page, &markdown))
    }

    /// Add a rule. Added rules take precedence over built-in ones, the most recently
    /// added first.
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> Result<&mut Self> {
        rule.filter.validate()?;
        self.rules.add(key, rule);
        Ok(self)
    }

    /// Keep elements matching the filter as HTML
    pub fn keep(&mut self, filter: impl Into<Filter>) -> Result<&mut Self> {
        let filter = filter.into();
        filter.validate()?;
        self.rules.keep(filter);
        Ok(self)
    }

    /// Remove elements matching the filter
    pub fn remove(&mut self, filter: impl Into<Filter>) -> Result<&mut Self> {
        let filter = filter.into();
        filter.validate()?;
        self.rules.remove(filter);
        Ok(self)
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        crate::utilities::escape_markdown(text)
    }

    /// Get the current options
    pub fn options(&self) -> &TurndownOptions {
        &self.options
    }

    /// Join the append hooks' output onto the document, then trim it
    fn post_process(&self, mut output: String, state: &mut ConversionState) -> String {
        for (slot, rule) in self.rules.appending() {
            let appended = rule.append(state.get_mut(slot), &self.options);
            if !appended.is_empty() {
                output = join(&output, &appended);
            }
        }

        // Leading spaces may be an indented code block, so only line breaks go
        output
            .trim_start_matches(['\t', '\r', '\n'])
            .trim_end()
            .to_string()
    }
}

impl Default for TurndownService {
    fn default() -> Self {
        Self::new()
    }
}
