//! Rule and Filter types for tree conversion.

use crate::options::TurndownOptions;
use crate::tree::NodeRef;
use crate::{Result, TurndownError};

/// Type alias for replacement functions
pub type ReplacementFn = Box<
    dyn Fn(&NodeRef<'_>, &str, &TurndownOptions, &mut Accumulator) -> String + Send + Sync,
>;

/// Type alias for append hooks, run once after the whole tree has been converted
pub type AppendFn = Box<dyn Fn(&mut Accumulator, &TurndownOptions) -> String + Send + Sync>;

/// Type alias for filter predicates
pub type PredicateFn = Box<dyn Fn(&str, &NodeRef<'_>, &TurndownOptions) -> bool + Send + Sync>;

/// A filter determines which elements a rule applies to
pub enum Filter {
    /// Match a single tag name
    TagName(String),
    /// Match any of multiple tag names
    TagNames(Vec<String>),
    /// Match using a predicate function, called with the lowercase tag name
    Predicate(PredicateFn),
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Create a filter with a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &NodeRef<'_>, &TurndownOptions) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// Check if this filter matches an element
    pub fn matches(&self, node: &NodeRef<'_>, options: &TurndownOptions) -> bool {
        let tag = node.tag_name();
        match self {
            Filter::TagName(t) => tag == t,
            Filter::TagNames(tags) => tags.iter().any(|t| t == tag),
            Filter::Predicate(f) => f(tag, node, options),
        }
    }

    /// A filter that can never match is a caller mistake
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Filter::TagName(t) if t.trim().is_empty() => {
                Err(TurndownError::RuleFilter("empty tag name".to_string()))
            }
            Filter::TagNames(tags) if tags.is_empty() => {
                Err(TurndownError::RuleFilter("empty tag list".to_string()))
            }
            Filter::TagNames(tags) if tags.iter().any(|t| t.trim().is_empty()) => Err(
                TurndownError::RuleFilter("tag list contains an empty tag name".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

impl From<&str> for Filter {
    fn from(tag: &str) -> Self {
        Filter::tag(tag)
    }
}

impl From<&[&str]> for Filter {
    fn from(tags: &[&str]) -> Self {
        Filter::tags(tags)
    }
}

impl<const N: usize> From<[&str; N]> for Filter {
    fn from(tags: [&str; N]) -> Self {
        Filter::tags(&tags)
    }
}

/// Per-conversion scratch space of a single rule.
///
/// A rule's replacement may push entries while the tree is walked; its append hook
/// drains them at the end. Every conversion starts with empty accumulators, so
/// nothing leaks from one call to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    entries: Vec<String>,
}

impl Accumulator {
    pub fn push(&mut self, entry: String) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Take every entry, leaving the accumulator empty
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.entries)
    }
}

/// A rule defines how to convert a matched element to Markdown
pub struct Rule {
    /// Filter to determine which elements this rule applies to
    pub filter: Filter,
    replacement: ReplacementFn,
    append: Option<AppendFn>,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&NodeRef<'_>, &str, &TurndownOptions) -> String + Send + Sync + 'static,
    {
        Self::with_accumulator(filter, move |node, content, options, _| {
            replacement(node, content, options)
        })
    }

    /// Create a rule whose replacement can record entries for its append hook
    pub fn with_accumulator<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&NodeRef<'_>, &str, &TurndownOptions, &mut Accumulator) -> String
            + Send
            + Sync
            + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
            append: None,
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&NodeRef<'_>, &str, &TurndownOptions) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Create a rule that matches multiple tags
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&NodeRef<'_>, &str, &TurndownOptions) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Attach a hook whose output is joined onto the end of the document
    pub fn with_append<F>(mut self, append: F) -> Self
    where
        F: Fn(&mut Accumulator, &TurndownOptions) -> String + Send + Sync + 'static,
    {
        self.append = Some(Box::new(append));
        self
    }

    /// Apply this rule's replacement
    pub fn replace(
        &self,
        node: &NodeRef<'_>,
        content: &str,
        options: &TurndownOptions,
        accumulator: &mut Accumulator,
    ) -> String {
        (self.replacement)(node, content, options, accumulator)
    }

    pub fn has_append(&self) -> bool {
        self.append.is_some()
    }

    /// Run the append hook, if any
    pub fn append(&self, accumulator: &mut Accumulator, options: &TurndownOptions) -> String {
        match &self.append {
            Some(append) => append(accumulator, options),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::tree::Tree;

    fn tree_of(node: Node) -> Tree {
        let mut tree = Tree::from_node(&node);
        tree.compute_flags();
        tree
    }

    #[test]
    fn test_filter_matches() {
        let tree = tree_of(Node::element("EM").with_text("x"));
        let em = tree.root().first_child().unwrap();
        let options = TurndownOptions::default();

        assert!(Filter::tag("em").matches(&em, &options));
        assert!(Filter::tag("EM").matches(&em, &options));
        assert!(Filter::tags(&["i", "em"]).matches(&em, &options));
        assert!(!Filter::tag("strong").matches(&em, &options));
        assert!(Filter::predicate(|tag, node, _| tag == "em" && node.text_content() == "x")
            .matches(&em, &options));
    }

    #[test]
    fn test_filter_validation() {
        assert!(Filter::tag("").validate().is_err());
        assert!(Filter::tags(&[]).validate().is_err());
        assert!(Filter::tags(&["a", " "]).validate().is_err());
        assert!(Filter::from(["del", "s"]).validate().is_ok());
    }

    #[test]
    fn test_accumulating_rule() {
        let tree = tree_of(Node::element("a").with_text("x"));
        let a = tree.root().first_child().unwrap();
        let options = TurndownOptions::default();
        let rule = Rule::with_accumulator(Filter::tag("a"), |_, content, _, acc| {
            acc.push(content.to_uppercase());
            format!("[{}]", acc.len())
        })
        .with_append(|acc, _| acc.drain().join(","));

        let mut acc = Accumulator::default();
        assert_eq!(rule.replace(&a, "one", &options, &mut acc), "[1]");
        assert_eq!(rule.replace(&a, "two", &options, &mut acc), "[2]");
        assert!(rule.has_append());
        assert_eq!(rule.append(&mut acc, &options), "ONE,TWO");
        assert!(acc.is_empty());
    }
}
