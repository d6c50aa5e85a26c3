//! Rule system for tree to Markdown conversion.
//!
//! For every element the first match wins, in this order: the blank rule, added
//! rules (most recently added first), the built-in rules, keep filters, remove
//! filters and finally the default rule.

mod commonmark;
mod rule;
mod table;

pub use commonmark::commonmark_rules;
pub use rule::{Accumulator, AppendFn, Filter, PredicateFn, ReplacementFn, Rule};
pub use table::table_rules;

use indexmap::IndexMap;

use crate::options::TurndownOptions;
use crate::tree::NodeRef;

/// Where a resolved rule lives, and with it which accumulator it writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RuleSlot {
    Added(usize),
    Builtin(usize),
    /// Blank, keep, remove and default rules, which never accumulate
    Fallback,
}

/// Mutable state of one conversion: an accumulator per rule
#[derive(Debug, Default)]
pub(crate) struct ConversionState {
    added: Vec<Accumulator>,
    builtin: Vec<Accumulator>,
    fallback: Accumulator,
}

impl ConversionState {
    pub(crate) fn get_mut(&mut self, slot: RuleSlot) -> &mut Accumulator {
        let found = match slot {
            RuleSlot::Added(i) => self.added.get_mut(i),
            RuleSlot::Builtin(i) => self.builtin.get_mut(i),
            RuleSlot::Fallback => None,
        };
        found.unwrap_or(&mut self.fallback)
    }
}

/// Collection of rules for conversion
pub struct Rules {
    /// Rules added by the user, in insertion order
    added: IndexMap<String, Rule>,
    /// Built-in CommonMark and table rules
    builtin: Vec<Rule>,
    /// Keep rules (preserve as HTML)
    keep_filters: Vec<Filter>,
    /// Remove rules (remove entirely)
    remove_filters: Vec<Filter>,
    blank_rule: Rule,
    keep_rule: Rule,
    remove_rule: Rule,
    default_rule: Rule,
}

impl Rules {
    /// Create a new Rules instance with the built-in rules
    pub fn new() -> Self {
        let mut builtin = commonmark_rules();
        builtin.extend(table_rules());

        Self {
            added: IndexMap::new(),
            builtin,
            keep_filters: Vec::new(),
            remove_filters: Vec::new(),
            blank_rule: Rule::new(Filter::predicate(|_, node, _| node.is_blank()), |node, _, _| {
                if node.is_block() {
                    "\n\n".to_string()
                } else {
                    String::new()
                }
            }),
            keep_rule: Rule::new(Filter::predicate(|_, _, _| true), |node, _, _| {
                let html = node.outer_html();
                if node.is_block() {
                    format!("\n\n{}\n\n", html)
                } else {
                    html
                }
            }),
            remove_rule: Rule::new(Filter::predicate(|_, _, _| true), |_, _, _| String::new()),
            default_rule: Rule::new(Filter::predicate(|_, _, _| true), |node, content, _| {
                if node.is_block() {
                    format!("\n\n{}\n\n", content)
                } else {
                    content.to_string()
                }
            }),
        }
    }

    /// Add a rule under `key`. Re-using a key replaces the earlier rule and makes
    /// the new one the most recently added.
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.added.shift_remove(key);
        self.added.insert(key.to_string(), rule);
    }

    /// Add a keep filter
    pub fn keep(&mut self, filter: Filter) {
        self.keep_filters.push(filter);
    }

    /// Add a remove filter
    pub fn remove(&mut self, filter: Filter) {
        self.remove_filters.push(filter);
    }

    /// Find the rule for an element
    pub fn for_node(&self, node: &NodeRef<'_>, options: &TurndownOptions) -> &Rule {
        self.resolve(node, options).1
    }

    pub(crate) fn resolve(&self, node: &NodeRef<'_>, options: &TurndownOptions) -> (RuleSlot, &Rule) {
        if node.is_blank() {
            return (RuleSlot::Fallback, &self.blank_rule);
        }

        let added = self
            .added
            .values()
            .enumerate()
            .rev()
            .find(|(_, rule)| rule.filter.matches(node, options));
        if let Some((i, rule)) = added {
            return (RuleSlot::Added(i), rule);
        }

        let builtin = self
            .builtin
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.filter.matches(node, options));
        if let Some((i, rule)) = builtin {
            return (RuleSlot::Builtin(i), rule);
        }

        if self.keep_filters.iter().any(|f| f.matches(node, options)) {
            log::trace!("keeping <{}> as HTML", node.tag_name());
            return (RuleSlot::Fallback, &self.keep_rule);
        }
        if self.remove_filters.iter().any(|f| f.matches(node, options)) {
            log::trace!("removing <{}>", node.tag_name());
            return (RuleSlot::Fallback, &self.remove_rule);
        }

        (RuleSlot::Fallback, &self.default_rule)
    }

    /// Fresh, empty accumulators for one conversion
    pub(crate) fn new_state(&self) -> ConversionState {
        ConversionState {
            added: vec![Accumulator::default(); self.added.len()],
            builtin: vec![Accumulator::default(); self.builtin.len()],
            fallback: Accumulator::default(),
        }
    }

    /// Rules with an append hook: added rules (most recent first), then built-ins
    pub(crate) fn appending(&self) -> impl Iterator<Item = (RuleSlot, &Rule)> + '_ {
        let added = self
            .added
            .values()
            .enumerate()
            .rev()
            .map(|(i, rule)| (RuleSlot::Added(i), rule));
        let builtin = self
            .builtin
            .iter()
            .enumerate()
            .map(|(i, rule)| (RuleSlot::Builtin(i), rule));
        added.chain(builtin).filter(|(_, rule)| rule.has_append())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}
