//! Table rules.
//!
//! Tables become pipe tables. The first row of a table is always the header row,
//! whether its cells are `th` or `td`, and is followed by the separator row.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Filter, Rule};
use crate::tree::NodeRef;

/// A cell must stay on one line, so line breaks fold into the surrounding spaces
static CELL_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\r\n]+").expect("cell pattern is valid"));

/// Create the table rules
pub fn table_rules() -> Vec<Rule> {
    vec![table_rule(), caption_rule(), section_rule(), row_rule(), cell_rule()]
}

fn table_rule() -> Rule {
    Rule::for_tag("table", |_, content, _| {
        format!("\n\n{}\n\n", content.trim_matches('\n'))
    })
}

fn caption_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| tag == "caption" && node.parent_tag() == Some("table")),
        |_, content, _| format!("\n\n{}\n\n", content.trim()),
    )
}

fn section_rule() -> Rule {
    Rule::for_tags(&["thead", "tbody", "tfoot"], |_, content, _| content.to_string())
}

fn row_rule() -> Rule {
    Rule::for_tag("tr", |node, content, _| {
        let row = content.trim_matches('\n');
        let cells = node
            .element_children()
            .filter(|c| matches!(c.tag_name(), "th" | "td"))
            .count();

        if cells > 0 && is_first_row(node) {
            let separator = vec!["---"; cells].join(" | ");
            format!("\n{}\n| {} |\n", row, separator)
        } else {
            format!("\n{}\n", row)
        }
    })
}

fn cell_rule() -> Rule {
    Rule::for_tags(&["th", "td"], |node, content, _| {
        let text = CELL_WHITESPACE.replace_all(content, " ").replace('|', "\\|");
        let text = text.trim();
        if node.element_index() == 0 {
            format!("| {} |", text)
        } else {
            format!(" {} |", text)
        }
    })
}

/// Whether `row` is the first row of its table, looking through row groups but not
/// into nested tables
fn is_first_row(row: &NodeRef<'_>) -> bool {
    let mut table = row.parent();
    while let Some(candidate) = table {
        if candidate.tag_name() == "table" {
            break;
        }
        table = candidate.parent();
    }
    let Some(table) = table else {
        return row.element_index() == 0;
    };

    let first = table.element_children().find_map(|child| match child.tag_name() {
        "tr" => Some(child),
        "thead" | "tbody" | "tfoot" => child.element_children().find(|c| c.tag_name() == "tr"),
        _ => None,
    });
    first.map(|first| first.id() == row.id()).unwrap_or(false)
}
