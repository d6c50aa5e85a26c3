//! CommonMark rules for tree to Markdown conversion.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Filter, Rule};
use crate::node::NodeType;
use crate::options::{CodeBlockStyle, HeadingStyle, LinkReferenceStyle, LinkStyle};
use crate::tree::NodeRef;
use crate::utilities::{clean_attribute, longest_run};

static LANGUAGE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"language-(\S+)").expect("language pattern is valid"));

/// Create all CommonMark rules, in the order they are tried
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        indented_code_block_rule(),
        fenced_code_block_rule(),
        horizontal_rule(),
        inline_link_rule(),
        reference_link_rule(),
        emphasis_rule(),
        strong_rule(),
        code_rule(),
        image_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| format!("\n\n{}\n\n", content))
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, options| format!("{}\n", options.br))
}

fn heading_rule() -> Rule {
    Rule::for_tags(&["h1", "h2", "h3", "h4", "h5", "h6"], |node, content, options| {
        let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

        match options.heading_style {
            HeadingStyle::Setext if level <= 2 => {
                let underline = if level == 1 { "=" } else { "-" };
                format!(
                    "\n\n{}\n{}\n\n",
                    content,
                    underline.repeat(content.chars().count())
                )
            }
            _ => format!("\n\n{} {}\n\n", "#".repeat(level), content),
        }
    })
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let quoted: Vec<String> = content
            .trim_matches('\n')
            .split('\n')
            .map(|line| format!("> {}", line))
            .collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |node, content, _| {
        // A list closing a list item hangs directly under the item's text
        let ends_item = node.parent_tag() == Some("li") && !has_content_after(node);

        if ends_item {
            format!("\n{}", content)
        } else {
            format!("\n\n{}\n\n", content)
        }
    })
}

/// Whether a later sibling of `node` renders to something
fn has_content_after(node: &NodeRef<'_>) -> bool {
    let mut sibling = node.next_sibling();
    while let Some(current) = sibling {
        let blank = match current.node_type() {
            NodeType::Text => current.value().trim().is_empty(),
            NodeType::Element => current.is_blank(),
            _ => true,
        };
        if !blank {
            return true;
        }
        sibling = current.next_sibling();
    }
    false
}

fn list_item_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            tag == "li" && matches!(node.parent_tag(), Some("ul" | "ol"))
        }),
        |node, content, options| {
            let prefix = match node.parent().filter(|p| p.tag_name() == "ol") {
                Some(list) => {
                    let index = node.element_index() as i64;
                    let number = list
                        .attr("start")
                        .and_then(|start| start.trim().parse::<i64>().ok())
                        .map(|start| start + index)
                        .unwrap_or(index + 1);
                    format!("{}.  ", number)
                }
                None => format!("{}   ", options.bullet_list_marker),
            };

            let content = content.trim_start_matches('\n');
            let body = content.trim_end_matches('\n');
            let indented: Vec<String> = body
                .split('\n')
                .enumerate()
                .map(|(i, line)| {
                    if i == 0 || line.is_empty() {
                        line.to_string()
                    } else {
                        format!("    {}", line)
                    }
                })
                .collect();

            let suffix = if body.len() < content.len() {
                "\n\n"
            } else if node.next_sibling().is_some() {
                "\n"
            } else {
                ""
            };

            format!("{}{}{}", prefix, indented.join("\n"), suffix)
        },
    )
}

/// The `code` element that makes a `pre` a code block
fn code_block_child<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.first_child()
        .filter(|child| child.is_element() && child.tag_name() == "code")
}

fn indented_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            tag == "pre"
                && options.code_block_style == CodeBlockStyle::Indented
                && code_block_child(node).is_some()
        }),
        |node, _, _| {
            let code = code_block_child(node)
                .map(|c| c.text_content())
                .unwrap_or_default();
            format!("\n\n    {}\n\n", code.replace('\n', "\n    "))
        },
    )
}

fn fenced_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            tag == "pre"
                && options.code_block_style == CodeBlockStyle::Fenced
                && code_block_child(node).is_some()
        }),
        |node, _, options| {
            let Some(code_node) = code_block_child(node) else {
                return String::new();
            };
            let code = code_node.text_content();

            let language = code_node
                .attr("class")
                .and_then(|class| LANGUAGE_CLASS.captures(class))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .unwrap_or("");

            // The fence must be longer than any run that could close it: one opening
            // a line of the code after at most three spaces
            let fence_char = options.fence.chars().next().unwrap_or('`');
            let mut fence_size = options.fence.chars().count().max(3);
            for line in code.split('\n') {
                let body = line.trim_start_matches(' ');
                if line.len() - body.len() > 3 {
                    continue;
                }
                let run = body.chars().take_while(|&c| c == fence_char).count();
                if run >= 3 && run >= fence_size {
                    fence_size = run + 1;
                }
            }
            let fence = fence_char.to_string().repeat(fence_size);

            format!(
                "\n\n{}{}\n{}\n{}\n\n",
                fence,
                language,
                code.strip_suffix('\n').unwrap_or(&code),
                fence
            )
        },
    )
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, options| format!("\n\n{}\n\n", options.hr))
}

fn link_title(node: &NodeRef<'_>) -> String {
    let title = clean_attribute(node.attr("title"));
    if title.is_empty() {
        String::new()
    } else {
        format!(" \"{}\"", title.replace('"', "\\\""))
    }
}

fn inline_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            tag == "a"
                && options.link_style == LinkStyle::Inlined
                && node.attr("href").is_some_and(|href| !href.is_empty())
        }),
        |node, content, _| {
            let href = node
                .attr("href")
                .unwrap_or("")
                .replace('(', "\\(")
                .replace(')', "\\)");
            format!("[{}]({}{})", content, href, link_title(node))
        },
    )
}

fn reference_link_rule() -> Rule {
    Rule::with_accumulator(
        Filter::predicate(|tag, node, options| {
            tag == "a"
                && options.link_style == LinkStyle::Referenced
                && node.attr("href").is_some_and(|href| !href.is_empty())
        }),
        |node, content, options, references| {
            let target = format!("{}{}", node.attr("href").unwrap_or(""), link_title(node));

            let (replacement, reference) = match options.link_reference_style {
                LinkReferenceStyle::Collapsed => (
                    format!("[{}][]", content),
                    format!("[{}]: {}", content, target),
                ),
                LinkReferenceStyle::Shortcut => (
                    format!("[{}]", content),
                    format!("[{}]: {}", content, target),
                ),
                LinkReferenceStyle::Full => {
                    let id = references.len() + 1;
                    (
                        format!("[{}][{}]", content, id),
                        format!("[{}]: {}", id, target),
                    )
                }
            };

            references.push(reference);
            replacement
        },
    )
    .with_append(|references, _| {
        if references.is_empty() {
            String::new()
        } else {
            format!("\n\n{}\n\n", references.drain().join("\n"))
        }
    })
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |_, content, options| {
        if content.trim().is_empty() {
            return String::new();
        }
        let delimiter = options.em_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |_, content, options| {
        if content.trim().is_empty() {
            return String::new();
        }
        let delimiter = &options.strong_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

fn code_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            // A lone code inside pre belongs to the code block rules
            let is_code_block = node.parent_tag() == Some("pre")
                && node.previous_sibling().is_none()
                && node.next_sibling().is_none();
            tag == "code" && !is_code_block
        }),
        |_, content, _| {
            if content.is_empty() {
                return String::new();
            }
            let content = content.replace("\r\n", " ").replace(['\r', '\n'], " ");

            let delimiter = "`".repeat(longest_run(&content, '`') + 1);
            let padded = content.starts_with('`')
                || content.ends_with('`')
                || (content.starts_with(' ')
                    && content.ends_with(' ')
                    && content.contains(|c: char| c != ' '));
            let space = if padded { " " } else { "" };

            format!("{}{}{}{}{}", delimiter, space, content, space, delimiter)
        },
    )
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, _| {
        let src = node.attr("src").unwrap_or("");
        if src.is_empty() {
            return String::new();
        }
        let alt = clean_attribute(node.attr("alt"));
        format!("![{}]({}{})", alt, src, link_title(node))
    })
}
