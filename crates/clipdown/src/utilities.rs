//! Utility functions and constants for HTML processing.

use once_cell::sync::Lazy;
use regex::Regex;

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "center", "dd", "dir", "div", "dl", "dt", "fieldset", "figcaption",
    "figure", "footer", "form", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "html", "isindex", "li", "main", "menu",
    "nav", "noframes", "noscript", "ol", "output", "p", "pre", "section",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements that have meaning even when blank
pub const MEANINGFUL_WHEN_BLANK: &[&str] = &[
    "a", "table", "thead", "tbody", "tfoot", "th", "td", "iframe", "script",
    "audio", "video",
];

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is meaningful when blank
pub fn is_meaningful_when_blank(tag: &str) -> bool {
    MEANINGFUL_WHEN_BLANK.contains(&tag.to_lowercase().as_str())
}

/// Markdown escapes, applied in order. Anchored patterns only fire at the start of
/// the text run; block markers are escaped when a space or the end of the run
/// follows them, since normalization may already have trimmed that space.
static ESCAPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\\", r"\\"),
        (r"\*", r"\*"),
        (r"^-", r"\-"),
        (r"^\+( |$)", r"\+${1}"),
        (r"^(\d+)([.)])( |$)", r"${1}\${2}${3}"),
        (r"^(=+)", r"\${1}"),
        (r"^(#{1,6})( |$)", r"\${1}${2}"),
        (r"`", r"\`"),
        (r"^~~~", r"\~~~"),
        (r"\[", r"\["),
        (r"\]", r"\]"),
        (r"^>", r"\>"),
        (r"_", r"\_"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("escape pattern is valid"),
            replacement,
        )
    })
    .collect()
});

/// Escape Markdown-significant characters in a plain text run
pub fn escape_markdown(text: &str) -> String {
    ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

static ATTRIBUTE_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\n+\s*)+").expect("attribute pattern is valid"));

/// Clean an attribute value: absent becomes empty, runs of blank lines become a
/// single newline
pub fn clean_attribute(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => ATTRIBUTE_NEWLINES.replace_all(v, "\n").into_owned(),
        _ => String::new(),
    }
}

fn is_ascii_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Whitespace at both ends of a string, split into its ASCII and non-ASCII parts.
///
/// The ASCII part of the leading edge is the outermost one, the non-ASCII part follows
/// it; the trailing edge mirrors that. A whitespace-only string is all leading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeWhitespace<'a> {
    pub leading: &'a str,
    pub leading_ascii: &'a str,
    pub leading_non_ascii: &'a str,
    pub trailing: &'a str,
    pub trailing_non_ascii: &'a str,
    pub trailing_ascii: &'a str,
}

impl<'a> EdgeWhitespace<'a> {
    pub fn of(s: &'a str) -> Self {
        let rest = s.trim_start();
        let leading = &s[..s.len() - rest.len()];
        let trailing = &rest[rest.trim_end().len()..];
        Self::from_edges(leading, trailing, rest.is_empty())
    }

    /// Build from already separated edges. For whitespace-only text (`blank`) the
    /// leading edge holds everything and the trailing edge is ignored.
    pub fn from_edges(leading: &'a str, trailing: &'a str, blank: bool) -> Self {
        let trailing = if blank { "" } else { trailing };
        let ascii_end = leading
            .char_indices()
            .find(|(_, c)| !is_ascii_ws(*c))
            .map(|(i, _)| i)
            .unwrap_or(leading.len());
        let ascii_start = trailing.trim_end_matches(is_ascii_ws).len();

        Self {
            leading,
            leading_ascii: &leading[..ascii_end],
            leading_non_ascii: &leading[ascii_end..],
            trailing,
            trailing_non_ascii: &trailing[..ascii_start],
            trailing_ascii: &trailing[ascii_start..],
        }
    }
}

/// Length of the longest run of `c` in `s`
pub fn longest_run(s: &str, c: char) -> usize {
    s.chars()
        .fold((0, 0), |(max, current), ch| {
            if ch == c {
                (max.max(current + 1), current + 1)
            } else {
                (max, 0)
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_inline_markers() {
        assert_eq!(escape_markdown("**bold** and _it_"), "\\*\\*bold\\*\\* and \\_it\\_");
        assert_eq!(escape_markdown("see [1]"), "see \\[1\\]");
        assert_eq!(escape_markdown("`tick`"), "\\`tick\\`");
        assert_eq!(escape_markdown("plain words"), "plain words");
    }

    #[test]
    fn test_escape_backslash_first() {
        assert_eq!(escape_markdown("a\\*b"), "a\\\\\\*b");
    }

    #[test]
    fn test_escape_leading_only() {
        assert_eq!(escape_markdown("- item"), "\\- item");
        assert_eq!(escape_markdown("a - b"), "a - b");
        assert_eq!(escape_markdown("+ item"), "\\+ item");
        assert_eq!(escape_markdown("1. one"), "1\\. one");
        assert_eq!(escape_markdown("2020. year"), "2020\\. year");
        assert_eq!(escape_markdown("== h"), "\\== h");
        assert_eq!(escape_markdown("## h"), "\\## h");
        assert_eq!(escape_markdown("#hashtag"), "#hashtag");
        assert_eq!(escape_markdown("~~~ fence"), "\\~~~ fence");
        assert_eq!(escape_markdown("> quote"), "\\> quote");
        assert_eq!(escape_markdown("a > b"), "a > b");
    }

    #[test]
    fn test_escape_bare_block_markers() {
        assert_eq!(escape_markdown("#"), "\\#");
        assert_eq!(escape_markdown("###"), "\\###");
        assert_eq!(escape_markdown("1."), "1\\.");
        assert_eq!(escape_markdown("7)"), "7\\)");
        assert_eq!(escape_markdown("3) three"), "3\\) three");
        assert_eq!(escape_markdown("+"), "\\+");
        assert_eq!(escape_markdown("+1"), "+1");
        assert_eq!(escape_markdown("1.5"), "1.5");
    }

    #[test]
    fn test_element_classes_ignore_case() {
        for tag in ["p", "LI", "Table", "pre"] {
            assert!(is_block(tag), "{tag} is a block");
        }
        assert!(!is_block("span"));
        assert!(is_void("BR") && is_void("img"));
        assert!(!is_void("p"));
        assert!(is_meaningful_when_blank("TD") && is_meaningful_when_blank("a"));
        assert!(!is_meaningful_when_blank("div"));
    }

    #[test]
    fn test_clean_attribute() {
        assert_eq!(clean_attribute(None), "");
        assert_eq!(clean_attribute(Some("")), "");
        assert_eq!(clean_attribute(Some("a\n\n  \nb")), "a\nb");
        assert_eq!(clean_attribute(Some("plain")), "plain");
    }

    #[test]
    fn test_edge_whitespace() {
        let edges = EdgeWhitespace::of(" \u{a0}text\u{a0} \n");
        assert_eq!(edges.leading, " \u{a0}");
        assert_eq!(edges.leading_ascii, " ");
        assert_eq!(edges.leading_non_ascii, "\u{a0}");
        assert_eq!(edges.trailing, "\u{a0} \n");
        assert_eq!(edges.trailing_non_ascii, "\u{a0}");
        assert_eq!(edges.trailing_ascii, " \n");

        let blank = EdgeWhitespace::of("   ");
        assert_eq!(blank.leading, "   ");
        assert_eq!(blank.trailing, "");
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(longest_run("a``b```c`", '`'), 3);
        assert_eq!(longest_run("none", '`'), 0);
    }
}
