//! Conversion options.
//!
//! Options are checked once, when a [`TurndownService`](crate::TurndownService) is
//! built, so a bad value never surfaces half-way through a conversion.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Result, TurndownError};

/// Implements `FromStr` and `Display` over the lowercase variant names.
macro_rules! option_names {
    ($ty:ident, $option:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Lowercase name of this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = TurndownError;

            fn from_str(s: &str) -> Result<Self> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(TurndownError::InvalidOption {
                        option: $option,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "lowercase"))]
pub enum HeadingStyle {
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    #[default]
    Setext,
    /// Use ATX-style headings (prefixed with #)
    Atx,
}

option_names!(HeadingStyle, "heading_style", { Setext => "setext", Atx => "atx" });

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "lowercase"))]
pub enum CodeBlockStyle {
    /// Use indented code blocks (4 spaces)
    #[default]
    Indented,
    /// Use fenced code blocks (```)
    Fenced,
}

option_names!(CodeBlockStyle, "code_block_style", { Indented => "indented", Fenced => "fenced" });

/// Link style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "lowercase"))]
pub enum LinkStyle {
    /// Use inline links [text](url)
    #[default]
    Inlined,
    /// Use reference links [text][ref]
    Referenced,
}

option_names!(LinkStyle, "link_style", { Inlined => "inlined", Referenced => "referenced" });

/// Reference style for referenced links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "lowercase"))]
pub enum LinkReferenceStyle {
    /// Full reference: [text][1]
    #[default]
    Full,
    /// Collapsed reference: [text][]
    Collapsed,
    /// Shortcut reference: [text]
    Shortcut,
}

option_names!(LinkReferenceStyle, "link_reference_style", {
    Full => "full",
    Collapsed => "collapsed",
    Shortcut => "shortcut",
});

/// Options for TurndownService
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct TurndownOptions {
    /// Heading style (setext or atx)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks; its first character picks the fence
    /// character and its length the minimum fence size
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Link style
    pub link_style: LinkStyle,

    /// Reference style for referenced links
    pub link_reference_style: LinkReferenceStyle,

    /// Text emitted before the newline of a line break
    pub br: String,

    /// Treat `code` like `pre` when collapsing whitespace
    pub preformatted_code: bool,
}

impl Default for TurndownOptions {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Setext,
            hr: "* * *".to_string(),
            bullet_list_marker: '*',
            code_block_style: CodeBlockStyle::Indented,
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
            link_style: LinkStyle::Inlined,
            link_reference_style: LinkReferenceStyle::Full,
            br: "  ".to_string(),
            preformatted_code: false,
        }
    }
}

impl TurndownOptions {
    /// Reject values the rules cannot render unambiguously
    pub fn validate(&self) -> Result<()> {
        let invalid = |option: &'static str, value: String| {
            Err(TurndownError::InvalidOption { option, value })
        };

        let mut fence_chars = self.fence.chars();
        let fence_ok = match fence_chars.next() {
            Some(c @ ('`' | '~')) => {
                self.fence.chars().count() >= 3 && fence_chars.all(|other| other == c)
            }
            _ => false,
        };
        if !fence_ok {
            return invalid("fence", self.fence.clone());
        }
        if !matches!(self.bullet_list_marker, '*' | '-' | '+') {
            return invalid("bullet_list_marker", self.bullet_list_marker.to_string());
        }
        if !matches!(self.em_delimiter, '_' | '*') {
            return invalid("em_delimiter", self.em_delimiter.to_string());
        }
        if !matches!(self.strong_delimiter.as_str(), "**" | "__") {
            return invalid("strong_delimiter", self.strong_delimiter.clone());
        }
        if self.hr.trim().is_empty() {
            return invalid("hr", self.hr.clone());
        }
        Ok(())
    }

    /// Parse options from JSON and validate them. Missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let options: TurndownOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TurndownOptions::default().validate().is_ok());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("atx".parse::<HeadingStyle>().unwrap(), HeadingStyle::Atx);
        assert_eq!("Fenced".parse::<CodeBlockStyle>().unwrap(), CodeBlockStyle::Fenced);
        assert_eq!(
            "shortcut".parse::<LinkReferenceStyle>().unwrap(),
            LinkReferenceStyle::Shortcut
        );

        let err = "underline".parse::<HeadingStyle>().unwrap_err();
        assert!(matches!(
            err,
            TurndownError::InvalidOption { option: "heading_style", .. }
        ));
    }

    #[test]
    fn test_rejects_bad_fence() {
        for fence in ["", "``", "'''", "``~", "--- "] {
            let options = TurndownOptions {
                fence: fence.to_string(),
                ..Default::default()
            };
            assert!(options.validate().is_err(), "accepted fence {fence:?}");
        }

        let long = TurndownOptions {
            fence: "~~~~".to_string(),
            ..Default::default()
        };
        assert!(long.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_delimiters() {
        let options = TurndownOptions {
            em_delimiter: '~',
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = TurndownOptions {
            strong_delimiter: "*".to_string(),
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = TurndownOptions {
            bullet_list_marker: '#',
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() {
        let options = TurndownOptions::from_json(
            r#"{"heading_style": "atx", "code_block_style": "fenced", "fence": "~~~"}"#,
        )
        .unwrap();
        assert_eq!(options.heading_style, HeadingStyle::Atx);
        assert_eq!(options.code_block_style, CodeBlockStyle::Fenced);
        assert_eq!(options.fence, "~~~");
        assert_eq!(options.em_delimiter, '_');
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_rejects_unknown_style() {
        let err = TurndownOptions::from_json(r#"{"link_style": "footnote"}"#).unwrap_err();
        assert!(matches!(err, TurndownError::Config(_)));

        let err = TurndownOptions::from_json(r#"{"em_delimiter": "+"}"#).unwrap_err();
        assert!(matches!(err, TurndownError::InvalidOption { option: "em_delimiter", .. }));
    }
}
