//! Capture documents: converted Markdown with a header naming where it came from.

use url::Url;

use crate::utilities::escape_markdown;

/// The page an element was captured from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageInfo {
    pub title: String,
    pub url: String,
    /// Capture time, already formatted for display
    pub captured_at: String,
}

/// A finished capture document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    document: String,
    host: String,
}

impl Capture {
    /// Put the header for `page` in front of `markdown`
    pub fn new(page: &PageInfo, markdown: &str) -> Self {
        let document = format!(
            "# Element from: {}\n**URL:** {}\n**Date:** {}\n\n---\n\n{}",
            escape_markdown(&page.title),
            page.url,
            page.captured_at,
            markdown
        );

        let host = Url::parse(&page.url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| "page".to_string());

        Self { document, host }
    }

    /// The full document, header included
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn into_document(self) -> String {
        self.document
    }

    /// `<host>-<id>.md`, where the id is derived from the document content
    pub fn suggested_filename(&self) -> String {
        let digest = sha1_smol::Sha1::from(&self.document).digest().to_string();
        format!("{}-{}.md", self.host, &digest[..12])
    }
}
