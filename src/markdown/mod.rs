//! Markdown upload validation and H1 header extraction.
//!
//! Uploaded markdown drives timeline generation: each H1 header becomes one
//! draft event. This module owns the intake rules (extension, size, coarse
//! content type) and the structural scan. Both are pure functions of their
//! input; file I/O happens at the caller.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Accepted markdown file extensions, matched case-insensitively against the
/// last dot-segment of the file name.
pub const MARKDOWN_EXTENSIONS: &[&str] = &[".md", ".markdown", ".mdown", ".mkdn", ".mdwn"];

/// Upload size ceiling: 5 MiB.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Declared content types accepted without further inspection. Markdown files
/// frequently arrive with no or generic MIME type, so the check is a backstop
/// against obviously wrong uploads, not a gate.
const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "text/markdown",
    "text/x-markdown",
    "text/plain",
    "application/octet-stream",
    "",
];

/// Why an upload was rejected. Messages are user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Invalid file type. Please upload a markdown file (.md, .markdown, .mdown, .mkdn, .mdwn)")]
    InvalidExtension,
    #[error("File size too large. Maximum size is 5MB.")]
    TooLarge,
    #[error("File must be a text-based markdown file.")]
    BinaryContentType,
}

/// Metadata of a candidate upload, as declared by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMeta {
    pub file_name: String,
    pub file_size: u64,
    pub content_type: Option<String>,
}

/// Result of scanning a markdown document for timeline generation.
///
/// `headers` holds H1 text in order of appearance, duplicates preserved.
/// `preview_html` is a lossy, presentation-only rendering; it never feeds
/// back into header extraction or persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownParseResult {
    pub headers: Vec<String>,
    pub content: String,
    pub preview_html: String,
}

/// Check whether a candidate upload is admissible.
///
/// Pure function of the declared metadata; the file content is never read.
/// Extension and size are hard rules. The content type is advisory: a
/// declared type outside the allow-list is rejected only when it matches a
/// clearly-binary family.
pub fn validate_upload(meta: &UploadMeta) -> Result<(), UploadError> {
    let extension = meta
        .file_name
        .rfind('.')
        .map(|i| meta.file_name[i..].to_lowercase())
        .unwrap_or_default();

    if !MARKDOWN_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UploadError::InvalidExtension);
    }

    if meta.file_size > MAX_FILE_SIZE {
        return Err(UploadError::TooLarge);
    }

    if let Some(content_type) = &meta.content_type {
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str())
            && is_binary_content_type(content_type)
        {
            return Err(UploadError::BinaryContentType);
        }
    }

    Ok(())
}

fn is_binary_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
        || content_type.starts_with("video/")
        || content_type.starts_with("audio/")
        || content_type.contains("pdf")
        || content_type.contains("zip")
        || content_type.contains("binary")
}

fn h1_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Exactly one '#': the multiline anchor plus a required space means a
    // second '#' fails the match rather than being captured.
    RE.get_or_init(|| Regex::new(r"(?m)^#[ \t]+(.+)$").expect("valid regex"))
}

/// Extract ordered H1 headers and a best-effort HTML preview from raw
/// markdown text.
///
/// Empty or whitespace-only input yields an all-empty result, not an error.
/// Finding zero headers is likewise not an error here; the calling workflow
/// decides whether an empty timeline is acceptable.
pub fn extract_headers(content: &str) -> MarkdownParseResult {
    if content.trim().is_empty() {
        return MarkdownParseResult::default();
    }

    let headers = h1_regex()
        .captures_iter(content)
        .map(|c| c[1].trim().to_string())
        .filter(|h| !h.is_empty())
        .collect();

    MarkdownParseResult {
        headers,
        content: content.to_string(),
        preview_html: render_preview(content),
    }
}

/// Deliberately minimal markdown-to-HTML transform for upload previews.
///
/// Heading prefixes are replaced longest-first so `###` is not half-consumed
/// by the `#` rule. Lossy by design: nothing round-trips back to markdown.
fn render_preview(content: &str) -> String {
    static H3: OnceLock<Regex> = OnceLock::new();
    static H2: OnceLock<Regex> = OnceLock::new();
    static H1: OnceLock<Regex> = OnceLock::new();
    static BOLD: OnceLock<Regex> = OnceLock::new();
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    static CODE: OnceLock<Regex> = OnceLock::new();

    let h3 = H3.get_or_init(|| Regex::new(r"(?m)^### (.+)$").expect("valid regex"));
    let h2 = H2.get_or_init(|| Regex::new(r"(?m)^## (.+)$").expect("valid regex"));
    let h1 = H1.get_or_init(|| Regex::new(r"(?m)^# (.+)$").expect("valid regex"));
    let bold = BOLD.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));
    let italic = ITALIC.get_or_init(|| Regex::new(r"\*(.+?)\*").expect("valid regex"));
    let code = CODE.get_or_init(|| Regex::new(r"`(.+?)`").expect("valid regex"));

    let html = h3.replace_all(content, "<h3>$1</h3>");
    let html = h2.replace_all(&html, "<h2>$1</h2>");
    let html = h1.replace_all(&html, "<h1>$1</h1>");
    let html = bold.replace_all(&html, "<strong>$1</strong>");
    let html = italic.replace_all(&html, "<em>$1</em>");
    let html = code.replace_all(&html, "<code>$1</code>");
    let html = html.replace("\n\n", "</p><p>").replace('\n', "<br>");

    format!("<p>{html}</p>")
}
