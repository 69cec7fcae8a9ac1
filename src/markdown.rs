//! # Markdown Rendering Module
//!
//! Turns markdown text into a complete HTML document. The conversion itself is
//! delegated to pulldown-cmark; this module only owns the fixed document shell
//! the converted fragment is placed into.

use crate::error::ViewerError;
use pulldown_cmark::{html, Options, Parser};
use std::panic::{self, AssertUnwindSafe};

/// Converts markdown text to an HTML fragment.
pub trait MarkdownConverter {
    fn convert(&self, markdown: &str) -> Result<String, ViewerError>;
}

/// CommonMark converter with the usual GitHub-style extensions enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct PulldownConverter;

/// Parser options shared by the HTML converter and the in-window view.
pub fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

impl MarkdownConverter for PulldownConverter {
    fn convert(&self, markdown: &str) -> Result<String, ViewerError> {
        // A panic in the parser must not take the window down with it.
        panic::catch_unwind(AssertUnwindSafe(|| {
            let parser = Parser::new_ext(markdown, parser_options());
            let mut fragment = String::with_capacity(markdown.len() * 3 / 2);
            html::push_html(&mut fragment, parser);
            fragment
        }))
        .map_err(|payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "converter panicked".to_string());
            ViewerError::Conversion(reason)
        })
    }
}

/// The fixed HTML document every rendered fragment is wrapped in.
pub struct HtmlShell;

impl HtmlShell {
    const HEAD: &'static str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<meta http-equiv="X-UA-Compatible" content="IE=edge" />
<style>
body {
    font-family: 'Segoe UI', Arial, sans-serif;
    padding: 20px;
    line-height: 1.6;
}
pre {
    background-color: #f5f5f5;
    padding: 10px;
    border-radius: 3px;
    overflow-x: auto;
}
code {
    font-family: 'Consolas', monospace;
}
</style>
</head>
<body>
"#;

    const TAIL: &'static str = "</body>\n</html>\n";

    /// Places `fragment` inside the body, verbatim.
    pub fn wrap(fragment: &str) -> String {
        let mut document = String::with_capacity(Self::HEAD.len() + fragment.len() + Self::TAIL.len());
        document.push_str(Self::HEAD);
        document.push_str(fragment);
        document.push_str(Self::TAIL);
        document
    }
}

/// A converted document, along with the markdown it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub source: String,
    pub html: String,
}

/// Converts `markdown` and wraps the result in the [`HtmlShell`].
///
/// Nothing is sanitized: raw HTML in the source reaches the document as-is.
pub fn render_document(
    converter: &dyn MarkdownConverter,
    markdown: &str,
) -> Result<RenderedDocument, ViewerError> {
    let fragment = converter.convert(markdown)?;
    Ok(RenderedDocument {
        source: markdown.to_string(),
        html: HtmlShell::wrap(&fragment),
    })
}
