//! Markdown to HTML conversion with pluggable code highlighting.
//!
//! The converter is a pure function over the body text; fenced code
//! blocks are routed through a highlight callback so callers can plug in
//! a real highlighter without this module knowing about it. The default
//! callback escapes the code and tags it with `language-…` for
//! client-side highlighters.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use pulldown_cmark_escape::escape_html;

/// Code highlight callback: `(code, language) -> HTML`.
pub type Highlight = Box<dyn Fn(&str, Option<&str>) -> String + Send + Sync>;

/// Markdown body renderer.
pub struct MarkdownRenderer {
    highlight: Highlight,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            highlight: Box::new(default_highlight),
        }
    }

    /// Use a custom code-highlight callback.
    pub fn with_highlighter(highlight: Highlight) -> Self {
        Self { highlight }
    }

    /// Convert markdown text to HTML.
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES;
        let parser = Parser::new_ext(markdown, options);

        // Collect events, routing fenced/indented code through the
        // highlight callback as raw HTML.
        let mut events = Vec::new();
        let mut code: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match &kind {
                        CodeBlockKind::Fenced(info) if !info.is_empty() => info
                            .split_whitespace()
                            .next()
                            .map(sanitize_language),
                        _ => None,
                    };
                    code = Some((lang, String::new()));
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, buffer)) = code.as_mut() {
                        buffer.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, buffer)) = code.take() {
                        let highlighted = (self.highlight)(&buffer, lang.as_deref());
                        events.push(Event::Html(highlighted.into()));
                    }
                }
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape-only fallback highlighter.
fn default_highlight(code: &str, lang: Option<&str>) -> String {
    let mut escaped = String::with_capacity(code.len());
    escape_html(&mut escaped, code).ok();

    match lang {
        Some(lang) => format!("<pre><code class=\"language-{lang}\">{escaped}</code></pre>\n"),
        None => format!("<pre><code>{escaped}</code></pre>\n"),
    }
}

/// Keep only characters safe inside a class attribute.
fn sanitize_language(info: &str) -> String {
    info.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markdown() {
        let html = MarkdownRenderer::new().render("# Title\n\nA *styled* paragraph.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>styled</em>"));
    }

    #[test]
    fn test_image_markup() {
        let html = MarkdownRenderer::new().render("![Smile](smile.png)");
        assert!(html.contains(r#"src="smile.png""#));
        assert!(html.contains(r#"alt="Smile""#));
    }

    #[test]
    fn test_fenced_code_gets_language_class() {
        let html = MarkdownRenderer::new().render("```rust\nlet x = 1;\n```\n");
        assert!(html.contains(r#"class="language-rust""#), "{html}");
        assert!(html.contains("let x = 1;"));
    }

    #[test]
    fn test_code_is_escaped_by_default() {
        let html = MarkdownRenderer::new().render("```\n<script>alert(1)</script>\n```\n");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_custom_highlighter_is_used() {
        let renderer = MarkdownRenderer::with_highlighter(Box::new(|code, lang| {
            format!(
                "<div class=\"hl {}\">{}</div>",
                lang.unwrap_or("plain"),
                code.trim()
            )
        }));

        let html = renderer.render("```toml\nkey = 1\n```\n");
        assert!(html.contains(r#"<div class="hl toml">key = 1</div>"#));
    }

    #[test]
    fn test_language_is_sanitized() {
        let html = MarkdownRenderer::new().render("```c++ \"onload=x\nint a;\n```\n");
        assert!(html.contains(r#"class="language-c++""#), "{html}");
    }

    #[test]
    fn test_tables_enabled() {
        let html = MarkdownRenderer::new().render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }
}
