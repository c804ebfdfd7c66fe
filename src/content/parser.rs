//! Content file parsing.
//!
//! One content file in, one [`ContentSource`] out: front-matter metadata,
//! rendered body HTML and a derived excerpt. The source is consumed
//! within a single directory-processing step and dropped once the page
//! is written, so large sites don't accumulate rendered bodies.

use super::matter::{self, FrontMatter};
use crate::render::markdown::MarkdownRenderer;
use crate::utils::html;
use anyhow::Result;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Content extension accepted by the parser.
const CONTENT_EXTENSION: &str = "md";

/// Content parsing errors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported content extension: {0}")]
    UnsupportedExtension(PathBuf),
}

/// The parsed result of one content file.
#[derive(Debug)]
pub struct ContentSource {
    pub matter: FrontMatter,
    pub html: String,
    pub excerpt: Option<String>,
}

/// Reads content files and renders their markdown bodies.
pub struct ContentParser<'a> {
    markdown: &'a MarkdownRenderer,
}

impl<'a> ContentParser<'a> {
    pub fn new(markdown: &'a MarkdownRenderer) -> Self {
        Self { markdown }
    }

    /// Parse a single content file.
    ///
    /// Fails for any extension other than `.md`; ambiguous content is a
    /// build-author error, not a condition to tolerate. The excerpt falls
    /// back from front matter to the text of the first rendered
    /// paragraph; a body with no paragraph leaves it empty.
    pub fn parse(&self, path: &Path) -> Result<ContentSource> {
        let extension = path.extension().and_then(|e| e.to_str());
        if extension != Some(CONTENT_EXTENSION) {
            return Err(ParseError::UnsupportedExtension(path.to_path_buf()).into());
        }

        let raw = crate::utils::fs::read_to_string(path)?;
        let (matter, body) = matter::parse(&raw)?;
        let html = self.markdown.render(body);

        let excerpt = matter
            .excerpt
            .clone()
            .or_else(|| html::first_paragraph_text(&html));

        Ok(ContentSource {
            matter,
            html,
            excerpt,
        })
    }
}
