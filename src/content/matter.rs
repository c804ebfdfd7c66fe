//! Front-matter extraction.
//!
//! Content and template files may open with a `---`-fenced YAML block;
//! everything after the closing fence is the body. A file without an
//! opening fence has no front matter, which is not an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata block at the top of a content or template file.
///
/// Serialization skips unset keys so overlaying front matter onto
/// template data never shadows inherited config values with nulls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// ISO `YYYY-MM-DD`; beats any filename-derived date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// URL path segment; beats `permalink` and any filename-derived slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Alias for `slug`, honored when `slug` is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,

    /// Layout name overriding the caller's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    /// Explicit excerpt; beats the first-paragraph fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Anything else, passed to templates unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Parse a raw file into front matter and body.
pub fn parse(raw: &str) -> Result<(FrontMatter, &str)> {
    match split(raw) {
        None => Ok((FrontMatter::default(), raw)),
        Some((yaml, body)) => {
            let matter = if yaml.trim().is_empty() {
                FrontMatter::default()
            } else {
                serde_yaml::from_str(yaml).context("invalid front matter")?
            };
            Ok((matter, body))
        }
    }
}

/// Split a raw file at its front-matter fences.
///
/// Returns `(yaml, body)` when the file opens with a `---` line and a
/// closing `---` line exists; `None` otherwise.
fn split(raw: &str) -> Option<(&str, &str)> {
    let after_open = raw.strip_prefix("---")?;
    let after_open = after_open
        .strip_prefix("\r\n")
        .or_else(|| after_open.strip_prefix('\n'))?;

    let mut search_from = 0;
    loop {
        let idx = after_open[search_from..].find("---")? + search_from;
        let at_line_start = idx == 0 || after_open.as_bytes()[idx - 1] == b'\n';

        let line_end = after_open[idx..]
            .find('\n')
            .map(|i| idx + i + 1)
            .unwrap_or(after_open.len());

        if at_line_start && after_open[idx..line_end].trim_end() == "---" {
            return Some((&after_open[..idx], &after_open[line_end..]));
        }
        search_from = idx + 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_front_matter() {
        let raw = "---\ntitle: Hello\ndate: 2019-08-10\n---\n# Body\n";
        let (matter, body) = parse(raw).unwrap();

        assert_eq!(matter.title.as_deref(), Some("Hello"));
        assert_eq!(matter.date.as_deref(), Some("2019-08-10"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_parse_without_front_matter() {
        let raw = "# Just markdown\n";
        let (matter, body) = parse(raw).unwrap();

        assert!(matter.title.is_none());
        assert_eq!(body, raw);
    }

    #[test]
    fn test_parse_empty_front_matter_block() {
        let (matter, body) = parse("---\n---\nbody").unwrap();
        assert!(matter.title.is_none());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_parse_crlf_fences() {
        let raw = "---\r\ntitle: Windows\r\n---\r\nbody";
        let (matter, body) = parse(raw).unwrap();
        assert_eq!(matter.title.as_deref(), Some("Windows"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_unclosed_fence_is_all_body() {
        let raw = "---\ntitle: Oops\nno closing fence";
        let (matter, body) = parse(raw).unwrap();
        assert!(matter.title.is_none());
        assert_eq!(body, raw);
    }

    #[test]
    fn test_dashes_inside_yaml_not_a_fence() {
        let raw = "---\ntitle: a --- b\n---\nbody";
        let (matter, body) = parse(raw).unwrap();
        assert_eq!(matter.title.as_deref(), Some("a --- b"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_thematic_break_in_body_untouched() {
        let raw = "---\ntitle: T\n---\nabove\n\n---\n\nbelow";
        let (_, body) = parse(raw).unwrap();
        assert!(body.contains("above"));
        assert!(body.contains("below"));
        assert!(body.contains("---"));
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(parse("---\ntitle: [broken\n---\nbody").is_err());
    }

    #[test]
    fn test_permalink_and_extra_keys() {
        let raw = "---\npermalink: about-me\ntags: [a, b]\n---\n";
        let (matter, _) = parse(raw).unwrap();

        assert_eq!(matter.permalink.as_deref(), Some("about-me"));
        assert!(matter.extra.get("tags").is_some_and(|v| v.is_sequence()));
    }
}
