//! HTML fragment post-processing via streaming event rewrite.
//!
//! Rendered markdown bodies are fragments, not documents, so the reader
//! runs with well-formedness checks disabled and events are passed
//! through untouched unless a handler rewrites them.

use anyhow::Result;
use quick_xml::{
    Reader, Writer,
    events::{BytesStart, Event},
};
use std::borrow::Cow;
use std::io::Cursor;
use std::str;

/// Create a reader tolerant of HTML-ish input (void elements, unmatched
/// end tags inside raw-HTML blocks).
#[inline]
fn create_reader(content: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);
    reader
}

/// Rebuild an element with transformed attribute values.
fn rebuild_elem<F>(elem: &BytesStart<'_>, mut transform: F) -> BytesStart<'static>
where
    F: FnMut(&[u8], Cow<'_, [u8]>) -> Cow<'static, [u8]>,
{
    let tag = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    let attrs: Vec<_> = elem
        .html_attributes()
        .flatten()
        .map(|attr| {
            let key = attr.key.as_ref().to_vec();
            let value = transform(attr.key.as_ref(), attr.value);
            (key, value)
        })
        .collect();

    let mut new_elem = BytesStart::new(tag);
    for (k, v) in attrs {
        new_elem.push_attribute((k.as_slice(), v.as_ref()));
    }
    new_elem
}

// ============================================================================
// Image Path Rewriting
// ============================================================================

/// Rewrite path-relative image references to absolute URLs under the
/// page's output path.
///
/// `![Smile](smile.png)` on a page at `my-second-post/` becomes
/// `<img src="/my-second-post/smile.png">`. Root-relative, anchored and
/// schemed URLs are left alone.
pub fn rewrite_relative_images(fragment: &str, page_path: &str) -> Result<String> {
    let mut reader = create_reader(fragment.as_bytes());
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(fragment.len())));

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) if elem.name().as_ref() == b"img" => {
                writer.write_event(Event::Start(rewrite_img_src(&elem, page_path)))?;
            }
            Ok(Event::Empty(elem)) if elem.name().as_ref() == b"img" => {
                writer.write_event(Event::Empty(rewrite_img_src(&elem, page_path)))?;
            }
            Ok(Event::Eof) => break,
            Ok(event) => writer.write_event(event)?,
            Err(e) => anyhow::bail!(
                "HTML parse error at position {}: {:?}",
                reader.error_position(),
                e
            ),
        }
    }

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

fn rewrite_img_src(elem: &BytesStart<'_>, page_path: &str) -> BytesStart<'static> {
    rebuild_elem(elem, |key, value| {
        if key == b"src" {
            let src = str::from_utf8(value.as_ref()).unwrap_or_default();
            if is_relative_url(src) {
                return format!("/{page_path}{src}").into_bytes().into();
            }
        }
        value.into_owned().into()
    })
}

/// A URL is page-relative when it has no leading slash, no anchor and no
/// scheme.
fn is_relative_url(url: &str) -> bool {
    !(url.is_empty()
        || url.starts_with('/')
        || url.starts_with('#')
        || url.contains("://")
        || url.starts_with("data:")
        || url.starts_with("mailto:"))
}

// ============================================================================
// Excerpt Extraction
// ============================================================================

/// Extract the text content of the first `<p>` element in a fragment.
///
/// Returns `None` when the fragment has no paragraph; markup inside the
/// paragraph contributes only its text.
pub fn first_paragraph_text(fragment: &str) -> Option<String> {
    let mut reader = create_reader(fragment.as_bytes());
    let mut in_paragraph = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) if elem.name().as_ref() == b"p" => in_paragraph = true,
            Ok(Event::End(elem)) if elem.name().as_ref() == b"p" && in_paragraph => {
                let trimmed = text.trim();
                return (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            Ok(Event::Text(t)) if in_paragraph => {
                let decoded = t
                    .decode()
                    .ok()
                    .and_then(|d| quick_xml::escape::unescape(&d).ok().map(Cow::into_owned))
                    .unwrap_or_default();
                text.push_str(&decoded);
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_relative_image() {
        let html = r#"<p><img src="smile.png" alt="Smile" /></p>"#;
        let out = rewrite_relative_images(html, "my-second-post/").unwrap();
        assert!(out.contains(r#"src="/my-second-post/smile.png""#), "{out}");
        assert!(out.contains(r#"alt="Smile""#));
    }

    #[test]
    fn test_root_relative_image_untouched() {
        let html = r#"<p><img src="/media/frown.png" alt="Frown" /></p>"#;
        let out = rewrite_relative_images(html, "my-second-post/").unwrap();
        assert!(out.contains(r#"src="/media/frown.png""#));
    }

    #[test]
    fn test_absolute_and_data_urls_untouched() {
        for src in ["https://cdn.example.com/x.png", "data:image/png;base64,AAAA"] {
            let html = format!(r#"<img src="{src}" />"#);
            let out = rewrite_relative_images(&html, "page/").unwrap();
            assert!(out.contains(src), "{out}");
        }
    }

    #[test]
    fn test_nested_asset_path_rewritten() {
        let html = r#"<img src="assets/diagram.svg" />"#;
        let out = rewrite_relative_images(html, "posts/setup/").unwrap();
        assert!(out.contains(r#"src="/posts/setup/assets/diagram.svg""#));
    }

    #[test]
    fn test_non_image_elements_pass_through() {
        let html = r#"<h2 id="intro">Intro</h2><p>Hello <a href="x.html">link</a></p>"#;
        let out = rewrite_relative_images(html, "page/").unwrap();
        assert!(out.contains(r#"<h2 id="intro">"#));
        assert!(out.contains(r#"href="x.html""#));
    }

    #[test]
    fn test_first_paragraph_text_simple() {
        let html = "<p>First paragraph.</p><p>Second.</p>";
        assert_eq!(
            first_paragraph_text(html),
            Some("First paragraph.".to_string())
        );
    }

    #[test]
    fn test_first_paragraph_skips_markup() {
        let html = r#"<h1>Title</h1><p>Hello <em>there</em> reader</p>"#;
        assert_eq!(
            first_paragraph_text(html),
            Some("Hello there reader".to_string())
        );
    }

    #[test]
    fn test_no_paragraph_yields_none() {
        assert_eq!(first_paragraph_text("<ul><li>item</li></ul>"), None);
        assert_eq!(first_paragraph_text(""), None);
    }

    #[test]
    fn test_empty_paragraph_yields_none() {
        assert_eq!(first_paragraph_text("<p>   </p>"), None);
    }
}
