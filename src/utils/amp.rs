//! Best-effort AMP-HTML transformation.
//!
//! Rewrites a rendered page into its AMP variant via a streaming event
//! pass: `<img>` becomes `<amp-img>` with measured dimensions, custom
//! `<script>` elements are dropped (the AMP runtime and JSON-LD survive),
//! and the `amp` marker attribute is ensured on `<html>`.
//!
//! The transform is fallible: a missing or unreadable image makes the
//! whole page's AMP variant fail, and the caller decides whether that
//! aborts anything (it never does; see the content generator).

use anyhow::{Context, Result, bail};
use quick_xml::{
    Reader, Writer,
    events::{BytesEnd, BytesStart, Event},
};
use std::io::Cursor;
use std::path::Path;
use std::str;

/// Transform rendered HTML into its AMP variant.
///
/// `asset_root` is the directory absolute (`/…`) asset URLs resolve
/// against: the output root, since page assets are copied before the
/// page's AMP render runs.
pub fn transform(html: &str, asset_root: &Path) -> Result<String> {
    let mut reader = Reader::from_reader(html.as_bytes());
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);

    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(html.len())));
    let mut in_dropped_script = false;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => bail!(
                "AMP transform parse error at position {}: {:?}",
                reader.error_position(),
                e
            ),
        };

        match event {
            Event::Eof => break,
            // Everything inside a dropped script vanishes with it
            _ if in_dropped_script => {
                if matches!(&event, Event::End(end) if end.name().as_ref() == b"script") {
                    in_dropped_script = false;
                }
            }
            Event::Start(elem) => match elem.name().as_ref() {
                b"script" if !keep_script(&elem) => in_dropped_script = true,
                b"img" => write_amp_img(&mut writer, &elem, asset_root)?,
                b"html" => write_html_with_amp_marker(&mut writer, &elem)?,
                _ => writer.write_event(Event::Start(elem))?,
            },
            Event::End(elem) => match elem.name().as_ref() {
                // The source <img> may carry a stray end tag; amp-img is
                // always written as a complete pair.
                b"img" => {}
                _ => writer.write_event(Event::End(elem))?,
            },
            Event::Empty(elem) => match elem.name().as_ref() {
                b"img" => write_amp_img(&mut writer, &elem, asset_root)?,
                b"script" => {}
                _ => writer.write_event(Event::Empty(elem))?,
            },
            event => writer.write_event(event)?,
        }
    }

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

/// The AMP runtime and structured-data scripts survive the transform.
fn keep_script(elem: &BytesStart<'_>) -> bool {
    elem.html_attributes().flatten().any(|attr| {
        let value = str::from_utf8(attr.value.as_ref()).unwrap_or_default();
        match attr.key.as_ref() {
            b"src" => value.contains("ampproject.org"),
            b"type" => value == "application/ld+json",
            _ => false,
        }
    })
}

/// Rewrite `<img>` as a closed `<amp-img>` pair with guaranteed
/// width/height, measuring the referenced file when the source markup
/// does not carry dimensions.
fn write_amp_img(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    elem: &BytesStart<'_>,
    asset_root: &Path,
) -> Result<()> {
    let mut amp_img = BytesStart::new("amp-img");
    let mut src = String::new();
    let mut has_width = false;
    let mut has_height = false;
    let mut has_layout = false;

    for attr in elem.html_attributes().flatten() {
        match attr.key.as_ref() {
            b"src" => src = str::from_utf8(attr.value.as_ref()).unwrap_or_default().to_owned(),
            b"width" => has_width = true,
            b"height" => has_height = true,
            b"layout" => has_layout = true,
            _ => {}
        }
        amp_img.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
    }

    if !has_width || !has_height {
        let (width, height) = measure_image(&src, asset_root)?;
        if !has_width {
            amp_img.push_attribute(("width", width.to_string().as_str()));
        }
        if !has_height {
            amp_img.push_attribute(("height", height.to_string().as_str()));
        }
    }
    if !has_layout {
        amp_img.push_attribute(("layout", "responsive"));
    }

    writer.write_event(Event::Start(amp_img))?;
    writer.write_event(Event::End(BytesEnd::new("amp-img")))?;
    Ok(())
}

/// Read image dimensions from the file header.
///
/// Remote images without explicit dimensions cannot be measured and fail
/// the transform.
fn measure_image(src: &str, asset_root: &Path) -> Result<(u32, u32)> {
    if src.is_empty() {
        bail!("image without src attribute");
    }
    if src.contains("://") || src.starts_with("data:") {
        bail!("cannot measure remote image `{src}`; add explicit width/height");
    }

    let local = asset_root.join(src.trim_start_matches('/'));
    image::image_dimensions(&local)
        .with_context(|| format!("Failed to measure image `{src}` at {}", local.display()))
}

/// Ensure the `amp` marker attribute on the root `<html>` element.
fn write_html_with_amp_marker(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    elem: &BytesStart<'_>,
) -> Result<()> {
    let has_marker = elem
        .html_attributes()
        .flatten()
        .any(|attr| attr.key.as_ref() == b"amp");

    let mut elem = elem.to_owned();
    if !has_marker {
        elem.push_attribute(("amp", ""));
    }
    writer.write_event(Event::Start(elem))?;
    Ok(())
}
