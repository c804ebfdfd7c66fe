//! Stylesheet compilation.
//!
//! Runs to completion before any content render, since templates
//! reference styles by name. Style sources are discovered recursively
//! under the styles root; `_`-prefixed names (sass partials) are
//! skipped, `.scss`/`.sass` compile through grass, `.css` passes
//! through. Output mirrors the source layout under the destination.

use crate::utils::fs as fsutil;
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions recognized as style sources
const STYLE_EXTENSIONS: &[&str] = &["scss", "sass", "css"];

/// One compiled stylesheet, shared read-only by every page render.
///
/// `name` is the styles-root-relative path without extension
/// (`main`, `blog/dark`), so same-named files in different directories
/// cannot clobber each other in the registry.
#[derive(Debug, Clone, Serialize)]
pub struct Style {
    pub name: String,
    pub url: String,
    pub content: String,
}

pub struct StyleCompiler;

impl StyleCompiler {
    /// Compile every style source under `styles_root` into `dest_root`,
    /// returning the registry. `url_prefix` is the public mount of
    /// `dest_root` (e.g. `styles`); `on_compiled` feeds the progress bar.
    ///
    /// A missing styles root yields an empty registry.
    pub fn compile(
        styles_root: &Path,
        dest_root: &Path,
        url_prefix: &str,
        on_compiled: impl Fn() + Sync,
    ) -> Result<Vec<Style>> {
        let sources = discover(styles_root);

        sources
            .par_iter()
            .map(|source| {
                let style = compile_one(source, styles_root, dest_root, url_prefix)?;
                on_compiled();
                Ok(style)
            })
            .collect()
    }
}

/// Recursively discover style sources, in stable sorted order.
fn discover(styles_root: &Path) -> Vec<PathBuf> {
    if !styles_root.is_dir() {
        return Vec::new();
    }

    WalkDir::new(styles_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !entry.file_name().to_string_lossy().starts_with('_'))
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| STYLE_EXTENSIONS.contains(&ext))
        })
        .map(|entry| entry.into_path())
        .collect()
}

fn compile_one(
    source: &Path,
    styles_root: &Path,
    dest_root: &Path,
    url_prefix: &str,
) -> Result<Style> {
    let extension = source.extension().and_then(|e| e.to_str()).unwrap_or_default();

    let content = match extension {
        "scss" | "sass" => {
            let options = grass::Options::default().style(grass::OutputStyle::Compressed);
            grass::from_path(source, &options)
                .map_err(|e| anyhow!("{e}"))
                .with_context(|| format!("Failed to compile {}", source.display()))?
        }
        _ => fsutil::read_to_string(source)?,
    };

    let relative = source
        .strip_prefix(styles_root)
        .with_context(|| format!("Style outside styles root: {}", source.display()))?;
    let name = relative
        .with_extension("")
        .to_string_lossy()
        .replace('\\', "/");

    let out_path = dest_root.join(relative).with_extension("css");
    fsutil::write_file(&out_path, &content)?;

    Ok(Style {
        url: format!("/{url_prefix}/{name}.css"),
        name,
        content,
    })
}
