//! Redirect stub generation.
//!
//! Emits one small HTML file per entry in the config's redirect table,
//! rendered through the `redirect` layout. Order-independent and fully
//! decoupled from content generation; runs once at the end of a build
//! with the top-level config.

use crate::config::{Config, defaults};
use crate::log;
use crate::render::TemplateEngine;
use crate::utils::fs as fsutil;
use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

pub struct RedirectsGenerator;

impl RedirectsGenerator {
    /// Write a redirect stub at every legacy path in the table.
    ///
    /// A source path with a trailing `/` becomes `…/index.html`; any
    /// other source is written as the literal file path. Intermediate
    /// directories are created as needed.
    pub fn generate(config: &Config, dest_root: &Path, engine: &TemplateEngine) -> Result<()> {
        if config.redirects.is_empty() {
            return Ok(());
        }

        let layout = defaults::layout::redirect();
        for (source, target) in &config.redirects {
            let html = engine
                .render_layout(&layout, &json!({ "slug": target }))
                .with_context(|| format!("Failed to render redirect for `{source}`"))?;

            let relative = source.trim_start_matches('/');
            let out_path = if source.ends_with('/') {
                dest_root.join(relative).join(defaults::PAGE_FILE_NAME)
            } else {
                dest_root.join(relative)
            };

            fsutil::write_file(&out_path, html)?;
            log!("redirects"; "{source} -> {target}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;

    fn engine(tmp: &Path) -> TemplateEngine {
        let layouts = tmp.join("layouts");
        fs::create_dir_all(&layouts).unwrap();
        fs::write(
            layouts.join("redirect.hbs"),
            r#"<meta http-equiv="refresh" content="0; url={{slug}}">"#,
        )
        .unwrap();
        TemplateEngine::new(&layouts).unwrap()
    }

    fn config_with(redirects: &[(&str, &str)]) -> Config {
        Config {
            redirects: redirects
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            ..Default::default()
        }
    }

    #[test]
    fn test_trailing_slash_source_writes_index_html() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("dist");
        let config = config_with(&[("/old-path/", "new-path")]);

        RedirectsGenerator::generate(&config, &dest, &engine(tmp.path())).unwrap();

        let out = fs::read_to_string(dest.join("old-path/index.html")).unwrap();
        assert!(out.contains("url=new-path"));
    }

    #[test]
    fn test_file_source_writes_literal_path() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("dist");
        let config = config_with(&[("/legacy/page.html", "/moved/")]);

        RedirectsGenerator::generate(&config, &dest, &engine(tmp.path())).unwrap();

        let out = fs::read_to_string(dest.join("legacy/page.html")).unwrap();
        assert!(out.contains("url=/moved/"));
    }

    #[test]
    fn test_empty_table_needs_no_layout() {
        let tmp = tempfile::tempdir().unwrap();
        // engine with no layouts at all
        let engine = TemplateEngine::new(&tmp.path().join("missing")).unwrap();

        RedirectsGenerator::generate(&Config::default(), tmp.path(), &engine).unwrap();
    }

    #[test]
    fn test_missing_redirect_layout_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = TemplateEngine::new(&tmp.path().join("missing")).unwrap();
        let config = config_with(&[("/a/", "b")]);

        assert!(RedirectsGenerator::generate(&config, tmp.path(), &engine).is_err());
    }
}
