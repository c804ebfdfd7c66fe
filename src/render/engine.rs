//! Per-build template engine.
//!
//! One `TemplateEngine` is constructed per build and passed by reference
//! to every renderer. There is no process-global registration, so
//! parallel and test builds can't observe each other's partials.
//!
//! Every `.hbs` file in the layouts directory is registered eagerly at
//! construction, under its file stem with a leading underscore stripped
//! (`_head.hbs` → `{{> head}}`). A partial referenced before
//! registration is therefore impossible, and a reference to a template
//! that never existed fails the render loudly.

use super::helpers;
use anyhow::{Context as _, Result};
use handlebars::Handlebars;
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Template resolution errors
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template not found: `{name}` (expected {path})")]
    NotFound { name: String, path: PathBuf },
}

/// Build-scoped handlebars registry wrapper.
pub struct TemplateEngine {
    registry: Handlebars<'static>,
    layouts_dir: PathBuf,
}

impl TemplateEngine {
    /// Construct an engine with all layouts, partials and helpers
    /// registered.
    pub fn new(layouts_dir: &Path) -> Result<Self> {
        let mut registry = Handlebars::new();
        helpers::register(&mut registry);

        if layouts_dir.is_dir() {
            let mut entries: Vec<_> = fs::read_dir(layouts_dir)
                .with_context(|| format!("Failed to read {}", layouts_dir.display()))?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("hbs")
                })
                .collect();
            entries.sort();

            for path in entries {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default();
                let name = stem.strip_prefix('_').unwrap_or(stem);
                registry
                    .register_template_file(name, &path)
                    .with_context(|| format!("Failed to compile template {}", path.display()))?;
            }
        }

        Ok(Self {
            registry,
            layouts_dir: layouts_dir.to_path_buf(),
        })
    }

    pub fn has_layout(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    /// Render a named layout with the given data.
    ///
    /// A missing layout is fatal and names the path it was expected at.
    pub fn render_layout(&self, name: &str, data: &Value) -> Result<String> {
        if !self.registry.has_template(name) {
            return Err(TemplateError::NotFound {
                name: name.to_owned(),
                path: self.layouts_dir.join(format!("{name}.hbs")),
            }
            .into());
        }

        self.registry
            .render(name, data)
            .with_context(|| format!("Failed to render layout `{name}`"))
    }

    /// Render an ad-hoc template source (template pages, inline bodies).
    pub fn render_source(&self, source: &str, data: &Value) -> Result<String> {
        self.registry
            .render_template(source, data)
            .context("Failed to render template source")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn engine_with(files: &[(&str, &str)]) -> TemplateEngine {
        let tmp = tempfile::tempdir().unwrap();
        for (name, content) in files {
            fs::write(tmp.path().join(name), content).unwrap();
        }
        TemplateEngine::new(tmp.path()).unwrap()
    }

    #[test]
    fn test_layout_rendering() {
        let engine = engine_with(&[("page.hbs", "<h1>{{title}}</h1>")]);
        let out = engine
            .render_layout("page", &json!({"title": "Hello"}))
            .unwrap();
        assert_eq!(out, "<h1>Hello</h1>");
    }

    #[test]
    fn test_partial_name_strips_underscore() {
        let engine = engine_with(&[
            ("_head.hbs", "<head>{{title}}</head>"),
            ("default.hbs", "{{> head}}<body>{{{content}}}</body>"),
        ]);
        let out = engine
            .render_layout("default", &json!({"title": "T", "content": "<p>x</p>"}))
            .unwrap();
        assert_eq!(out, "<head>T</head><body><p>x</p></body>");
    }

    #[test]
    fn test_missing_layout_is_loud() {
        let engine = engine_with(&[]);
        let err = engine.render_layout("page", &json!({})).unwrap_err();

        let template_err = err.downcast_ref::<TemplateError>().unwrap();
        assert!(format!("{template_err}").contains("`page`"));
        assert!(format!("{template_err}").contains("page.hbs"));
    }

    #[test]
    fn test_missing_partial_fails_render() {
        let engine = engine_with(&[("page.hbs", "{{> nonexistent}}")]);
        assert!(engine.render_layout("page", &json!({})).is_err());
    }

    #[test]
    fn test_render_source_ad_hoc() {
        let engine = engine_with(&[]);
        let out = engine
            .render_source("Hi {{name}}!", &json!({"name": "there"}))
            .unwrap();
        assert_eq!(out, "Hi there!");
    }

    #[test]
    fn test_render_source_uses_registered_partials() {
        let engine = engine_with(&[("_footer.hbs", "<footer/>")]);
        let out = engine.render_source("body{{> footer}}", &json!({})).unwrap();
        assert_eq!(out, "body<footer/>");
    }

    #[test]
    fn test_helpers_available() {
        let engine = engine_with(&[]);
        let out = engine
            .render_source("{{date d}}", &json!({"d": "2019-08-10"}))
            .unwrap();
        assert_eq!(out, "August 10, 2019");
    }

    #[test]
    fn test_missing_layouts_dir_is_fine_until_lookup() {
        let engine = TemplateEngine::new(Path::new("/no/such/layouts")).unwrap();
        assert!(!engine.has_layout("page"));
        assert!(engine.render_layout("page", &json!({})).is_err());
    }
}
