//! Index-style template pages.
//!
//! Template pages (`.hbs` files living in the content tree) are not
//! backed by a single content file: listings, feeds, sitemaps. They run
//! once per directory, after every descendant has been generated, so the
//! aggregated page list they see is complete.

use crate::config::Config;
use crate::content::{PageConfig, matter};
use crate::render::{TemplateData, TemplateEngine};
use crate::utils::{fs as fsutil, sort::natural_cmp};
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::Path;

/// Template page extension, stripped on output (`feed.xml.hbs` → `feed.xml`)
const TEMPLATE_EXTENSION: &str = "hbs";

pub struct TemplateGenerator<'a> {
    engine: &'a TemplateEngine,
    base_data: &'a TemplateData,
}

impl<'a> TemplateGenerator<'a> {
    pub fn new(engine: &'a TemplateEngine, base_data: &'a TemplateData) -> Self {
        Self { engine, base_data }
    }

    /// Render every template page directly in `source_dir` against the
    /// merged config, the style registry and the aggregated page list.
    pub fn generate(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        config: &Config,
        pages: &[PageConfig],
    ) -> Result<()> {
        let mut template_names: Vec<String> = std::fs::read_dir(source_dir)
            .with_context(|| format!("Failed to read {}", source_dir.display()))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| {
                !name.starts_with('_')
                    && !config.is_ignored(name)
                    && Path::new(name).extension().and_then(|e| e.to_str())
                        == Some(TEMPLATE_EXTENSION)
            })
            .collect();
        template_names.sort_by(|a, b| natural_cmp(a, b));

        if template_names.is_empty() {
            return Ok(());
        }

        // Index pages see newest-first; the caller's aggregation order is
        // left untouched.
        let pages_value = serde_json::to_value(sorted_for_index(pages))?;

        for name in template_names {
            self.render_template_page(source_dir, dest_dir, &name, config, &pages_value)
                .with_context(|| format!("Failed to generate {}", source_dir.join(&name).display()))?;
        }

        Ok(())
    }

    fn render_template_page(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        file_name: &str,
        config: &Config,
        pages: &Value,
    ) -> Result<()> {
        let raw = fsutil::read_to_string(&source_dir.join(file_name))?;
        let (matter, body) = matter::parse(&raw)?;

        let out_name = file_name
            .strip_suffix(".hbs")
            .unwrap_or(file_name)
            .to_owned();

        let mut data = self.base_data.clone();
        data.overlay(config)?;
        data.overlay(&matter)?;
        data.insert("filename", json!(file_name));
        data.insert("pages", pages.clone());

        let fragment = self.engine.render_source(body, &data.to_value())?;

        // A template page without an explicit layout is wrapped in
        // `default` only when it produces an HTML-ish file; feeds and
        // sitemaps are emitted unwrapped.
        let layout = matter.layout.clone().or_else(|| {
            is_html_name(&out_name).then(crate::config::defaults::layout::default)
        });

        let output = match layout {
            None => fragment,
            Some(layout) => {
                data.insert("content", Value::String(fragment));
                self.engine.render_layout(&layout, &data.to_value())?
            }
        };

        fsutil::write_file(&dest_dir.join(&out_name), output)
    }
}

/// Sort pages newest-first for index rendering: by date descending,
/// falling back to filename descending when either date is absent.
pub fn sorted_for_index(pages: &[PageConfig]) -> Vec<PageConfig> {
    let mut sorted = pages.to_vec();
    sorted.sort_by(|a, b| match (&a.date, &b.date) {
        (Some(da), Some(db)) => natural_cmp(db, da),
        _ => natural_cmp(&b.filename, &a.filename),
    });
    sorted
}

fn is_html_name(name: &str) -> bool {
    name.ends_with(".html") || name.ends_with(".htm")
}
