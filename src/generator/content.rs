//! Recursive content generation.
//!
//! Walks the source tree depth-first, one synchronous visit per
//! directory:
//!
//! ```text
//! ResolveConfig → CopyAssets → ProcessContentFiles
//!     → RecurseSubdirectories (skipped for content packages)
//!     → GenerateIndexTemplates → return aggregated pages
//! ```
//!
//! Siblings are processed in natural listing order (`post-2` before
//! `post-10`). A directory's index templates run only after every
//! descendant has completed, so they always see the full aggregated
//! page list. Per-page AMP rendering is the single tolerated partial
//! failure: it is logged and skipped, everything else propagates.

use super::{amp::AmpGenerator, template::TemplateGenerator};
use crate::config::{BuildOptions, Config, ConfigResolver, SitePaths, defaults};
use crate::content::{ContentParser, PageConfig, page::PageContext};
use crate::log;
use crate::logger::ProgressBars;
use crate::render::{MarkdownRenderer, TemplateData, TemplateEngine};
use crate::utils::{fs as fsutil, html, sort::natural_cmp};
use anyhow::{Context, Result};
use serde_json::Value;
use std::{fs, path::Path};

/// Extensions that are build inputs, never copied as page assets
const SOURCE_EXTENSIONS: &[&str] = &["md", "hbs", "scss", "sass", "css"];

pub struct ContentGenerator<'a> {
    paths: &'a SitePaths,
    options: BuildOptions,
    engine: &'a TemplateEngine,
    base_data: &'a TemplateData,
    markdown: MarkdownRenderer,
    resolver: ConfigResolver,
    template_generator: TemplateGenerator<'a>,
    amp_generator: AmpGenerator<'a>,
    progress: Option<&'a ProgressBars>,
}

/// A page resolved and rendered up to (but not including) its file-system
/// side effects.
struct PreparedPage {
    page: PageConfig,
    data: TemplateData,
}

impl<'a> ContentGenerator<'a> {
    pub fn new(
        paths: &'a SitePaths,
        options: BuildOptions,
        engine: &'a TemplateEngine,
        base_data: &'a TemplateData,
        progress: Option<&'a ProgressBars>,
    ) -> Self {
        Self {
            paths,
            options,
            engine,
            base_data,
            markdown: MarkdownRenderer::new(),
            resolver: ConfigResolver::new(),
            template_generator: TemplateGenerator::new(engine, base_data),
            amp_generator: AmpGenerator::new(&paths.dist, engine),
            progress,
        }
    }

    /// Walk the whole content tree, returning every generated page.
    pub fn generate(&mut self, base_config: &Config) -> Result<Vec<PageConfig>> {
        let content = self.paths.content.clone();
        let dist = self.paths.dist.clone();
        self.render_directory(&content, &dist, base_config)
    }

    fn render_directory(
        &mut self,
        source: &Path,
        dest: &Path,
        inherited: &Config,
    ) -> Result<Vec<PageConfig>> {
        let current = self.resolver.load(source)?.merge_onto(inherited);
        let entry_names = list_sorted(source)?;
        let dest_rel = self.dest_rel(dest);

        let is_package = entry_names
            .iter()
            .any(|n| n == defaults::PACKAGE_FILE_NAME);

        let mut pages = Vec::new();
        let mut template_dest = dest.to_path_buf();

        if is_package {
            // The package directory itself is the content node: its page
            // lands at the parent's destination joined with the slug
            // derived from the directory name, not under a mirrored copy
            // of that name.
            let package_dest_rel = dest
                .parent()
                .map(|p| self.dest_rel(p))
                .unwrap_or_default();

            // Identity first: the asset destination is the page's output
            // path, which front matter may still override.
            let dir_name = source
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            let prepared = self.prepare_page(
                source,
                defaults::PACKAGE_FILE_NAME,
                Some(dir_name),
                &package_dest_rel,
                &current,
            )?;
            self.copy_package_assets(source, &prepared.page.path, &entry_names, &current)?;
            // Sibling template pages belong to the package page, so they
            // land under its output path rather than a mirror of the
            // dated directory name.
            template_dest = self.paths.dist.join(&prepared.page.path);
            pages.push(self.emit_page(prepared)?);

            // Stray markdown siblings keep ordinary per-file identity.
            for name in self.content_file_names(source, &entry_names, &current) {
                if name != defaults::PACKAGE_FILE_NAME {
                    let prepared = self.prepare_page(source, &name, None, &dest_rel, &current)?;
                    pages.push(self.emit_page(prepared)?);
                }
            }
        } else {
            self.copy_assets(source, dest, &entry_names, &current)?;

            for name in self.content_file_names(source, &entry_names, &current) {
                let prepared = self.prepare_page(source, &name, None, &dest_rel, &current)?;
                pages.push(self.emit_page(prepared)?);
            }

            for name in self.subdirectory_names(source, &entry_names, &current) {
                let sub_pages = self
                    .render_directory(&source.join(&name), &dest.join(&name), &current)
                    .with_context(|| {
                        format!("Failed to process {}", source.join(&name).display())
                    })?;
                pages.extend(sub_pages);
            }
        }

        self.template_generator
            .generate(source, &template_dest, &current, &pages)?;

        Ok(pages)
    }

    // ------------------------------------------------------------------------
    // Per-page steps
    // ------------------------------------------------------------------------

    /// Parse, resolve and render a content file into template data,
    /// without touching the output tree yet.
    fn prepare_page(
        &self,
        dir: &Path,
        file_name: &str,
        package_dir: Option<&str>,
        dest_rel: &str,
        current: &Config,
    ) -> Result<PreparedPage> {
        let source_path = dir.join(file_name);
        let parsed = ContentParser::new(&self.markdown)
            .parse(&source_path)
            .with_context(|| format!("Failed to parse {}", source_path.display()))?;

        let ctx = PageContext {
            file_name,
            package_dir,
            dest_rel,
            amp: self.options.amp,
        };
        let page = PageConfig::resolve(
            &ctx,
            &parsed.matter,
            parsed.excerpt,
            source_path,
            current.clone(),
        );

        let body = html::rewrite_relative_images(&parsed.html, &page.path)?;

        let mut data = self.base_data.clone();
        data.overlay(&page)?;
        data.insert("content", Value::String(body));

        Ok(PreparedPage { page, data })
    }

    /// Write the page's primary HTML, then attempt its AMP variant.
    fn emit_page(&self, prepared: PreparedPage) -> Result<PageConfig> {
        let PreparedPage { page, data } = prepared;

        let layout = page
            .layout
            .clone()
            .unwrap_or_else(defaults::layout::page);
        let rendered = self
            .engine
            .render_layout(&layout, &data.to_value())
            .with_context(|| format!("Failed to render {}", page.source.display()))?;

        let out_path = self
            .paths
            .dist
            .join(&page.path)
            .join(defaults::PAGE_FILE_NAME);
        fsutil::write_file(&out_path, self.finalize_html(rendered))?;

        if let Some(progress) = self.progress {
            progress.inc_by_name("content");
        }

        if let Err(err) = self.amp_generator.render(&page, &data) {
            log!("amp"; "skipped {}: {err:#}", page.path);
        }

        Ok(page)
    }

    fn finalize_html(&self, html: String) -> Vec<u8> {
        if !self.options.minify {
            return html.into_bytes();
        }

        let mut cfg = minify_html::Cfg::new();
        cfg.keep_closing_tags = true;
        cfg.keep_html_and_head_opening_tags = true;
        cfg.keep_comments = false;
        cfg.minify_css = true;
        minify_html::minify(html.as_bytes(), &cfg)
    }

    // ------------------------------------------------------------------------
    // Asset copying
    // ------------------------------------------------------------------------

    /// Copy a plain directory's loose files into its mirrored destination.
    fn copy_assets(
        &self,
        source: &Path,
        dest: &Path,
        entry_names: &[String],
        current: &Config,
    ) -> Result<()> {
        for name in entry_names {
            let path = source.join(name);
            if !path.is_file() || !is_asset_name(name, current) {
                continue;
            }
            fsutil::copy_file(&path, &dest.join(name))?;
        }
        Ok(())
    }

    /// Copy a content package's sibling files and directories beneath the
    /// page's output path.
    fn copy_package_assets(
        &self,
        source: &Path,
        page_path: &str,
        entry_names: &[String],
        current: &Config,
    ) -> Result<()> {
        let page_root = self.paths.dist.join(page_path);

        for name in entry_names {
            if name == defaults::PACKAGE_FILE_NAME {
                continue;
            }
            let path = source.join(name);
            if path.is_dir() {
                if !is_hidden_name(name) && !current.is_ignored(name) {
                    fsutil::copy_dir_recursively(&path, &page_root.join(name))?;
                }
            } else if is_asset_name(name, current) {
                fsutil::copy_file(&path, &page_root.join(name))?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Directory listing filters
    // ------------------------------------------------------------------------

    fn content_file_names(
        &self,
        source: &Path,
        entry_names: &[String],
        current: &Config,
    ) -> Vec<String> {
        entry_names
            .iter()
            .filter(|name| {
                !is_hidden_name(name)
                    && !current.is_ignored(name)
                    && name.ends_with(".md")
                    && source.join(name.as_str()).is_file()
            })
            .cloned()
            .collect()
    }

    fn subdirectory_names(
        &self,
        source: &Path,
        entry_names: &[String],
        current: &Config,
    ) -> Vec<String> {
        entry_names
            .iter()
            .filter(|name| {
                let path = source.join(name.as_str());
                path.is_dir()
                    && path != self.paths.styles
                    && !is_hidden_name(name)
                    && !current.is_ignored(name)
            })
            .cloned()
            .collect()
    }

    fn dest_rel(&self, dest: &Path) -> String {
        dest.strip_prefix(&self.paths.dist)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default()
    }
}

/// Names starting with `_` are build-private; `.`-prefixed are hidden.
fn is_hidden_name(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('.')
}

/// A loose file is an asset unless it is a build input or excluded.
fn is_asset_name(name: &str, current: &Config) -> bool {
    if is_hidden_name(name)
        || current.is_ignored(name)
        || fsutil::IGNORED_FILE_NAMES.contains(&name)
    {
        return false;
    }
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    !SOURCE_EXTENSIONS.contains(&extension)
}

/// Directory entry names in natural order.
fn list_sorted(dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort_by(|a, b| natural_cmp(a, b));
    Ok(names)
}

// ============================================================================
// Tests
// ============================================================================
