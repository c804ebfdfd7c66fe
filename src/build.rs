//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! Builder::build()
//!     │
//!     ├── load + validate site config (_config.yml, required)
//!     ├── clear output directory (idempotent failed builds)
//!     ├── StyleCompiler ──► style registry (before any content render)
//!     ├── TemplateEngine ──► layouts/partials/helpers, per build
//!     ├── ContentGenerator ──► recursive walk, aggregated page list
//!     └── RedirectsGenerator ──► stubs from the top-level config
//! ```
//!
//! A rebuild is a fresh `Builder::build()` call: the config cache and
//! template registry live inside one invocation, so nothing leaks
//! between runs.

use crate::config::{BuildOptions, Config, ConfigError, SitePaths};
use crate::generator::{ContentGenerator, RedirectsGenerator, StyleCompiler};
use crate::log;
use crate::logger::ProgressBars;
use crate::render::{TemplateData, TemplateEngine};
use crate::utils::fs as fsutil;
use anyhow::Result;
use std::{path::Path, time::Instant};
use walkdir::WalkDir;

pub struct Builder {
    paths: SitePaths,
    options: BuildOptions,
}

impl Builder {
    pub fn new(paths: SitePaths, options: BuildOptions) -> Self {
        Self { paths, options }
    }

    /// Run one complete build.
    pub fn build(&self) -> Result<()> {
        let started = Instant::now();

        let config_path = self.paths.site_config();
        if !config_path.is_file() {
            return Err(ConfigError::NotFound(config_path).into());
        }
        let base_config = Config::from_path(&config_path)?;
        base_config.validate()?;

        // Clearing up front keeps repeated failed builds from
        // accumulating stale files; a failed build leaves no output.
        fsutil::clear_dir(&self.paths.dist)?;

        let style_count = count_style_sources(&self.paths.styles);
        let content_count = count_content_files(&self.paths.content, &self.paths.styles);
        let progress = ProgressBars::new(&[("styles", style_count), ("content", content_count)]);

        let styles = StyleCompiler::compile(
            &self.paths.styles,
            &self.paths.styles_dist(),
            "styles",
            || progress.inc_by_name("styles"),
        )?;

        let engine = TemplateEngine::new(&self.paths.layouts)?;
        let base_data = TemplateData::new(&base_config, &styles)?;

        let mut options = self.options;
        if options.amp && !engine.has_layout("amp") {
            log!("amp"; "layout `amp` not found, skipping AMP variants");
            options.amp = false;
        }

        let mut generator =
            ContentGenerator::new(&self.paths, options, &engine, &base_data, Some(&progress));
        let pages = generator.generate(&base_config)?;
        progress.finish();

        RedirectsGenerator::generate(&base_config, &self.paths.dist, &engine)?;

        log!(
            "build";
            "{} pages, {} styles in {:.1?}",
            pages.len(),
            styles.len(),
            started.elapsed()
        );
        Ok(())
    }
}

/// Count style sources for the progress bar.
fn count_style_sources(styles_root: &Path) -> usize {
    if !styles_root.is_dir() {
        return 0;
    }
    WalkDir::new(styles_root)
        .into_iter()
        .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('_'))
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .and_then(|x| x.to_str())
                    .is_some_and(|x| matches!(x, "scss" | "sass" | "css"))
        })
        .count()
}

/// Count markdown files for the progress bar, skipping the styles root
/// and build-private directories. Config-level ignores are not resolved
/// here, so the total is an upper bound.
fn count_content_files(content: &Path, styles_root: &Path) -> usize {
    if !content.is_dir() {
        return 0;
    }
    WalkDir::new(content)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            e.path() != styles_root && !name.starts_with('_') && !name.starts_with('.')
        })
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path().extension().and_then(|x| x.to_str()) == Some("md")
        })
        .count()
}


// ============================================================================
// End-to-End Scenarios
// ============================================================================
