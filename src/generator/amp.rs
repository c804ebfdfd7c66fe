//! AMP variant generation.
//!
//! Each content page gets a second render through the `amp` layout,
//! followed by the fallible AMP transform. Failures here are the one
//! tolerated partial failure in a build: the caller logs and moves on,
//! and the page's primary HTML is unaffected.

use crate::config::defaults;
use crate::content::PageConfig;
use crate::render::{TemplateData, TemplateEngine};
use crate::utils::{amp, fs as fsutil};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub struct AmpGenerator<'a> {
    dist_dir: PathBuf,
    engine: &'a TemplateEngine,
}

impl<'a> AmpGenerator<'a> {
    pub fn new(dist_dir: &Path, engine: &'a TemplateEngine) -> Self {
        Self {
            dist_dir: dist_dir.to_path_buf(),
            engine,
        }
    }

    /// Render and write a page's AMP variant.
    ///
    /// `data` is the same template data the primary render saw, content
    /// included. Page assets are already on disk at this point, so the
    /// transform can measure referenced images under the output root.
    pub fn render(&self, page: &PageConfig, data: &TemplateData) -> Result<()> {
        let Some(path_amp) = &page.path_amp else {
            return Ok(());
        };

        let html = self
            .engine
            .render_layout(&defaults::layout::amp(), &data.to_value())?;
        let amp_html = amp::transform(&html, &self.dist_dir)?;

        fsutil::write_file(&self.dist_dir.join(path_amp), amp_html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::content::{FrontMatter, page::PageContext};
    use serde_json::json;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, TemplateEngine) {
        let tmp = tempfile::tempdir().unwrap();
        let layouts = tmp.path().join("layouts");
        fs::create_dir_all(&layouts).unwrap();
        fs::write(
            layouts.join("amp.hbs"),
            "<html amp=\"\"><body><h1>{{title}}</h1>{{{content}}}</body></html>",
        )
        .unwrap();
        let engine = TemplateEngine::new(&layouts).unwrap();
        (tmp, engine)
    }

    fn resolve_page(amp: bool) -> PageConfig {
        PageConfig::resolve(
            &PageContext {
                file_name: "2019-08-10-post.md",
                package_dir: None,
                dest_rel: "",
                amp,
            },
            &FrontMatter::default(),
            None,
            PathBuf::new(),
            Config::default(),
        )
    }

    #[test]
    fn test_amp_variant_written_at_amp_path() {
        let (tmp, engine) = fixture();
        let dist = tmp.path().join("dist");
        let generator = AmpGenerator::new(&dist, &engine);

        let page = resolve_page(true);
        let mut data = TemplateData::new(&Config::default(), &[]).unwrap();
        data.overlay(&page).unwrap();
        data.insert("content", json!("<p>hello</p>"));

        generator.render(&page, &data).unwrap();

        let out = fs::read_to_string(dist.join("post/amp.html")).unwrap();
        assert!(out.contains("<p>hello</p>"));
        assert!(out.contains("amp=\"\""));
    }

    #[test]
    fn test_disabled_amp_is_a_no_op() {
        let (tmp, engine) = fixture();
        let dist = tmp.path().join("dist");
        let generator = AmpGenerator::new(&dist, &engine);

        let page = resolve_page(false);
        let data = TemplateData::new(&Config::default(), &[]).unwrap();
        generator.render(&page, &data).unwrap();

        assert!(!dist.exists());
    }

    #[test]
    fn test_broken_image_surfaces_error() {
        let (tmp, engine) = fixture();
        let dist = tmp.path().join("dist");
        let generator = AmpGenerator::new(&dist, &engine);

        let page = resolve_page(true);
        let mut data = TemplateData::new(&Config::default(), &[]).unwrap();
        data.overlay(&page).unwrap();
        data.insert("content", json!(r#"<img src="/post/missing.png" />"#));

        assert!(generator.render(&page, &data).is_err());
        assert!(!dist.join("post/amp.html").exists());
    }
}
