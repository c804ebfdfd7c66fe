//! Project path layout.
//!
//! All paths are resolved once from the project root (plus CLI overrides)
//! and handed around read-only for the rest of the build.

use super::defaults;
use std::path::{Path, PathBuf};

/// Resolved directory layout of a site project.
///
/// | Field     | Default            | Purpose                         |
/// |-----------|--------------------|---------------------------------|
/// | `content` | `<root>/content`   | Content tree (walk root)        |
/// | `styles`  | `<content>/styles` | Style sources; skipped by walk  |
/// | `layouts` | `<root>/layouts`   | Handlebars layouts and partials |
/// | `dist`    | `<root>/_dist`     | Output tree, cleared per build  |
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub root: PathBuf,
    pub content: PathBuf,
    pub styles: PathBuf,
    pub layouts: PathBuf,
    pub dist: PathBuf,
}

impl SitePaths {
    pub fn new(root: &Path) -> Self {
        Self::with_overrides(root, None, None)
    }

    /// Resolve the layout with optional CLI overrides for the content and
    /// output directories.
    pub fn with_overrides(root: &Path, content: Option<&Path>, dist: Option<&Path>) -> Self {
        let root = normalize(root);
        let content = normalize(&root.join(content.unwrap_or(&defaults::paths::content())));
        let styles = content.join(defaults::paths::styles());
        let layouts = normalize(&root.join(defaults::paths::layouts()));
        let dist = normalize(&root.join(dist.unwrap_or(&defaults::paths::dist())));

        Self {
            root,
            content,
            styles,
            layouts,
            dist,
        }
    }

    /// Path of the required site-wide config file.
    pub fn site_config(&self) -> PathBuf {
        self.root.join(defaults::CONFIG_FILE_NAME)
    }

    /// Mirrored output location of the styles root.
    pub fn styles_dist(&self) -> PathBuf {
        self.dist.join(defaults::paths::styles())
    }
}

/// Normalize a path to absolute, using canonicalize if the path exists.
fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = SitePaths::new(tmp.path());

        let root = tmp.path().canonicalize().unwrap();
        assert_eq!(paths.content, root.join("content"));
        assert_eq!(paths.styles, root.join("content/styles"));
        assert_eq!(paths.layouts, root.join("layouts"));
        assert_eq!(paths.dist, root.join("_dist"));
        assert_eq!(paths.site_config(), root.join("_config.yml"));
    }

    #[test]
    fn test_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = SitePaths::with_overrides(
            tmp.path(),
            Some(Path::new("posts")),
            Some(Path::new("out")),
        );

        let root = tmp.path().canonicalize().unwrap();
        assert_eq!(paths.content, root.join("posts"));
        assert_eq!(paths.styles, root.join("posts/styles"));
        assert_eq!(paths.dist, root.join("out"));
    }

    #[test]
    fn test_styles_dist_mirrors_styles_root() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = SitePaths::new(tmp.path());
        assert_eq!(paths.styles_dist(), paths.dist.join("styles"));
    }
}
