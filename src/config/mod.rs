//! Site configuration management for `_config.yml`.
//!
//! Configuration is directory-scoped: the site root carries the required
//! base config, and any content directory may carry its own `_config.yml`
//! overriding inherited keys for its subtree.
//!
//! # Recognized keys
//!
//! | Key           | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `title`       | Site title (required at the root)                |
//! | `description` | Site description for meta tags and feeds         |
//! | `url`         | Absolute base URL for feeds and canonical links  |
//! | `author`      | Author name for feeds and meta tags              |
//! | `base_path`   | Extra output path segment for this subtree       |
//! | `redirects`   | Legacy path → target path table                  |
//! | `ignore`      | Entry names excluded from walking and copying    |
//!
//! Unrecognized keys are kept as extension data and exposed to templates
//! unchanged.
//!
//! # Example
//!
//! ```yaml
//! title: My Awesome Blog
//! description: A blog about things
//! url: https://www.my-awesome-blog.com
//! redirects:
//!   /old-path/: new-path
//! ```

pub mod defaults;
mod error;
mod paths;
mod resolver;

pub use error::ConfigError;
pub use paths::SitePaths;
pub use resolver::ConfigResolver;

use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::Path,
};

// ============================================================================
// Directory Config
// ============================================================================

/// Directory-scoped configuration with override-and-fall-through merge
/// semantics.
///
/// Every field is optional so that a child config only shadows the keys
/// it actually sets; see [`Config::merge_onto`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Extra path segment between a page's directory and its slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    /// Legacy path → target path. Merged additively across directory
    /// levels, child entries winning on key conflicts.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub redirects: BTreeMap<String, String>,

    /// Entry names excluded from the walk and from asset copying.
    /// Replaced wholesale when a child sets the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Vec<String>>,

    /// User-defined extension keys, passed to templates unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Config {
    /// Parse configuration from a YAML string.
    pub fn from_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Yaml(origin.to_path_buf(), e))
    }

    /// Load configuration from a file path.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_str(&content, path)
    }

    /// Merge this (child) config onto an inherited parent config.
    ///
    /// Child keys win; unset child keys fall through to the parent. The
    /// `redirects` table merges additively with child entries winning on
    /// conflicts, while `ignore` is replaced wholesale when the child
    /// sets it; both choices are pinned by the tests below.
    pub fn merge_onto(&self, parent: &Config) -> Config {
        let mut redirects = parent.redirects.clone();
        redirects.extend(self.redirects.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut extra = parent.extra.clone();
        extra.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        Config {
            title: self.title.clone().or_else(|| parent.title.clone()),
            description: self
                .description
                .clone()
                .or_else(|| parent.description.clone()),
            url: self.url.clone().or_else(|| parent.url.clone()),
            author: self.author.clone().or_else(|| parent.author.clone()),
            base_path: self.base_path.clone().or_else(|| parent.base_path.clone()),
            redirects,
            ignore: self.ignore.clone().or_else(|| parent.ignore.clone()),
            extra,
        }
    }

    /// Whether a directory entry name is excluded by this config.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore
            .as_deref()
            .is_some_and(|list| list.iter().any(|i| i == name))
    }

    /// Validate a site-root config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.as_deref().unwrap_or_default().is_empty() {
            return Err(ConfigError::Validation(
                "`title` is required in the site config".into(),
            ));
        }

        if let Some(url) = &self.url
            && !url.starts_with("http")
        {
            return Err(ConfigError::Validation(
                "`url` must start with http:// or https://".into(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Build Options
// ============================================================================

/// Build behavior toggles, controlled from the CLI.
#[derive(Debug, Clone, Copy, Educe)]
#[educe(Default)]
pub struct BuildOptions {
    /// Attempt an AMP variant for every content page.
    #[educe(Default = true)]
    pub amp: bool,

    /// Minify emitted HTML.
    pub minify: bool,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(yaml: &str) -> Config {
        Config::from_str(yaml, Path::new("test/_config.yml")).unwrap()
    }

    #[test]
    fn test_from_str_full() {
        let config = parse(
            r#"
title: My Blog
description: A test blog
url: https://example.com
author: Alice
base_path: writing
redirects:
  /old/: new
ignore:
  - drafts
"#,
        );

        assert_eq!(config.title.as_deref(), Some("My Blog"));
        assert_eq!(config.url.as_deref(), Some("https://example.com"));
        assert_eq!(config.base_path.as_deref(), Some("writing"));
        assert_eq!(config.redirects.get("/old/").map(String::as_str), Some("new"));
        assert!(config.is_ignored("drafts"));
        assert!(!config.is_ignored("posts"));
    }

    #[test]
    fn test_from_str_invalid_yaml() {
        let result = Config::from_str("title: [unclosed", Path::new("bad.yml"));
        assert!(result.is_err());
        assert!(format!("{}", result.unwrap_err()).contains("bad.yml"));
    }

    #[test]
    fn test_extra_keys_preserved() {
        let config = parse(
            r#"
title: Test
analytics_id: UA-12345
social:
  twitter: "@user"
"#,
        );

        assert_eq!(
            config.extra.get("analytics_id").and_then(|v| v.as_str()),
            Some("UA-12345")
        );
        assert!(config.extra.get("social").is_some_and(|v| v.is_mapping()));
    }

    #[test]
    fn test_merge_child_keys_win() {
        let parent = parse("title: Parent\ndescription: Parent desc");
        let child = parse("title: Child");

        let merged = child.merge_onto(&parent);
        assert_eq!(merged.title.as_deref(), Some("Child"));
        assert_eq!(merged.description.as_deref(), Some("Parent desc"));
    }

    #[test]
    fn test_merge_unset_keys_fall_through() {
        let parent = parse("title: T\nurl: https://example.com\nauthor: A");
        let child = Config::default();

        let merged = child.merge_onto(&parent);
        assert_eq!(merged.url.as_deref(), Some("https://example.com"));
        assert_eq!(merged.author.as_deref(), Some("A"));
    }

    #[test]
    fn test_merge_redirects_additive() {
        let parent = parse("redirects:\n  /a/: x\n  /b/: y");
        let child = parse("redirects:\n  /b/: z\n  /c/: w");

        let merged = child.merge_onto(&parent);
        assert_eq!(merged.redirects.get("/a/").map(String::as_str), Some("x"));
        // child wins on conflict
        assert_eq!(merged.redirects.get("/b/").map(String::as_str), Some("z"));
        assert_eq!(merged.redirects.get("/c/").map(String::as_str), Some("w"));
    }

    #[test]
    fn test_merge_ignore_replaced_wholesale() {
        let parent = parse("ignore:\n  - drafts\n  - private");
        let child = parse("ignore:\n  - wip");

        let merged = child.merge_onto(&parent);
        assert!(merged.is_ignored("wip"));
        assert!(!merged.is_ignored("drafts"));

        // an unset child list falls through
        let merged = Config::default().merge_onto(&parent);
        assert!(merged.is_ignored("drafts"));
    }

    #[test]
    fn test_merge_extra_child_wins() {
        let parent = parse("title: T\ntheme: dark\nfooter: yes");
        let child = parse("theme: light");

        let merged = child.merge_onto(&parent);
        assert_eq!(
            merged.extra.get("theme").and_then(|v| v.as_str()),
            Some("light")
        );
        assert!(merged.extra.contains_key("footer"));
    }

    #[test]
    fn test_validate_requires_title() {
        let config = parse("description: no title here");
        assert!(config.validate().is_err());

        let config = parse("title: Present");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_url_scheme() {
        let config = parse("title: T\nurl: ftp://example.com");
        assert!(config.validate().is_err());

        let config = parse("title: T\nurl: https://example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = Config::from_path(&PathBuf::from("/no/such/_config.yml"));
        assert!(matches!(result, Err(ConfigError::Io(_, _))));
    }

    #[test]
    fn test_build_options_defaults() {
        let options = BuildOptions::default();
        assert!(options.amp);
        assert!(!options.minify);
    }
}
