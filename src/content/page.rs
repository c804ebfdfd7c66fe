//! Page identity resolution.
//!
//! Derives a page's slug, date, title and output locations from its
//! filename, front matter and directory context, with a fixed precedence:
//!
//! 1. front-matter `slug`, then `permalink`, always beat the filename
//! 2. front-matter `date` always beats the filename
//! 3. the filename pattern `YYYY-MM-DD[-_]slug` fills whatever is left;
//!    for a content-package directory the *directory name* is matched
//!    instead of the file name
//! 4. slug is always lower-cased; title falls back to the slug; year is
//!    the first four characters of the date
//!
//! # Derivation Examples
//!
//! | Source name                    | date         | slug             |
//! |--------------------------------|--------------|------------------|
//! | `2019-08-10-my-second-post.md` | `2019-08-10` | `my-second-post` |
//! | `2019-08-10_notes.md`          | `2019-08-10` | `notes`          |
//! | `about-me.md`                  | -            | `about-me`       |
//! | `2019-08-10.md`                | `2019-08-10` | `2019-08-10`     |

use super::matter::FrontMatter;
use crate::config::{Config, defaults};
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Optional ISO date prefix, optional `_`/`-` separator, rest is slug.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})?[_-]?(.*)$").unwrap());

// ============================================================================
// Name Parsing
// ============================================================================

/// Date and slug derived from a file stem or directory name.
#[derive(Debug, Clone, PartialEq)]
pub struct NameParts {
    pub date: Option<String>,
    pub slug: String,
}

/// Split a stem into its optional ISO date prefix and slug remainder.
///
/// A stem that is *only* a date keeps the full stem as its slug rather
/// than resolving to an empty one.
pub fn parse_name(stem: &str) -> NameParts {
    let captures = NAME_PATTERN
        .captures(stem)
        .unwrap_or_else(|| unreachable!("pattern matches any input"));

    let date = captures.get(1).map(|m| m.as_str().to_owned());
    let slug = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
    let slug = if slug.is_empty() { stem } else { slug };

    NameParts {
        date,
        slug: slug.to_owned(),
    }
}

// ============================================================================
// PageConfig
// ============================================================================

/// Directory context a page is resolved in.
pub struct PageContext<'a> {
    /// File name within its directory, e.g. `2019-08-10-post.md`
    pub file_name: &'a str,
    /// Directory name when the file is a content package's `index.md`
    pub package_dir: Option<&'a str>,
    /// Destination directory relative to the output root, `/`-separated,
    /// empty at the root
    pub dest_rel: &'a str,
    /// Whether an AMP variant will be generated
    pub amp: bool,
}

/// A page's full identity: its directory-merged config plus everything
/// derived from filename and front matter.
#[derive(Debug, Clone, Serialize)]
pub struct PageConfig {
    #[serde(flatten)]
    pub config: Config,

    pub filename: String,

    #[serde(skip)]
    pub source: PathBuf,

    pub title: String,

    /// Always lower-case.
    pub slug: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Output path relative to the output root, lower-case, trailing `/`.
    pub path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_amp: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

impl PageConfig {
    /// Resolve a page's identity. See the module docs for the precedence
    /// table; `config` is the directory-merged config the page inherits.
    pub fn resolve(
        ctx: &PageContext<'_>,
        matter: &FrontMatter,
        excerpt: Option<String>,
        source: PathBuf,
        config: Config,
    ) -> Self {
        // For a content package the directory's own name carries the
        // date/slug pattern, not the constant `index.md`.
        let stem = match ctx.package_dir {
            Some(dir) => dir,
            None => ctx
                .file_name
                .strip_suffix(".md")
                .unwrap_or(ctx.file_name),
        };
        let derived = parse_name(stem);

        let slug = matter
            .slug
            .clone()
            .or_else(|| matter.permalink.clone())
            .unwrap_or(derived.slug)
            .to_lowercase();

        let date = matter.date.clone().or(derived.date);
        let year = date.as_ref().filter(|d| d.len() >= 4).map(|d| d[..4].to_owned());
        let title = matter.title.clone().unwrap_or_else(|| slug.clone());

        let path = join_url_path(&[
            ctx.dest_rel,
            config.base_path.as_deref().unwrap_or_default(),
            &slug,
        ]);
        let path_amp = ctx
            .amp
            .then(|| format!("{path}{}", defaults::AMP_FILE_NAME));

        Self {
            config,
            filename: ctx.file_name.to_owned(),
            source,
            title,
            slug,
            date,
            year,
            excerpt: matter.excerpt.clone().or(excerpt),
            path,
            path_amp,
            layout: matter.layout.clone(),
        }
    }
}

/// Join URL path segments, skipping empties, with a trailing separator;
/// the result is lower-cased as a whole.
fn join_url_path(segments: &[&str]) -> String {
    let mut path = String::new();
    for segment in segments {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        path.push_str(segment);
        path.push('/');
    }
    path.to_lowercase()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(file_name: &'a str, dest_rel: &'a str) -> PageContext<'a> {
        PageContext {
            file_name,
            package_dir: None,
            dest_rel,
            amp: true,
        }
    }

    fn resolve(ctx: &PageContext<'_>, matter: &FrontMatter) -> PageConfig {
        PageConfig::resolve(ctx, matter, None, PathBuf::new(), Config::default())
    }

    // ------------------------------------------------------------------------
    // parse_name
    // ------------------------------------------------------------------------

    #[test]
    fn test_parse_name_date_and_slug() {
        let parts = parse_name("2019-08-10-my-second-post");
        assert_eq!(parts.date.as_deref(), Some("2019-08-10"));
        assert_eq!(parts.slug, "my-second-post");
    }

    #[test]
    fn test_parse_name_underscore_separator() {
        let parts = parse_name("2019-08-10_notes");
        assert_eq!(parts.date.as_deref(), Some("2019-08-10"));
        assert_eq!(parts.slug, "notes");
    }

    #[test]
    fn test_parse_name_no_date() {
        let parts = parse_name("about-me");
        assert_eq!(parts.date, None);
        assert_eq!(parts.slug, "about-me");
    }

    #[test]
    fn test_parse_name_date_only_keeps_stem_as_slug() {
        let parts = parse_name("2019-08-10");
        assert_eq!(parts.date.as_deref(), Some("2019-08-10"));
        assert_eq!(parts.slug, "2019-08-10");
    }

    #[test]
    fn test_parse_name_leading_number_is_not_a_date() {
        let parts = parse_name("10-tips");
        assert_eq!(parts.date, None);
        assert_eq!(parts.slug, "10-tips");
    }

    // ------------------------------------------------------------------------
    // Precedence
    // ------------------------------------------------------------------------

    #[test]
    fn test_filename_derivation_when_matter_silent() {
        let page = resolve(
            &ctx("2019-08-10-my-second-post.md", ""),
            &FrontMatter::default(),
        );

        assert_eq!(page.date.as_deref(), Some("2019-08-10"));
        assert_eq!(page.slug, "my-second-post");
        assert_eq!(page.path, "my-second-post/");
    }

    #[test]
    fn test_matter_slug_beats_filename() {
        let matter = FrontMatter {
            slug: Some("canonical".into()),
            ..Default::default()
        };
        let page = resolve(&ctx("2019-08-10-ignored-name.md", ""), &matter);

        assert_eq!(page.slug, "canonical");
        assert_eq!(page.date.as_deref(), Some("2019-08-10"));
    }

    #[test]
    fn test_permalink_beats_filename() {
        let matter = FrontMatter {
            permalink: Some("aliased".into()),
            ..Default::default()
        };
        let page = resolve(&ctx("whatever.md", ""), &matter);
        assert_eq!(page.slug, "aliased");
    }

    #[test]
    fn test_slug_beats_permalink() {
        let matter = FrontMatter {
            slug: Some("primary".into()),
            permalink: Some("secondary".into()),
            ..Default::default()
        };
        let page = resolve(&ctx("x.md", ""), &matter);
        assert_eq!(page.slug, "primary");
    }

    #[test]
    fn test_matter_date_beats_filename() {
        let matter = FrontMatter {
            date: Some("2020-01-01".into()),
            ..Default::default()
        };
        let page = resolve(&ctx("2019-08-10-post.md", ""), &matter);
        assert_eq!(page.date.as_deref(), Some("2020-01-01"));
        assert_eq!(page.year.as_deref(), Some("2020"));
    }

    #[test]
    fn test_title_falls_back_to_slug() {
        let page = resolve(&ctx("hello-world.md", ""), &FrontMatter::default());
        assert_eq!(page.title, "hello-world");

        let matter = FrontMatter {
            title: Some("Hello, World!".into()),
            ..Default::default()
        };
        let page = resolve(&ctx("hello-world.md", ""), &matter);
        assert_eq!(page.title, "Hello, World!");
    }

    #[test]
    fn test_year_absent_without_date() {
        let page = resolve(&ctx("undated.md", ""), &FrontMatter::default());
        assert_eq!(page.year, None);
    }

    // ------------------------------------------------------------------------
    // Content-package directories
    // ------------------------------------------------------------------------

    #[test]
    fn test_package_dir_identity_from_directory_name() {
        let ctx = PageContext {
            file_name: "index.md",
            package_dir: Some("2019-08-10-my-second-post"),
            dest_rel: "",
            amp: true,
        };
        let page = resolve(&ctx, &FrontMatter::default());

        assert_eq!(page.date.as_deref(), Some("2019-08-10"));
        assert_eq!(page.slug, "my-second-post");
        assert_eq!(page.filename, "index.md");
    }

    #[test]
    fn test_package_dir_matter_still_wins() {
        let ctx = PageContext {
            file_name: "index.md",
            package_dir: Some("2019-08-10-original"),
            dest_rel: "",
            amp: false,
        };
        let matter = FrontMatter {
            slug: Some("renamed".into()),
            ..Default::default()
        };
        let page = resolve(&ctx, &matter);
        assert_eq!(page.slug, "renamed");
        assert_eq!(page.date.as_deref(), Some("2019-08-10"));
    }

    // ------------------------------------------------------------------------
    // Output paths
    // ------------------------------------------------------------------------

    #[test]
    fn test_path_is_lowercase_with_trailing_slash() {
        let page = resolve(&ctx("My-Post.md", "Posts"), &FrontMatter::default());
        assert_eq!(page.slug, "my-post");
        assert_eq!(page.path, "posts/my-post/");
    }

    #[test]
    fn test_path_includes_base_path_override() {
        let config = Config {
            base_path: Some("Blog".into()),
            ..Default::default()
        };
        let page = PageConfig::resolve(
            &ctx("post.md", "archive"),
            &FrontMatter::default(),
            None,
            PathBuf::new(),
            config,
        );
        assert_eq!(page.path, "archive/blog/post/");
    }

    #[test]
    fn test_amp_path_appends_file_name() {
        let page = resolve(&ctx("post.md", ""), &FrontMatter::default());
        assert_eq!(page.path_amp.as_deref(), Some("post/amp.html"));

        let no_amp = PageContext {
            amp: false,
            ..ctx("post.md", "")
        };
        let page = resolve(&no_amp, &FrontMatter::default());
        assert_eq!(page.path_amp, None);
    }

    #[test]
    fn test_root_page_path_has_no_leading_slash() {
        let page = resolve(&ctx("about.md", ""), &FrontMatter::default());
        assert_eq!(page.path, "about/");
    }

    #[test]
    fn test_excerpt_matter_beats_derived() {
        let matter = FrontMatter {
            excerpt: Some("explicit".into()),
            ..Default::default()
        };
        let page = PageConfig::resolve(
            &ctx("p.md", ""),
            &matter,
            Some("derived".into()),
            PathBuf::new(),
            Config::default(),
        );
        assert_eq!(page.excerpt.as_deref(), Some("explicit"));

        let page = PageConfig::resolve(
            &ctx("p.md", ""),
            &FrontMatter::default(),
            Some("derived".into()),
            PathBuf::new(),
            Config::default(),
        );
        assert_eq!(page.excerpt.as_deref(), Some("derived"));
    }
}
