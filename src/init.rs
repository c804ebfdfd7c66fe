//! Site scaffolding.
//!
//! `init` creates a working starter site; `new` creates a dated post.
//! Both refuse to overwrite existing files.

use crate::config::SitePaths;
use crate::log;
use crate::utils::fs as fsutil;
use anyhow::{Result, bail};
use std::{fs, path::Path};

/// Scaffold files written by `init`, relative to the site root.
/// `{date}` in a path is replaced with today's date.
const SCAFFOLD_FILES: &[(&str, &str)] = &[
    ("_config.yml", CONFIG),
    ("layouts/default.hbs", LAYOUT_DEFAULT),
    ("layouts/page.hbs", LAYOUT_PAGE),
    ("layouts/amp.hbs", LAYOUT_AMP),
    ("layouts/redirect.hbs", LAYOUT_REDIRECT),
    ("layouts/_head.hbs", PARTIAL_HEAD),
    ("content/styles/main.scss", STYLE_MAIN),
    ("content/index.html.hbs", INDEX_TEMPLATE),
    ("content/posts/{date}-my-first-post.md", FIRST_POST),
];

/// Create a new site with a working default structure.
pub fn new_site(root: &Path) -> Result<()> {
    if root.exists() && fs::read_dir(root)?.next().is_some() {
        bail!("`{}` already exists and is not empty", root.display());
    }

    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    for (rel, content) in SCAFFOLD_FILES {
        let rel = rel.replace("{date}", &date);
        fsutil::write_file(&root.join(rel), content)?;
    }

    log!("init"; "site created at {}", root.display());
    log!("init"; "run `ampress -r {} serve` to preview it", root.display());
    Ok(())
}

/// Create a new dated post under `content/posts/`.
pub fn new_post(paths: &SitePaths, title: &str) -> Result<()> {
    let slug = slugify(title);
    if slug.is_empty() {
        bail!("post title produces an empty slug: `{title}`");
    }

    let date = chrono::Local::now().format("%Y-%m-%d");
    let path = paths
        .content
        .join("posts")
        .join(format!("{date}-{slug}.md"));
    if path.exists() {
        bail!("`{}` already exists", path.display());
    }

    fsutil::write_file(&path, format!("---\ntitle: {title}\n---\n\n"))?;
    log!("new"; "{}", path.display());
    Ok(())
}

/// Lower-case, alphanumerics kept, whitespace runs collapsed to `-`.
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

// ============================================================================
// Scaffold Content
// ============================================================================

const CONFIG: &str = r#"title: My Awesome Blog
description: Yet another blog
url: https://www.example.com
author: Your Name
"#;

const PARTIAL_HEAD: &str = r#"<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{title}}</title>
  <style>{{{styles.main.content}}}</style>
</head>
"#;

const LAYOUT_DEFAULT: &str = r#"<!DOCTYPE html>
<html lang="en">
{{> head}}
<body>
  <main>{{{content}}}</main>
</body>
</html>
"#;

const LAYOUT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
{{> head}}
<body>
  <article>
    <h1>{{title}}</h1>
    {{#if date}}<time>{{date date}}</time>{{/if}}
    {{{content}}}
    {{#if path_amp}}<link rel="amphtml" href="/{{path_amp}}">{{/if}}
  </article>
</body>
</html>
"#;

const LAYOUT_AMP: &str = r#"<!DOCTYPE html>
<html amp="" lang="en">
<head>
  <meta charset="utf-8">
  <script async="" src="https://cdn.ampproject.org/v0.js"> </script>
  <title>{{title}}</title>
  <link rel="canonical" href="{{url}}/{{path}}">
  <meta name="viewport" content="width=device-width,minimum-scale=1,initial-scale=1">
  <style amp-custom="">{{{styles.main.content}}}</style>
</head>
<body>
  <article>
    <h1>{{title}}</h1>
    {{#if date}}<time>{{date date}}</time>{{/if}}
    {{{content}}}
  </article>
</body>
</html>
"#;

const LAYOUT_REDIRECT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta http-equiv="refresh" content="0; url={{slug}}">
  <link rel="canonical" href="{{slug}}">
</head>
<body>
  <p>This page has moved to <a href="{{slug}}">{{slug}}</a>.</p>
</body>
</html>
"#;

const STYLE_MAIN: &str = r#"$text: #222;

body {
  margin: 0;
  font: 16px/1.6 system-ui, sans-serif;
  color: $text;
}

article {
  max-width: 42rem;
  margin: 0 auto;
  padding: 1rem;
}
"#;

const INDEX_TEMPLATE: &str = r#"---
title: Home
---
<h1>{{title}}</h1>
<ul>
  {{#each (limit pages 10)}}
  <li>
    <a href="/{{path}}">{{title}}</a>
    {{#if date}}<time>{{date date}}</time>{{/if}}
  </li>
  {{/each}}
</ul>
"#;

const FIRST_POST: &str = r#"---
title: My First Post
---

Welcome to your new blog.

Write markdown under `content/`, styles under `content/styles/`, and
layouts under `layouts/`. Each directory may carry its own `_config.yml`
to override inherited settings for its subtree.
"#;
