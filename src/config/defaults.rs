//! Default values for project layout and build options.

use std::path::PathBuf;

/// Directory-local and site-wide configuration file name
pub const CONFIG_FILE_NAME: &str = "_config.yml";

/// Output page file name at each resolved page path
pub const PAGE_FILE_NAME: &str = "index.html";

/// AMP variant file name alongside each page
pub const AMP_FILE_NAME: &str = "amp.html";

/// The one markdown file name that turns a directory into a content package
pub const PACKAGE_FILE_NAME: &str = "index.md";

pub mod paths {
    use super::PathBuf;

    pub fn content() -> PathBuf {
        "content".into()
    }

    pub fn layouts() -> PathBuf {
        "layouts".into()
    }

    pub fn dist() -> PathBuf {
        "_dist".into()
    }

    /// Styles root, relative to the content directory
    pub fn styles() -> PathBuf {
        "styles".into()
    }
}

pub mod layout {
    /// Layout applied to content pages without a front-matter `layout`
    pub fn page() -> String {
        "page".into()
    }

    /// Layout wrapping HTML-ish template pages without an explicit layout
    pub fn default() -> String {
        "default".into()
    }

    /// Layout rendered for each AMP variant
    pub fn amp() -> String {
        "amp".into()
    }

    /// Layout rendered for each redirect stub
    pub fn redirect() -> String {
        "redirect".into()
    }
}
