//! Artifact generators: styles, content pages, index templates,
//! redirects, AMP variants.

pub mod amp;
pub mod content;
pub mod redirects;
pub mod styles;
pub mod template;

pub use content::ContentGenerator;
pub use redirects::RedirectsGenerator;
pub use styles::{Style, StyleCompiler};
pub use template::TemplateGenerator;
