//! Template data assembly.
//!
//! Every render sees one JSON object built by a single merge operation:
//! base config keys, then the style registry, then page-specific keys,
//! then the rendered content. Later overlays win on key conflicts; the
//! object is never mutated after handoff to the engine except for the
//! deliberate `content` augmentation in layout composition.

use crate::config::Config;
use crate::generator::styles::Style;
use anyhow::{Result, bail};
use serde::Serialize;
use serde_json::{Map, Value, json};

/// The full data object exposed to a template evaluation.
#[derive(Debug, Clone)]
pub struct TemplateData {
    root: Map<String, Value>,
}

impl TemplateData {
    /// Base data for a build: merged config keys, the style registry and
    /// the build timestamp.
    pub fn new(config: &Config, styles: &[Style]) -> Result<Self> {
        let mut data = Self { root: Map::new() };
        data.overlay(config)?;

        let registry: Map<String, Value> = styles
            .iter()
            .map(|style| Ok((style.name.clone(), serde_json::to_value(style)?)))
            .collect::<Result<_>>()?;
        data.insert("styles", Value::Object(registry));

        data.insert(
            "build_date",
            json!(chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()),
        );
        Ok(data)
    }

    /// Merge a serializable object's top-level keys over this data.
    pub fn overlay<T: Serialize>(&mut self, value: &T) -> Result<()> {
        match serde_json::to_value(value)? {
            Value::Object(map) => {
                self.root.extend(map);
                Ok(())
            }
            other => bail!("template data overlay must be an object, got: {other}"),
        }
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.root.insert(key.to_owned(), value);
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }
}
