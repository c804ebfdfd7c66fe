//! Per-directory config loading with build-scoped memoization.
//!
//! The cache lives on the resolver instance, and the resolver lives on
//! one build, so a watch-triggered rebuild re-reads every config from
//! disk (each rebuild constructs a fresh resolver).

use super::{Config, ConfigError, defaults};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Loads and caches directory-local `_config.yml` files.
#[derive(Debug, Default)]
pub struct ConfigResolver {
    cache: HashMap<PathBuf, Config>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the directory-local config for `dir`.
    ///
    /// A missing config file is not an error; it yields an empty config
    /// that inherits everything. Results are memoized per directory for
    /// the lifetime of this resolver.
    pub fn load(&mut self, dir: &Path) -> Result<Config, ConfigError> {
        if let Some(cached) = self.cache.get(dir) {
            return Ok(cached.clone());
        }

        let config_path = dir.join(defaults::CONFIG_FILE_NAME);
        let config = if config_path.is_file() {
            Config::from_path(&config_path)?
        } else {
            Config::default()
        };

        self.cache.insert(dir.to_path_buf(), config.clone());
        Ok(config)
    }
}
