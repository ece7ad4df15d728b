//! Configuration loader using figment.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables TOML configuration files (`strata.toml`, `config.toml`)
//! - `yaml-config`: enables YAML configuration files (`strata.yaml`, `strata.yml`, etc.)
//!
//! Both features can be enabled simultaneously; if so, both file formats are searched and loaded.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Config file (explicit, or the first one found in the search paths)
//! 3. Environment variables (`STRATA_*`)
//! 4. Programmatic overrides ([`ConfigLoader::set`], [`ConfigLoader::merge`])
//!
//! # Environment Variable Mapping
//!
//! Environment variables are mapped using the `STRATA_` prefix with `__` as separator:
//!
//! - `STRATA_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `STRATA_LOGGING__FILTERS__STRATA_CORE=trace` → `logging.filters.strata_core = "trace"`
//!
//! # Example
//!
//! ```rust,ignore
//! use strata_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .file("./config/strata.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::{Figment, Provider};
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use serde::Serialize;
use tracing::{debug, info, trace};

use super::error::{ConfigError, ConfigResult};
use super::schema::StrataConfig;
use super::validation::validate_config;

const ENV_PREFIX: &str = "STRATA_";

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Programmatic overrides, merged last.
    overrides: Figment,
    /// Search paths for configuration files.
    search_paths: Vec<PathBuf>,
    /// Whether to load environment variables.
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Adds a search path for configuration files.
    ///
    /// Once any search path is set, the default locations are no longer searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges a figment provider on top of every other source.
    ///
    /// Only the keys the provider emits override earlier sources. Merging a
    /// whole `Serialized::defaults(StrataConfig { .. })` therefore replaces
    /// every field; use [`set`](Self::set) to override a single key.
    pub fn merge<P: Provider>(mut self, provider: P) -> Self {
        self.overrides = self.overrides.merge(provider);
        self
    }

    /// Overrides the value at a dotted key path, e.g. `"logging.level"`.
    pub fn set<V: Serialize>(self, key: &str, value: V) -> Self {
        self.merge(Serialized::default(key, value))
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<StrataConfig> {
        let config: StrataConfig = self.build_figment()?.extract()?;

        debug!(
            logging_level = %config.logging.level,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(StrataConfig::default()));

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_config_file(figment, path)?;
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with {ENV_PREFIX} prefix");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment.merge(self.overrides))
    }

    /// Merges a single config file into the figment, dispatching on file extension.
    ///
    /// Only extensions enabled via feature flags are accepted.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Resolves the effective list of search paths.
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }

        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("strata"));
        }
        paths
    }

    /// Merges the first file in `search_paths × base_names` that exists.
    #[cfg(any(feature = "toml-config", feature = "yaml-config"))]
    fn load_format_files<F>(
        figment: Figment,
        search_paths: &[PathBuf],
        base_names: &[&str],
        merge_fn: F,
    ) -> (Figment, bool)
    where
        F: Fn(Figment, &Path) -> Figment,
    {
        let found = search_paths
            .iter()
            .flat_map(|dir| base_names.iter().map(move |name| dir.join(name)))
            .find(|path| path.exists());

        match found {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration file");
                (merge_fn(figment, &path), true)
            }
            None => (figment, false),
        }
    }

    /// Searches for and loads configuration files from search paths.
    #[cfg_attr(
        not(any(feature = "toml-config", feature = "yaml-config")),
        allow(unused_mut)
    )]
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        let search_paths = self.resolve_search_paths();
        let mut found = false;

        #[cfg(feature = "toml-config")]
        {
            let (f, ok) = Self::load_format_files(
                figment,
                &search_paths,
                &["strata.toml", "config.toml"],
                |fig, path| fig.merge(Toml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        #[cfg(feature = "yaml-config")]
        {
            let (f, ok) = Self::load_format_files(
                figment,
                &search_paths,
                &["strata.yaml", "strata.yml", "config.yaml", "config.yml"],
                |fig, path| fig.merge(Yaml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        if !found {
            debug!(
                searched = search_paths.len(),
                "No configuration file found, using defaults"
            );
        }
        figment
    }
}

/// Loads configuration from the default locations and validates it.
pub fn load_config() -> ConfigResult<StrataConfig> {
    let config = ConfigLoader::new().load()?;
    validate_config(&config)?;
    Ok(config)
}

/// Loads configuration from `path` (plus environment variables) and validates it.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<StrataConfig> {
    let config = ConfigLoader::new().file(path).load()?;
    validate_config(&config)?;
    Ok(config)
}
