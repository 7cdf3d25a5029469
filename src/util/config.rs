//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.tfschema/config.toml` - user-wide defaults
//! - Project: `.tfschema/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::VersionReq;
use serde::{Deserialize, Serialize};

use crate::ops::format::OutputFormat;
use crate::util::shell::ColorChoice;

/// Name of the per-user and per-project directory.
pub const CONFIG_DIR: &str = ".tfschema";

/// tfschema configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog files to load, in order (later entries override earlier ones)
    pub catalogs: Vec<PathBuf>,

    /// Version constraints used when resolving providers
    pub constraints: BTreeMap<String, VersionReq>,

    /// Output defaults
    pub output: OutputConfig,
}

/// Output defaults; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (plain, json)
    pub format: Option<OutputFormat>,

    /// Indent nested output by default
    pub indent: Option<bool>,

    /// Color mode (auto, always, never)
    pub color: Option<ColorChoice>,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Relative catalog paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            for catalog in &mut config.catalogs {
                if catalog.is_relative() {
                    *catalog = base.join(&*catalog);
                }
            }
        }
        Ok(config)
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Catalog lists are concatenated so that the other config's catalogs
    /// load last; constraints are overridden per provider.
    pub fn merge(&mut self, other: Config) {
        self.catalogs.extend(other.catalogs);
        self.constraints.extend(other.constraints);

        if other.output.format.is_some() {
            self.output.format = other.output.format;
        }
        if other.output.indent.is_some() {
            self.output.indent = other.output.indent;
        }
        if other.output.color.is_some() {
            self.output.color = other.output.color;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.tfschema/config.toml)
/// 2. Global config (~/.tfschema/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: Option<&Path>) -> Config {
    let mut config = Config::default();

    for path in [global_path, project_path].into_iter().flatten() {
        config.merge(Config::load_or_default(path));
    }

    config
}

/// Get the global config directory (~/.tfschema).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Find the nearest `.tfschema` directory at or above `start`.
pub fn find_project_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_DIR))
        .find(|candidate| candidate.is_dir())
}
