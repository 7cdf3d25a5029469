//! Global context for tfschema operations.
//!
//! Provides centralized access to configuration, paths, and environment.
//!
//! ## Catalog sources
//!
//! Catalogs are loaded in this order, later entries overriding earlier ones:
//!
//! 1. `catalogs` from the global then the project config, or, if neither
//!    lists any, the default `catalog.toml` in `~/.tfschema` and the project
//!    `.tfschema` directory when present
//! 2. `TFSCHEMA_CATALOG` (platform path-list syntax)
//! 3. `--catalog` flags

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::registry::Registries;
use crate::sources::Catalog;
use crate::util::config::{self, Config};

/// Environment variable holding extra catalog paths.
pub const CATALOG_ENV: &str = "TFSCHEMA_CATALOG";

/// File name of the default catalog in a config directory.
pub const DEFAULT_CATALOG: &str = "catalog.toml";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Per-user directory (~/.tfschema/), if a home directory is known
    home: Option<PathBuf>,

    /// Nearest project `.tfschema` directory
    project: Option<PathBuf>,

    /// Merged global and project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a context for the current directory and user.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_dirs(cwd, config::global_config_dir()))
    }

    /// Create a context with explicit working and per-user directories.
    pub fn with_dirs(cwd: PathBuf, home: Option<PathBuf>) -> Self {
        let project = config::find_project_dir(&cwd);
        let config = config::load_config(
            home.as_ref().map(|h| h.join("config.toml")).as_deref(),
            project.as_ref().map(|p| p.join("config.toml")).as_deref(),
        );

        GlobalContext {
            cwd,
            home,
            project,
            config,
        }
    }

    /// Get the project `.tfschema` directory, if one was found.
    pub fn project_dir(&self) -> Option<&Path> {
        self.project.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Catalogs to load, in load order.
    ///
    /// `env` is the raw value of [`CATALOG_ENV`]; `extra` comes from the
    /// command line. Relative extra paths resolve against the working
    /// directory.
    pub fn catalog_paths(&self, env: Option<&OsStr>, extra: &[PathBuf]) -> Vec<PathBuf> {
        let mut paths = if self.config.catalogs.is_empty() {
            [self.home.as_ref(), self.project.as_ref()]
                .into_iter()
                .flatten()
                .map(|dir| dir.join(DEFAULT_CATALOG))
                .filter(|path| path.is_file())
                .collect()
        } else {
            self.config.catalogs.clone()
        };

        if let Some(env) = env {
            paths.extend(std::env::split_paths(env).filter(|p| !p.as_os_str().is_empty()));
        }
        paths.extend(extra.iter().map(|p| self.cwd.join(p)));
        paths
    }

    /// Load every catalog and build the registry snapshot.
    pub fn load_registries(&self, paths: &[PathBuf]) -> Result<Registries> {
        let mut catalog = Catalog::new();
        for path in paths {
            tracing::debug!("loading catalog {}", path.display());
            let loaded = Catalog::load(path)
                .with_context(|| format!("failed to load catalog: {}", path.display()))?;
            catalog.merge(loaded);
        }
        if catalog.is_empty() {
            tracing::debug!("no plugins configured; only functions are available");
        }
        Ok(catalog.into_registries(&self.config.constraints))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kind::NamespaceKind;
    use crate::ops::resolve;
    use crate::util::config::CONFIG_DIR;
    use tempfile::TempDir;

    struct Layout {
        _tmp: TempDir,
        home: PathBuf,
        project: PathBuf,
    }

    fn layout() -> Layout {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home").join(CONFIG_DIR);
        let project = tmp.path().join("work");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(project.join(CONFIG_DIR)).unwrap();
        Layout {
            _tmp: tmp,
            home,
            project,
        }
    }

    #[test]
    fn test_default_catalogs() {
        let layout = layout();
        let global = layout.home.join(DEFAULT_CATALOG);
        std::fs::write(&global, "[provisioners.file]\n").unwrap();

        let ctx = GlobalContext::with_dirs(layout.project.clone(), Some(layout.home.clone()));
        assert_eq!(ctx.project_dir(), Some(layout.project.join(CONFIG_DIR).as_path()));
        // The project catalog does not exist, so only the global one is used.
        assert_eq!(ctx.catalog_paths(None, &[]), vec![global]);
    }

    #[test]
    fn test_configured_catalogs_replace_defaults() {
        let layout = layout();
        std::fs::write(layout.home.join(DEFAULT_CATALOG), "").unwrap();
        std::fs::write(
            layout.project.join(CONFIG_DIR).join("config.toml"),
            "catalogs = [\"plugins.toml\"]\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_dirs(layout.project.clone(), Some(layout.home.clone()));
        let env = std::env::join_paths(["/env/a.toml", "/env/b.toml"]).unwrap();
        let paths = ctx.catalog_paths(Some(&env), &[PathBuf::from("cli.toml")]);

        assert_eq!(
            paths,
            vec![
                layout.project.join(CONFIG_DIR).join("plugins.toml"),
                PathBuf::from("/env/a.toml"),
                PathBuf::from("/env/b.toml"),
                layout.project.join("cli.toml"),
            ]
        );
    }

    #[test]
    fn test_load_registries_with_constraints() {
        let layout = layout();
        let catalog = layout.project.join("catalog.toml");
        std::fs::write(&catalog, "[providers.aws]\nversion = \"1.2.0\"\n").unwrap();
        std::fs::write(
            layout.home.join("config.toml"),
            "[constraints]\naws = \">=2\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_dirs(layout.project.clone(), Some(layout.home.clone()));
        let registries = ctx.load_registries(&[catalog]).unwrap();

        let envelope = resolve::resolve(&registries, "aws", "provider");
        assert_eq!(envelope.kind, NamespaceKind::Provider);
        assert!(envelope.is_error());
    }

    #[test]
    fn test_load_registries_reports_bad_catalog() {
        let layout = layout();
        let ctx = GlobalContext::with_dirs(layout.project.clone(), Some(layout.home.clone()));
        let missing = layout.project.join("missing.toml");

        let err = ctx.load_registries(&[missing]).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.toml"));
    }
}
