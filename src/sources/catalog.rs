//! Plugin catalogs.
//!
//! A catalog is a TOML file describing installed providers, provisioners and
//! backends together with their schemas:
//!
//! ```toml
//! [providers.aws]
//! version = "1.54.0"
//! schema-file = "schemas/aws.json"
//!
//! [providers.aws.resources.aws_instance.schema.ami]
//! type = "string"
//! required = true
//!
//! [provisioners.local-exec.provision.command]
//! type = "string"
//! required = true
//!
//! [backends.s3.config-schema.attributes.bucket]
//! type = "string"
//! required = true
//! ```
//!
//! Provider schemas may live in a separate JSON file; it is only read when
//! the provider is actually exported.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use semver::{Version, VersionReq};
use serde::Deserialize;
use thiserror::Error;

use crate::core::schema::{
    ConfigSchema, ProviderSchema, ProvisionerSchema, ResourceSchemaInfo, SchemaInfo,
};
use crate::registry::{
    BackendSchemaSource, DataSourceType, ExportError, ProviderFactory, Registries,
    RegistriesBuilder, ResourceProvider, ResourceType, StaticBackend, StaticProviderResolver,
    StaticProvisioner,
};

/// Errors loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("provider `{name}` has invalid version `{version}`")]
    InvalidVersion {
        name: String,
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("backend `{name}` declares both `schema` and `config-schema`")]
    AmbiguousBackend { name: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CatalogFile {
    providers: BTreeMap<String, ProviderEntry>,
    provisioners: BTreeMap<String, ProvisionerSchema>,
    backends: BTreeMap<String, BackendEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct ProviderEntry {
    version: Option<String>,
    schema_file: Option<PathBuf>,
    provider: SchemaInfo,
    resources: BTreeMap<String, ResourceSchemaInfo>,
    data_sources: BTreeMap<String, ResourceSchemaInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct BackendEntry {
    schema: Option<SchemaInfo>,
    config_schema: Option<ConfigSchema>,
}

/// A provider described by a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogProvider {
    name: String,
    version: Version,
    schema_file: Option<PathBuf>,
    inline: ProviderSchema,
}

impl CatalogProvider {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Absolute path of the external schema file, if any.
    pub fn schema_file(&self) -> Option<&Path> {
        self.schema_file.as_deref()
    }

    fn factory(&self) -> ProviderFactory {
        let provider = self.clone();
        Arc::new(move || Ok(Box::new(provider.clone()) as Box<dyn ResourceProvider>))
    }

    fn read_schema_file(path: &Path) -> Result<ProviderSchema, ExportError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ExportError::new(format!("failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| ExportError::new(format!("failed to parse {}: {}", path.display(), e)))
    }
}

impl ResourceProvider for CatalogProvider {
    fn resources(&self) -> Vec<ResourceType> {
        self.inline.resources.keys().map(ResourceType::new).collect()
    }

    fn data_sources(&self) -> Vec<DataSourceType> {
        self.inline
            .data_sources
            .keys()
            .map(DataSourceType::new)
            .collect()
    }

    fn export(&self) -> Result<ProviderSchema, ExportError> {
        let Some(path) = &self.schema_file else {
            return Ok(self.inline.clone());
        };

        tracing::trace!("reading schema of `{}` from {}", self.name, path.display());
        let mut schema = Self::read_schema_file(path)?;
        if schema.version.is_none() {
            schema.version = self.inline.version.clone();
        }
        Ok(schema)
    }
}

/// Plugins described by one or more catalog files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    providers: BTreeMap<String, CatalogProvider>,
    provisioners: BTreeMap<String, ProvisionerSchema>,
    backends: BTreeMap<String, BackendSchemaSource>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&contents, base).map_err(|e| match e {
            CatalogError::Parse { source, .. } => CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse catalog text; relative schema files resolve against `base`.
    pub fn parse(contents: &str, base: &Path) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(contents).map_err(|source| CatalogError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;

        let mut catalog = Catalog::new();

        for (name, entry) in file.providers {
            let version = match &entry.version {
                Some(v) => Version::parse(v).map_err(|source| CatalogError::InvalidVersion {
                    name: name.clone(),
                    version: v.clone(),
                    source,
                })?,
                None => Version::new(0, 0, 0),
            };
            let schema_file = entry.schema_file.map(|f| base.join(f));
            let provider = CatalogProvider {
                name: name.clone(),
                version,
                schema_file,
                inline: ProviderSchema {
                    version: entry.version,
                    provider: entry.provider,
                    resources: entry.resources,
                    data_sources: entry.data_sources,
                },
            };
            catalog.providers.insert(name, provider);
        }

        catalog.provisioners = file.provisioners;

        for (name, entry) in file.backends {
            let source = match (entry.schema, entry.config_schema) {
                (Some(_), Some(_)) => return Err(CatalogError::AmbiguousBackend { name }),
                (_, Some(config)) => BackendSchemaSource::ConfigSchema(config),
                (schema, None) => BackendSchemaSource::SchemaMap(schema.unwrap_or_default()),
            };
            catalog.backends.insert(name, source);
        }

        Ok(catalog)
    }

    /// Merge another catalog into this one (other takes precedence per name).
    pub fn merge(&mut self, other: Catalog) {
        self.providers.extend(other.providers);
        self.provisioners.extend(other.provisioners);
        self.backends.extend(other.backends);
    }

    pub fn providers(&self) -> impl Iterator<Item = &CatalogProvider> {
        self.providers.values()
    }

    pub fn provisioner_names(&self) -> impl Iterator<Item = &str> {
        self.provisioners.keys().map(String::as_str)
    }

    pub fn backend_names(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty() && self.provisioners.is_empty() && self.backends.is_empty()
    }

    /// Registry builder populated with every plugin in the catalog.
    pub fn registries_builder(&self) -> RegistriesBuilder {
        let mut resolver = StaticProviderResolver::new();
        for provider in self.providers.values() {
            resolver.install(
                provider.name.clone(),
                provider.version.clone(),
                provider.factory(),
            );
        }

        let mut builder = Registries::builder().providers(resolver);
        for (name, schema) in &self.provisioners {
            builder = builder.provisioner(name.clone(), StaticProvisioner::factory(schema.clone()));
        }
        for (name, source) in &self.backends {
            builder = builder.backend(name.clone(), StaticBackend::factory(source.clone()));
        }
        builder
    }

    /// Build registries from the catalog with the given version constraints.
    pub fn into_registries(self, constraints: &BTreeMap<String, VersionReq>) -> Registries {
        constraints
            .iter()
            .fold(self.registries_builder(), |builder, (name, req)| {
                builder.constraint(name.clone(), req.clone())
            })
            .build()
    }
}
