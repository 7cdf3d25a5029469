//! Provider plugins and the resolver that hands out their factories.

use std::collections::BTreeMap;
use std::sync::Arc;

use semver::{Version, VersionReq};

use crate::core::schema::ProviderSchema;
use crate::registry::errors::{ExportError, InstantiateError, ResolveError};

/// A resource type declared by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceType {
    pub name: String,
}

impl ResourceType {
    pub fn new(name: impl Into<String>) -> Self {
        ResourceType { name: name.into() }
    }
}

/// A data source type declared by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceType {
    pub name: String,
}

impl DataSourceType {
    pub fn new(name: impl Into<String>) -> Self {
        DataSourceType { name: name.into() }
    }
}

/// A running provider instance.
pub trait ResourceProvider {
    /// Resource types this provider declares, in declaration order.
    fn resources(&self) -> Vec<ResourceType>;

    /// Data source types this provider declares, in declaration order.
    fn data_sources(&self) -> Vec<DataSourceType>;

    /// Export the full schema tree.
    ///
    /// May be expensive; only called once a namespace is actually probed.
    fn export(&self) -> Result<ProviderSchema, ExportError>;
}

/// Constructs a provider instance on demand.
pub type ProviderFactory =
    Arc<dyn Fn() -> Result<Box<dyn ResourceProvider>, InstantiateError> + Send + Sync>;

/// Provider names mapped to acceptable versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginRequirements {
    constraints: BTreeMap<String, VersionReq>,
}

impl PluginRequirements {
    pub fn new() -> Self {
        PluginRequirements::default()
    }

    /// Require a provider by name with no version constraint.
    pub fn require(&mut self, name: impl Into<String>) {
        self.constraints.insert(name.into(), VersionReq::STAR);
    }

    /// Require a provider matching a version constraint.
    pub fn require_version(&mut self, name: impl Into<String>, constraint: VersionReq) {
        self.constraints.insert(name.into(), constraint);
    }

    /// Iterate requirements in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VersionReq)> {
        self.constraints.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constraints.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// Turns requirements into provider factories.
///
/// Names the resolver doesn't know are omitted from the result; an error
/// means the resolver itself could not satisfy a known name.
pub trait ProviderResolver: Send + Sync {
    fn resolve_providers(
        &self,
        requirements: &PluginRequirements,
    ) -> Result<BTreeMap<String, ProviderFactory>, ResolveError>;
}

struct InstalledProvider {
    version: Version,
    factory: ProviderFactory,
}

/// In-memory resolver over installed provider versions.
///
/// When several versions of a provider are installed, the newest one that
/// satisfies the constraint wins.
#[derive(Default)]
pub struct StaticProviderResolver {
    installed: BTreeMap<String, Vec<InstalledProvider>>,
}

impl StaticProviderResolver {
    pub fn new() -> Self {
        StaticProviderResolver::default()
    }

    /// Install a provider version.
    pub fn install(&mut self, name: impl Into<String>, version: Version, factory: ProviderFactory) {
        let versions = self.installed.entry(name.into()).or_default();
        versions.retain(|p| p.version != version);
        versions.push(InstalledProvider { version, factory });
        versions.sort_by(|a, b| b.version.cmp(&a.version));
    }

    /// Names of all installed providers.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.installed.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.installed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }
}

impl ProviderResolver for StaticProviderResolver {
    fn resolve_providers(
        &self,
        requirements: &PluginRequirements,
    ) -> Result<BTreeMap<String, ProviderFactory>, ResolveError> {
        let mut resolved = BTreeMap::new();
        let mut errors = Vec::new();

        for (name, constraint) in requirements.iter() {
            let Some(versions) = self.installed.get(name) else {
                tracing::trace!("provider `{}` is not installed", name);
                continue;
            };

            // Sorted newest first
            match versions.iter().find(|p| constraint.matches(&p.version)) {
                Some(installed) => {
                    tracing::trace!("resolved provider `{}` to {}", name, installed.version);
                    resolved.insert(name.to_string(), Arc::clone(&installed.factory));
                }
                None => errors.push(ResolveError::NoSuitableVersion {
                    name: name.to_string(),
                    constraint: constraint.to_string(),
                    available: versions.iter().map(|p| p.version.to_string()).collect(),
                }),
            }
        }

        match ResolveError::combine(errors) {
            Some(err) => Err(err),
            None => Ok(resolved),
        }
    }
}
