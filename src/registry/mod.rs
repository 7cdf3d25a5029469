//! Plugin registries consulted during schema resolution.
//!
//! The registries are populated once by whatever loads plugins (see
//! [`crate::sources`]) and then handed to the resolver as an immutable
//! [`Registries`] snapshot. Nothing here is global.
//!
//! Factories are cheap to hold; instances are only constructed when a
//! namespace is actually probed, and are dropped right after.

pub mod backend;
pub mod errors;
pub mod provider;
pub mod provisioner;

use std::collections::BTreeMap;

use semver::VersionReq;

use crate::lang::{BuiltinFunctions, FunctionTable};

pub use backend::{Backend, BackendFactory, BackendSchemaSource, StaticBackend};
pub use errors::{ExportError, InstantiateError, ResolveError};
pub use provider::{
    DataSourceType, PluginRequirements, ProviderFactory, ProviderResolver, ResourceProvider,
    ResourceType, StaticProviderResolver,
};
pub use provisioner::{ProvisionerFactory, ResourceProvisioner, StaticProvisioner};

/// Immutable view of every registry the resolver may probe.
pub struct Registries {
    providers: Box<dyn ProviderResolver>,
    provisioners: BTreeMap<String, ProvisionerFactory>,
    backends: BTreeMap<String, BackendFactory>,
    functions: Box<dyn FunctionTable>,
    constraints: BTreeMap<String, VersionReq>,
}

impl Registries {
    /// Start building a snapshot.
    pub fn builder() -> RegistriesBuilder {
        RegistriesBuilder::new()
    }

    pub fn providers(&self) -> &dyn ProviderResolver {
        self.providers.as_ref()
    }

    pub fn provisioners(&self) -> &BTreeMap<String, ProvisionerFactory> {
        &self.provisioners
    }

    pub fn backends(&self) -> &BTreeMap<String, BackendFactory> {
        &self.backends
    }

    pub fn functions(&self) -> &dyn FunctionTable {
        self.functions.as_ref()
    }

    /// Build the requirement set for resolving a single provider name.
    ///
    /// Uses the configured version constraint for that name, if any.
    pub fn requirements_for(&self, provider: &str) -> PluginRequirements {
        let mut reqs = PluginRequirements::new();
        match self.constraints.get(provider) {
            Some(constraint) => reqs.require_version(provider, constraint.clone()),
            None => reqs.require(provider),
        }
        reqs
    }
}

impl Default for Registries {
    fn default() -> Self {
        Registries::builder().build()
    }
}

impl std::fmt::Debug for Registries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registries")
            .field("provisioners", &self.provisioners.keys().collect::<Vec<_>>())
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Registries`].
pub struct RegistriesBuilder {
    providers: Box<dyn ProviderResolver>,
    provisioners: BTreeMap<String, ProvisionerFactory>,
    backends: BTreeMap<String, BackendFactory>,
    functions: Box<dyn FunctionTable>,
    constraints: BTreeMap<String, VersionReq>,
}

impl RegistriesBuilder {
    /// Empty registries with the built-in function table.
    pub fn new() -> Self {
        RegistriesBuilder {
            providers: Box::new(StaticProviderResolver::new()),
            provisioners: BTreeMap::new(),
            backends: BTreeMap::new(),
            functions: Box::new(BuiltinFunctions),
            constraints: BTreeMap::new(),
        }
    }

    /// Set the provider resolver.
    pub fn providers(mut self, resolver: impl ProviderResolver + 'static) -> Self {
        self.providers = Box::new(resolver);
        self
    }

    /// Register a provisioner factory, replacing any with the same name.
    pub fn provisioner(mut self, name: impl Into<String>, factory: ProvisionerFactory) -> Self {
        self.provisioners.insert(name.into(), factory);
        self
    }

    /// Register a backend factory, replacing any with the same name.
    pub fn backend(mut self, name: impl Into<String>, factory: BackendFactory) -> Self {
        self.backends.insert(name.into(), factory);
        self
    }

    /// Set the interpolation function table.
    pub fn functions(mut self, table: impl FunctionTable + 'static) -> Self {
        self.functions = Box::new(table);
        self
    }

    /// Constrain which versions of a provider may be resolved.
    pub fn constraint(mut self, provider: impl Into<String>, constraint: VersionReq) -> Self {
        self.constraints.insert(provider.into(), constraint);
        self
    }

    pub fn build(self) -> Registries {
        Registries {
            providers: self.providers,
            provisioners: self.provisioners,
            backends: self.backends,
            functions: self.functions,
            constraints: self.constraints,
        }
    }
}

impl Default for RegistriesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
