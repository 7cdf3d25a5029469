//! Test utilities and mocks for unit tests.
//!
//! Mock plugins record how often they were constructed and exported, so
//! tests can assert that probing stays lazy.
//!
//! # Example
//!
//! ```rust,ignore
//! use tfschema::test_support::{MockProvider, RecordingResolver, provider_schema};
//!
//! let aws = MockProvider::new().with_export(provider_schema(&["aws_instance"], &[]));
//! let mut resolver = RecordingResolver::new();
//! resolver.install("aws", aws.factory());
//! let registries = Registries::builder().providers(resolver).build();
//! ```

pub mod fixtures;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use semver::Version;

use crate::core::schema::{ProviderSchema, ProvisionerSchema};
use crate::registry::{
    Backend, BackendFactory, BackendSchemaSource, DataSourceType, ExportError, InstantiateError,
    PluginRequirements, ProviderFactory, ProviderResolver, ProvisionerFactory, ResolveError,
    ResourceProvider, ResourceProvisioner, ResourceType, StaticProviderResolver,
};

pub use fixtures::*;

#[derive(Default)]
struct MockProviderState {
    resources: Option<Vec<String>>,
    data_sources: Option<Vec<String>>,
    export_return: ProviderSchema,
    export_return_error: Option<String>,
    export_calls: AtomicUsize,
    instantiations: AtomicUsize,
}

/// Mock provider.
///
/// Declared resource and data source types default to the keys of the
/// export schema unless set explicitly.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<MockProviderState>,
}

impl MockProvider {
    pub fn new() -> Self {
        MockProvider::default()
    }

    fn state_mut(&mut self) -> &mut MockProviderState {
        Arc::get_mut(&mut self.state).expect("configure mock before creating factories")
    }

    /// Schema returned by `export`.
    pub fn with_export(mut self, schema: ProviderSchema) -> Self {
        self.state_mut().export_return = schema;
        self
    }

    /// Make `export` fail with the given message.
    pub fn with_export_error(mut self, message: &str) -> Self {
        self.state_mut().export_return_error = Some(message.to_string());
        self
    }

    /// Override the declared resource types.
    pub fn with_resources(mut self, names: &[&str]) -> Self {
        self.state_mut().resources = Some(names.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Override the declared data source types.
    pub fn with_data_sources(mut self, names: &[&str]) -> Self {
        self.state_mut().data_sources = Some(names.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Factory producing instances that share this mock's counters.
    pub fn factory(&self) -> ProviderFactory {
        let state = Arc::clone(&self.state);
        Arc::new(move || {
            state.instantiations.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MockProviderInstance {
                state: Arc::clone(&state),
            }) as Box<dyn ResourceProvider>)
        })
    }

    pub fn export_calls(&self) -> usize {
        self.state.export_calls.load(Ordering::SeqCst)
    }

    pub fn instantiations(&self) -> usize {
        self.state.instantiations.load(Ordering::SeqCst)
    }
}

struct MockProviderInstance {
    state: Arc<MockProviderState>,
}

impl ResourceProvider for MockProviderInstance {
    fn resources(&self) -> Vec<ResourceType> {
        match &self.state.resources {
            Some(names) => names.iter().map(ResourceType::new).collect(),
            None => self
                .state
                .export_return
                .resources
                .keys()
                .map(ResourceType::new)
                .collect(),
        }
    }

    fn data_sources(&self) -> Vec<DataSourceType> {
        match &self.state.data_sources {
            Some(names) => names.iter().map(DataSourceType::new).collect(),
            None => self
                .state
                .export_return
                .data_sources
                .keys()
                .map(DataSourceType::new)
                .collect(),
        }
    }

    fn export(&self) -> Result<ProviderSchema, ExportError> {
        self.state.export_calls.fetch_add(1, Ordering::SeqCst);
        match &self.state.export_return_error {
            Some(message) => Err(ExportError::new(message.clone())),
            None => Ok(self.state.export_return.clone()),
        }
    }
}

/// Provider factory that always fails to construct.
pub fn failing_factory(name: &str, message: &str) -> ProviderFactory {
    let name = name.to_string();
    let message = message.to_string();
    Arc::new(move || {
        Err::<Box<dyn ResourceProvider>, _>(InstantiateError::new(name.clone(), message.clone()))
    })
}

type ExportFn = Arc<dyn Fn() -> Result<ProvisionerSchema, ExportError> + Send + Sync>;

/// Mock provisioner.
#[derive(Clone, Default)]
pub struct MockProvisioner {
    export_called: Arc<AtomicBool>,
    export_fn: Option<ExportFn>,
    export_return: ProvisionerSchema,
    export_return_error: Option<String>,
}

impl MockProvisioner {
    pub fn new() -> Self {
        MockProvisioner::default()
    }

    pub fn with_export(mut self, schema: ProvisionerSchema) -> Self {
        self.export_return = schema;
        self
    }

    pub fn with_export_error(mut self, message: &str) -> Self {
        self.export_return_error = Some(message.to_string());
        self
    }

    /// Compute the export result with a closure instead.
    pub fn with_export_fn(
        mut self,
        f: impl Fn() -> Result<ProvisionerSchema, ExportError> + Send + Sync + 'static,
    ) -> Self {
        self.export_fn = Some(Arc::new(f));
        self
    }

    pub fn export_called(&self) -> bool {
        self.export_called.load(Ordering::SeqCst)
    }

    pub fn factory(&self) -> ProvisionerFactory {
        let mock = self.clone();
        Arc::new(move || Ok(Box::new(mock.clone()) as Box<dyn ResourceProvisioner>))
    }
}

impl ResourceProvisioner for MockProvisioner {
    fn export(&self) -> Result<ProvisionerSchema, ExportError> {
        self.export_called.store(true, Ordering::SeqCst);
        if let Some(f) = &self.export_fn {
            return f();
        }
        match &self.export_return_error {
            Some(message) => Err(ExportError::new(message.clone())),
            None => Ok(self.export_return.clone()),
        }
    }
}

/// Mock backend.
#[derive(Clone)]
pub struct MockBackend {
    result: Result<BackendSchemaSource, ExportError>,
    instantiations: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new(source: BackendSchemaSource) -> Self {
        MockBackend {
            result: Ok(source),
            instantiations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Backend whose schema accessor fails.
    pub fn failing(message: &str) -> Self {
        MockBackend {
            result: Err(ExportError::new(message)),
            instantiations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn instantiations(&self) -> usize {
        self.instantiations.load(Ordering::SeqCst)
    }

    pub fn factory(&self) -> BackendFactory {
        let mock = self.clone();
        Arc::new(move || {
            mock.instantiations.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(mock.clone()) as Box<dyn Backend>)
        })
    }
}

impl Backend for MockBackend {
    fn schema(&self) -> Result<BackendSchemaSource, ExportError> {
        self.result.clone()
    }
}

/// Resolver that records every requirement set it is asked to resolve.
#[derive(Default)]
pub struct RecordingResolver {
    inner: StaticProviderResolver,
    failures: BTreeMap<String, String>,
    requests: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingResolver {
    pub fn new() -> Self {
        RecordingResolver::default()
    }

    /// Install a provider at version 1.0.0.
    pub fn install(&mut self, name: &str, factory: ProviderFactory) {
        self.inner.install(name, Version::new(1, 0, 0), factory);
    }

    /// Make resolution of `name` fail as if the plugin subsystem errored.
    pub fn fail_with(&mut self, name: &str, message: &str) {
        self.failures.insert(name.to_string(), message.to_string());
    }

    /// Shared log of requested provider names, one entry per call.
    pub fn requests(&self) -> Arc<Mutex<Vec<Vec<String>>>> {
        Arc::clone(&self.requests)
    }
}

impl ProviderResolver for RecordingResolver {
    fn resolve_providers(
        &self,
        requirements: &PluginRequirements,
    ) -> Result<BTreeMap<String, ProviderFactory>, ResolveError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(requirements.names().map(str::to_string).collect());
        }

        let errors: Vec<_> = requirements
            .names()
            .filter_map(|name| {
                self.failures.get(name).map(|message| ResolveError::Plugin {
                    name: name.to_string(),
                    message: message.clone(),
                })
            })
            .collect();
        if let Some(err) = ResolveError::combine(errors) {
            return Err(err);
        }

        self.inner.resolve_providers(requirements)
    }
}
