//! State-storage backends.
//!
//! Backends describe their configuration in one of two ways: a
//! provider-style schema map, or a generic attribute/block config schema.
//! Both normalize to the same [`SchemaInfo`].

use std::sync::Arc;

use crate::core::schema::{ConfigSchema, SchemaInfo};
use crate::registry::errors::{ExportError, InstantiateError};

/// The schema accessor a backend exposes.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendSchemaSource {
    /// Provider-style field map
    SchemaMap(SchemaInfo),
    /// Generic attribute/block schema
    ConfigSchema(ConfigSchema),
}

impl BackendSchemaSource {
    /// Normalize either representation into a schema map.
    pub fn into_schema_info(self) -> SchemaInfo {
        match self {
            BackendSchemaSource::SchemaMap(info) => info,
            BackendSchemaSource::ConfigSchema(schema) => schema.to_schema_info(),
        }
    }
}

/// A backend instance.
pub trait Backend {
    fn schema(&self) -> Result<BackendSchemaSource, ExportError>;
}

/// Constructs a backend instance on demand.
pub type BackendFactory =
    Arc<dyn Fn() -> Result<Box<dyn Backend>, InstantiateError> + Send + Sync>;

/// Backend with a fixed schema.
#[derive(Debug, Clone)]
pub struct StaticBackend {
    source: BackendSchemaSource,
}

impl StaticBackend {
    pub fn new(source: BackendSchemaSource) -> Self {
        StaticBackend { source }
    }

    pub fn factory(source: BackendSchemaSource) -> BackendFactory {
        Arc::new(move || Ok(Box::new(StaticBackend::new(source.clone())) as Box<dyn Backend>))
    }
}

impl Backend for StaticBackend {
    fn schema(&self) -> Result<BackendSchemaSource, ExportError> {
        Ok(self.source.clone())
    }
}
