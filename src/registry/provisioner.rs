//! Provisioner plugins.

use std::sync::Arc;

use crate::core::schema::ProvisionerSchema;
use crate::registry::errors::{ExportError, InstantiateError};

/// A running provisioner instance.
pub trait ResourceProvisioner {
    fn export(&self) -> Result<ProvisionerSchema, ExportError>;
}

/// Constructs a provisioner instance on demand.
pub type ProvisionerFactory =
    Arc<dyn Fn() -> Result<Box<dyn ResourceProvisioner>, InstantiateError> + Send + Sync>;

/// Provisioner with a fixed, already-computed schema.
#[derive(Debug, Clone, Default)]
pub struct StaticProvisioner {
    schema: ProvisionerSchema,
}

impl StaticProvisioner {
    pub fn new(schema: ProvisionerSchema) -> Self {
        StaticProvisioner { schema }
    }

    /// Wrap a schema in a factory that clones it per instance.
    pub fn factory(schema: ProvisionerSchema) -> ProvisionerFactory {
        Arc::new(move || {
            Ok(Box::new(StaticProvisioner::new(schema.clone())) as Box<dyn ResourceProvisioner>)
        })
    }
}

impl ResourceProvisioner for StaticProvisioner {
    fn export(&self) -> Result<ProvisionerSchema, ExportError> {
        Ok(self.schema.clone())
    }
}
