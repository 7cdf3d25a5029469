//! Test fixtures for common registry layouts.

use crate::core::schema::{
    ProviderSchema, ProvisionerSchema, ResourceSchemaInfo, SchemaDefinition, SchemaInfo, ValueType,
};
use crate::registry::{BackendSchemaSource, Registries};

use super::{MockBackend, MockProvider, MockProvisioner, RecordingResolver};

/// Schema with one required `id` field.
pub fn simple_schema() -> SchemaInfo {
    let mut info = SchemaInfo::new();
    info.insert("id".to_string(), SchemaDefinition::required(ValueType::String));
    info
}

/// Provider schema exporting the given resource and data source types.
pub fn provider_schema(resources: &[&str], data_sources: &[&str]) -> ProviderSchema {
    let entry = || ResourceSchemaInfo {
        schema: simple_schema(),
        timeouts: Vec::new(),
    };

    let mut schema = ProviderSchema {
        version: Some("1.0.0".to_string()),
        ..ProviderSchema::default()
    };
    schema.provider.insert(
        "region".to_string(),
        SchemaDefinition::optional(ValueType::String),
    );
    for name in resources {
        schema.resources.insert(name.to_string(), entry());
    }
    for name in data_sources {
        schema.data_sources.insert(name.to_string(), entry());
    }
    schema
}

/// Provisioner schema with a single `command` argument.
pub fn provisioner_schema() -> ProvisionerSchema {
    let mut schema = ProvisionerSchema::default();
    schema.provision.insert(
        "command".to_string(),
        SchemaDefinition::required(ValueType::String),
    );
    schema
}

/// Mocks making up [`sample_registries`], kept for counter assertions.
pub struct SampleMocks {
    pub aws: MockProvider,
    pub google: MockProvider,
    pub local_exec: MockProvisioner,
    pub local: MockBackend,
}

/// A small but complete set of registries:
///
/// - providers `aws` (`aws_instance`, data source `aws_ami`) and `google`
///   (`google_compute_instance`)
/// - provisioners `local-exec` and `file`
/// - backend `local`
/// - built-in functions
pub fn sample_registries() -> (Registries, SampleMocks) {
    let aws = MockProvider::new().with_export(provider_schema(&["aws_instance"], &["aws_ami"]));
    let google = MockProvider::new().with_export(provider_schema(&["google_compute_instance"], &[]));
    let local_exec = MockProvisioner::new().with_export(provisioner_schema());
    let local = MockBackend::new(BackendSchemaSource::SchemaMap(simple_schema()));

    let mut resolver = RecordingResolver::new();
    resolver.install("aws", aws.factory());
    resolver.install("google", google.factory());

    let registries = Registries::builder()
        .providers(resolver)
        .provisioner("local-exec", local_exec.factory())
        .provisioner("file", MockProvisioner::new().factory())
        .backend("local", local.factory())
        .build();

    (
        registries,
        SampleMocks {
            aws,
            google,
            local_exec,
            local,
        },
    )
}
