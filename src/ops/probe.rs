//! Registry prober.
//!
//! Asks a single registry whether it has an entity with a given identifier
//! and, if so, extracts its schema. Instances are constructed only here, only
//! for the namespace being probed, and dropped before returning.

use tracing::{debug, trace};

use crate::core::envelope::Payload;
use crate::core::kind::Namespace;
use crate::lang::functions;
use crate::registry::{ProviderFactory, Registries, ResourceProvider};

/// Identifier that requests the whole interpolation function catalog.
pub const FUNCTIONS: &str = "functions";

/// Identifier of the provisioner `names` meta-query.
pub const PROVISIONERS: &str = "provisioners";

/// Result of probing one namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// Entity found and schema extracted.
    Hit(Payload),

    /// Namespace has no entity with this identifier.
    Miss,

    /// A matching factory exists but failed to construct an instance.
    ///
    /// Callers currently treat this like [`ProbeOutcome::Miss`]; a provider
    /// that cannot start is indistinguishable from one that isn't offered.
    Uninstantiable { key: String, reason: String },

    /// Entity exists but its schema could not be produced.
    Failed(String),
}

impl ProbeOutcome {
    /// Whether a fallback search must stop at this outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProbeOutcome::Hit(_) | ProbeOutcome::Failed(_))
    }
}

/// Derive the owning provider name of a resource or data source.
///
/// Everything before the first `_`, or the whole identifier if there is none.
pub fn provider_name(identifier: &str) -> &str {
    match identifier.find('_') {
        Some(i) => &identifier[..i],
        None => identifier,
    }
}

/// Probes registries on behalf of the resolver.
#[derive(Clone, Copy)]
pub struct Prober<'a> {
    registries: &'a Registries,
}

impl<'a> Prober<'a> {
    pub fn new(registries: &'a Registries) -> Self {
        Prober { registries }
    }

    /// Probe a single namespace for an identifier.
    pub fn probe(&self, namespace: Namespace, name: &str) -> ProbeOutcome {
        let outcome = match namespace {
            Namespace::Provider => self.provider(name),
            Namespace::Resource | Namespace::DataSource => self.declared_type(namespace, name),
            Namespace::Provisioner => self.provisioner(name),
            Namespace::Function => self.function(name),
            Namespace::Backend => self.backend(name),
        };

        match &outcome {
            ProbeOutcome::Hit(_) => debug!("{} `{}`: found", namespace, name),
            ProbeOutcome::Miss => debug!("{} `{}`: not found", namespace, name),
            ProbeOutcome::Uninstantiable { key, reason } => {
                debug!("{} `{}`: `{}` could not start: {}", namespace, name, key, reason)
            }
            ProbeOutcome::Failed(message) => debug!("{} `{}`: {}", namespace, name, message),
        }

        outcome
    }

    /// Answer a `names` meta-query.
    ///
    /// Only `provisioners` is defined; any other identifier is a miss.
    pub fn names(&self, name: &str) -> ProbeOutcome {
        if name != PROVISIONERS {
            return ProbeOutcome::Miss;
        }
        debug!("listing provisioner names");
        let names = self.registries.provisioners().keys().cloned().collect();
        ProbeOutcome::Hit(Payload::Names { names })
    }

    fn resolve(&self, provider: &str) -> Result<Vec<(String, ProviderFactory)>, String> {
        let requirements = self.registries.requirements_for(provider);
        self.registries
            .providers()
            .resolve_providers(&requirements)
            .map(|factories| factories.into_iter().collect())
            .map_err(|e| e.to_string())
    }

    fn provider(&self, name: &str) -> ProbeOutcome {
        let factories = match self.resolve(name) {
            Ok(factories) => factories,
            Err(message) => return ProbeOutcome::Failed(message),
        };

        let Some((key, factory)) = factories.into_iter().find(|(key, _)| key == name) else {
            return ProbeOutcome::Miss;
        };

        trace!("instantiating provider `{}`", key);
        let provider = match factory() {
            Ok(provider) => provider,
            Err(e) => {
                return ProbeOutcome::Uninstantiable {
                    key,
                    reason: e.to_string(),
                }
            }
        };

        match provider.export() {
            Ok(schema) => ProbeOutcome::Hit(Payload::Provider(schema)),
            Err(e) => ProbeOutcome::Failed(format!(
                "Cannot get schema for provider '{}': {}",
                key, e
            )),
        }
    }

    fn declared_type(&self, namespace: Namespace, name: &str) -> ProbeOutcome {
        let owner = provider_name(name);
        let factories = match self.resolve(owner) {
            Ok(factories) => factories,
            Err(message) => return ProbeOutcome::Failed(message),
        };

        let mut first_failure = None;

        for (key, factory) in factories {
            trace!("instantiating provider `{}` for {} `{}`", key, namespace, name);
            let provider = match factory() {
                Ok(provider) => provider,
                Err(e) => {
                    first_failure.get_or_insert(ProbeOutcome::Uninstantiable {
                        key,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !declares(provider.as_ref(), namespace, name) {
                continue;
            }

            let mut schema = match provider.export() {
                Ok(schema) => schema,
                Err(e) => {
                    return ProbeOutcome::Failed(format!(
                        "Cannot get schema for {} '{}' of provider '{}': {}",
                        namespace, name, key, e
                    ))
                }
            };

            let entries = match namespace {
                Namespace::DataSource => &mut schema.data_sources,
                _ => &mut schema.resources,
            };

            return match entries.remove(name) {
                Some(entry) => ProbeOutcome::Hit(Payload::Resource {
                    provider: key,
                    schema: entry,
                }),
                None => ProbeOutcome::Failed(format!(
                    "Cannot get schema for {} '{}' of provider '{}': declared but missing from the exported schema",
                    namespace, name, key
                )),
            };
        }

        first_failure.unwrap_or(ProbeOutcome::Miss)
    }

    fn provisioner(&self, name: &str) -> ProbeOutcome {
        let Some(factory) = self.registries.provisioners().get(name) else {
            return ProbeOutcome::Miss;
        };

        trace!("instantiating provisioner `{}`", name);
        let provisioner = match factory() {
            Ok(provisioner) => provisioner,
            Err(e) => {
                return ProbeOutcome::Uninstantiable {
                    key: name.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        match provisioner.export() {
            Ok(schema) => ProbeOutcome::Hit(Payload::Provisioner(schema)),
            Err(e) => ProbeOutcome::Failed(format!(
                "Cannot get schema for provisioner '{}': {}",
                name, e
            )),
        }
    }

    fn function(&self, name: &str) -> ProbeOutcome {
        let table = self.registries.functions();
        if name == FUNCTIONS {
            return ProbeOutcome::Hit(Payload::FunctionCatalog {
                schema: functions::catalog(table),
            });
        }
        match functions::lookup(table, name) {
            Some(schema) => ProbeOutcome::Hit(Payload::Function { schema }),
            None => ProbeOutcome::Miss,
        }
    }

    fn backend(&self, name: &str) -> ProbeOutcome {
        let Some(factory) = self.registries.backends().get(name) else {
            return ProbeOutcome::Miss;
        };

        trace!("instantiating backend `{}`", name);
        let backend = match factory() {
            Ok(backend) => backend,
            Err(e) => {
                return ProbeOutcome::Uninstantiable {
                    key: name.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        match backend.schema() {
            Ok(source) => ProbeOutcome::Hit(Payload::Backend {
                schema: source.into_schema_info(),
            }),
            Err(e) => ProbeOutcome::Failed(format!(
                "Cannot get schema for backend '{}': {}",
                name, e
            )),
        }
    }
}

fn declares(provider: &dyn ResourceProvider, namespace: Namespace, name: &str) -> bool {
    match namespace {
        Namespace::DataSource => provider.data_sources().iter().any(|d| d.name == name),
        _ => provider.resources().iter().any(|r| r.name == name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{ConfigAttribute, ConfigSchema, SchemaDefinition, ValueType};
    use crate::registry::BackendSchemaSource;
    use crate::test_support::{
        failing_factory, provider_schema, MockBackend, MockProvider, MockProvisioner,
        RecordingResolver,
    };

    #[test]
    fn test_provider_name_split() {
        assert_eq!(provider_name("aws_instance"), "aws");
        assert_eq!(provider_name("aws_iam_role"), "aws");
        assert_eq!(provider_name("aws"), "aws");
        assert_eq!(provider_name("_odd"), "");
        assert_eq!(provider_name(""), "");
    }

    #[test]
    fn test_provider_hit() {
        let mock = MockProvider::new().with_export(provider_schema(&["aws_instance"], &[]));
        let mut resolver = RecordingResolver::new();
        resolver.install("aws", mock.factory());
        let registries = Registries::builder().providers(resolver).build();

        let outcome = Prober::new(&registries).probe(Namespace::Provider, "aws");
        match outcome {
            ProbeOutcome::Hit(Payload::Provider(schema)) => {
                assert!(schema.resources.contains_key("aws_instance"));
            }
            other => panic!("expected provider hit, got {:?}", other),
        }
        assert_eq!(mock.export_calls(), 1);
    }

    #[test]
    fn test_provider_prefix_is_not_a_match() {
        let mut resolver = RecordingResolver::new();
        resolver.install("aws", MockProvider::new().factory());
        let registries = Registries::builder().providers(resolver).build();

        let outcome = Prober::new(&registries).probe(Namespace::Provider, "aws_instance");
        assert_eq!(outcome, ProbeOutcome::Miss);
    }

    #[test]
    fn test_provider_export_failure_names_the_key() {
        let mock = MockProvider::new().with_export_error("plugin crashed");
        let mut resolver = RecordingResolver::new();
        resolver.install("aws", mock.factory());
        let registries = Registries::builder().providers(resolver).build();

        match Prober::new(&registries).probe(Namespace::Provider, "aws") {
            ProbeOutcome::Failed(message) => {
                assert!(message.contains("'aws'"));
                assert!(message.contains("plugin crashed"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_provider_instantiation_failure_is_distinct() {
        let mut resolver = RecordingResolver::new();
        resolver.install("aws", failing_factory("aws", "binary missing"));
        let registries = Registries::builder().providers(resolver).build();

        match Prober::new(&registries).probe(Namespace::Provider, "aws") {
            ProbeOutcome::Uninstantiable { key, reason } => {
                assert_eq!(key, "aws");
                assert!(reason.contains("binary missing"));
            }
            other => panic!("expected uninstantiable, got {:?}", other),
        }
    }

    #[test]
    fn test_resource_probes_only_owning_provider() {
        let aws = MockProvider::new().with_export(provider_schema(&["aws_instance"], &[]));
        let google = MockProvider::new();
        let mut resolver = RecordingResolver::new();
        let requests = resolver.requests();
        resolver.install("aws", aws.factory());
        resolver.install("google", google.factory());
        let registries = Registries::builder().providers(resolver).build();

        let outcome = Prober::new(&registries).probe(Namespace::Resource, "aws_instance");
        match outcome {
            ProbeOutcome::Hit(Payload::Resource { provider, .. }) => assert_eq!(provider, "aws"),
            other => panic!("expected resource hit, got {:?}", other),
        }

        assert_eq!(*requests.lock().unwrap(), vec![vec!["aws".to_string()]]);
        assert_eq!(google.instantiations(), 0);
    }

    #[test]
    fn test_data_source_does_not_match_resource_list() {
        let aws = MockProvider::new().with_export(provider_schema(&["aws_instance"], &["aws_ami"]));
        let mut resolver = RecordingResolver::new();
        resolver.install("aws", aws.factory());
        let registries = Registries::builder().providers(resolver).build();
        let prober = Prober::new(&registries);

        assert_eq!(
            prober.probe(Namespace::DataSource, "aws_instance"),
            ProbeOutcome::Miss
        );
        assert!(matches!(
            prober.probe(Namespace::DataSource, "aws_ami"),
            ProbeOutcome::Hit(Payload::Resource { .. })
        ));
        assert_eq!(
            prober.probe(Namespace::Resource, "aws_ami"),
            ProbeOutcome::Miss
        );
    }

    #[test]
    fn test_undeclared_resource_skips_export() {
        let aws = MockProvider::new().with_export(provider_schema(&["aws_instance"], &[]));
        let mut resolver = RecordingResolver::new();
        resolver.install("aws", aws.factory());
        let registries = Registries::builder().providers(resolver).build();

        let outcome = Prober::new(&registries).probe(Namespace::Resource, "aws_vpc");
        assert_eq!(outcome, ProbeOutcome::Miss);
        assert_eq!(aws.export_calls(), 0);
    }

    #[test]
    fn test_declared_but_unexported_resource_fails() {
        let aws = MockProvider::new()
            .with_resources(&["aws_instance"])
            .with_export(provider_schema(&[], &[]));
        let mut resolver = RecordingResolver::new();
        resolver.install("aws", aws.factory());
        let registries = Registries::builder().providers(resolver).build();

        let outcome = Prober::new(&registries).probe(Namespace::Resource, "aws_instance");
        assert!(matches!(outcome, ProbeOutcome::Failed(ref m) if m.contains("missing")));
    }

    #[test]
    fn test_resolver_failure_is_extraction_failure() {
        let mut resolver = RecordingResolver::new();
        resolver.fail_with("aws", "registry unreachable");
        let registries = Registries::builder().providers(resolver).build();

        match Prober::new(&registries).probe(Namespace::Resource, "aws_instance") {
            ProbeOutcome::Failed(message) => assert!(message.contains("registry unreachable")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_provisioner_probe() {
        let mock = MockProvisioner::new();
        let registries = Registries::builder()
            .provisioner("local-exec", mock.factory())
            .build();
        let prober = Prober::new(&registries);

        assert!(matches!(
            prober.probe(Namespace::Provisioner, "local-exec"),
            ProbeOutcome::Hit(Payload::Provisioner(_))
        ));
        assert!(mock.export_called());
        assert_eq!(
            prober.probe(Namespace::Provisioner, "remote-exec"),
            ProbeOutcome::Miss
        );
    }

    #[test]
    fn test_provisioner_export_failure() {
        let mock = MockProvisioner::new().with_export_error("boom");
        let registries = Registries::builder()
            .provisioner("chef", mock.factory())
            .build();

        assert_eq!(
            Prober::new(&registries).probe(Namespace::Provisioner, "chef"),
            ProbeOutcome::Failed("Cannot get schema for provisioner 'chef': boom".to_string())
        );
    }

    #[test]
    fn test_function_probe() {
        let registries = Registries::default();
        let prober = Prober::new(&registries);

        assert!(matches!(
            prober.probe(Namespace::Function, "lookup"),
            ProbeOutcome::Hit(Payload::Function { .. })
        ));
        assert!(matches!(
            prober.probe(Namespace::Function, FUNCTIONS),
            ProbeOutcome::Hit(Payload::FunctionCatalog { .. })
        ));
        assert_eq!(prober.probe(Namespace::Function, "nope"), ProbeOutcome::Miss);
    }

    #[test]
    fn test_backend_accessors_normalize() {
        let mut map = crate::core::schema::SchemaInfo::new();
        map.insert(
            "path".to_string(),
            SchemaDefinition::optional(ValueType::String),
        );

        let mut config = ConfigSchema::default();
        config.attributes.insert(
            "path".to_string(),
            ConfigAttribute {
                optional: true,
                ..ConfigAttribute::default()
            },
        );

        let registries = Registries::builder()
            .backend(
                "local",
                MockBackend::new(BackendSchemaSource::SchemaMap(map)).factory(),
            )
            .backend(
                "local-config",
                MockBackend::new(BackendSchemaSource::ConfigSchema(config)).factory(),
            )
            .build();
        let prober = Prober::new(&registries);

        let a = prober.probe(Namespace::Backend, "local");
        let b = prober.probe(Namespace::Backend, "local-config");
        assert!(matches!(a, ProbeOutcome::Hit(Payload::Backend { .. })));
        assert_eq!(a, b);
    }

    #[test]
    fn test_backend_schema_failure() {
        let registries = Registries::builder()
            .backend(
                "s3",
                MockBackend::failing("credentials required").factory(),
            )
            .build();

        assert_eq!(
            Prober::new(&registries).probe(Namespace::Backend, "s3"),
            ProbeOutcome::Failed("Cannot get schema for backend 's3': credentials required".to_string())
        );
    }

    #[test]
    fn test_names_query() {
        let registries = Registries::builder()
            .provisioner("remote-exec", MockProvisioner::new().factory())
            .provisioner("file", MockProvisioner::new().factory())
            .provisioner("local-exec", MockProvisioner::new().factory())
            .build();
        let prober = Prober::new(&registries);

        assert_eq!(
            prober.names(PROVISIONERS),
            ProbeOutcome::Hit(Payload::Names {
                names: vec![
                    "file".to_string(),
                    "local-exec".to_string(),
                    "remote-exec".to_string()
                ]
            })
        );
        assert_eq!(prober.names("providers"), ProbeOutcome::Miss);
        assert_eq!(prober.names("file"), ProbeOutcome::Miss);
    }

    #[test]
    fn test_terminal_outcomes() {
        assert!(ProbeOutcome::Failed(String::new()).is_terminal());
        assert!(ProbeOutcome::Hit(Payload::Names { names: vec![] }).is_terminal());
        assert!(!ProbeOutcome::Miss.is_terminal());
        assert!(!ProbeOutcome::Uninstantiable {
            key: String::new(),
            reason: String::new()
        }
        .is_terminal());
    }
}
