//! Resolution orchestrator.
//!
//! Turns an identifier and an optional type hint into exactly one
//! [`ResultEnvelope`]:
//!
//! 1. `functions` always yields the full function catalog.
//! 2. An explicit hint probes exactly one namespace.
//! 3. Otherwise the [`Cascade`] is walked in order until a namespace returns
//!    a hit or a hard failure. Misses fall through; if everything misses the
//!    result is `Not found` tagged `unknown`.
//!
//! Errors never escape as `Err`; each one becomes an error envelope.

use tracing::debug;

use crate::core::envelope::{Payload, ResultEnvelope};
use crate::core::kind::{Namespace, NamespaceKind, TypeHint};
use crate::lang::functions;
use crate::ops::probe::{ProbeOutcome, Prober, FUNCTIONS};
use crate::registry::Registries;

/// One step of the fallback cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    /// `names` meta-query (currently provisioner names only)
    Names,
    /// A regular namespace probe
    Probe(Namespace),
}

impl CascadeStep {
    fn kind(&self) -> NamespaceKind {
        match self {
            CascadeStep::Names => NamespaceKind::Names,
            CascadeStep::Probe(namespace) => namespace.kind(),
        }
    }
}

/// Ordered list of namespaces tried when no type hint is given.
///
/// Earlier steps win: an identifier that exists both as a provider and as a
/// provisioner resolves to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cascade {
    steps: Vec<CascadeStep>,
}

impl Cascade {
    pub fn new(steps: Vec<CascadeStep>) -> Self {
        Cascade { steps }
    }

    /// names, provider, resource, data-source, provisioner, function, backend.
    pub fn broad() -> Self {
        let mut steps = vec![CascadeStep::Names];
        steps.extend(Namespace::ALL.iter().copied().map(CascadeStep::Probe));
        Cascade { steps }
    }

    /// names, provider, resource, data-source, provisioner.
    ///
    /// Functions and backends are then reachable only through an explicit
    /// type hint (or the `functions` identifier).
    pub fn legacy() -> Self {
        Cascade {
            steps: vec![
                CascadeStep::Names,
                CascadeStep::Probe(Namespace::Provider),
                CascadeStep::Probe(Namespace::Resource),
                CascadeStep::Probe(Namespace::DataSource),
                CascadeStep::Probe(Namespace::Provisioner),
            ],
        }
    }

    pub fn steps(&self) -> &[CascadeStep] {
        &self.steps
    }
}

impl Default for Cascade {
    fn default() -> Self {
        Cascade::broad()
    }
}

/// Resolves identifiers against a registry snapshot.
pub struct SchemaResolver<'a> {
    prober: Prober<'a>,
    registries: &'a Registries,
    cascade: Cascade,
}

impl<'a> SchemaResolver<'a> {
    /// Resolver using the broad cascade.
    pub fn new(registries: &'a Registries) -> Self {
        SchemaResolver {
            prober: Prober::new(registries),
            registries,
            cascade: Cascade::default(),
        }
    }

    /// Use a different fallback cascade.
    pub fn with_cascade(mut self, cascade: Cascade) -> Self {
        self.cascade = cascade;
        self
    }

    /// Resolve with a type hint given as text (case-insensitive).
    pub fn resolve(&self, name: &str, hint: &str) -> ResultEnvelope {
        if name == FUNCTIONS {
            return self.function_catalog();
        }
        match hint.parse::<TypeHint>() {
            Ok(hint) => self.resolve_hint(name, hint),
            Err(e) => ResultEnvelope::error(name, NamespaceKind::Unknown, e.to_string()),
        }
    }

    /// Resolve with an already-parsed type hint.
    pub fn resolve_hint(&self, name: &str, hint: TypeHint) -> ResultEnvelope {
        if name == FUNCTIONS {
            return self.function_catalog();
        }
        match hint {
            TypeHint::Only(namespace) => self.resolve_in(name, namespace),
            TypeHint::Any => self.resolve_any(name),
        }
    }

    fn function_catalog(&self) -> ResultEnvelope {
        debug!("returning the full function catalog");
        ResultEnvelope::new(
            FUNCTIONS,
            NamespaceKind::Function,
            Payload::FunctionCatalog {
                schema: functions::catalog(self.registries.functions()),
            },
        )
    }

    fn resolve_in(&self, name: &str, namespace: Namespace) -> ResultEnvelope {
        let kind = namespace.kind();
        match self.prober.probe(namespace, name) {
            ProbeOutcome::Hit(payload) => ResultEnvelope::new(name, kind, payload),
            ProbeOutcome::Failed(message) => ResultEnvelope::error(name, kind, message),
            ProbeOutcome::Miss | ProbeOutcome::Uninstantiable { .. } => {
                ResultEnvelope::not_found(name, kind)
            }
        }
    }

    fn resolve_any(&self, name: &str) -> ResultEnvelope {
        for step in self.cascade.steps() {
            let outcome = match step {
                CascadeStep::Names => self.prober.names(name),
                CascadeStep::Probe(namespace) => self.prober.probe(*namespace, name),
            };

            match outcome {
                ProbeOutcome::Hit(payload) => {
                    debug!("`{}` resolved as {}", name, step.kind());
                    return ResultEnvelope::new(name, step.kind(), payload);
                }
                ProbeOutcome::Failed(message) => {
                    debug!("`{}` failed as {}, stopping", name, step.kind());
                    return ResultEnvelope::error(name, step.kind(), message);
                }
                ProbeOutcome::Miss | ProbeOutcome::Uninstantiable { .. } => continue,
            }
        }

        ResultEnvelope::not_found(name, NamespaceKind::Unknown)
    }
}

/// Resolve one identifier with the broad cascade.
pub fn resolve(registries: &Registries, name: &str, hint: &str) -> ResultEnvelope {
    SchemaResolver::new(registries).resolve(name, hint)
}
