//! tfschema - schema lookup for Terraform-style plugins and functions
//!
//! This crate resolves an identifier (a provider, resource, data source,
//! provisioner, interpolation function or backend) against a registry
//! snapshot and reports the result as a uniform, serializable envelope.

pub mod core;
pub mod lang;
pub mod ops;
pub mod registry;
pub mod sources;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides mock plugins and registry fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{Namespace, NamespaceKind, Payload, ResultEnvelope, TypeHint};
pub use ops::{resolve, SchemaResolver};
pub use registry::Registries;
pub use util::context::GlobalContext;
