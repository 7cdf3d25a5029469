//! Core data structures.
//!
//! This module contains the foundational types used throughout tfschema:
//! - Namespace kinds and type hints
//! - The schema tree exported by plugins
//! - The result envelope every query produces

pub mod envelope;
pub mod kind;
pub mod schema;

pub use envelope::{FunctionSchema, Payload, ResultEnvelope, NOT_FOUND};
pub use kind::{Namespace, NamespaceKind, NamespaceParseError, TypeHint};
pub use schema::{
    ConfigSchema, ProviderSchema, ProvisionerSchema, ResourceSchemaInfo, SchemaDefinition,
    SchemaElement, SchemaInfo, ValueType,
};
