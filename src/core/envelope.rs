//! The uniform result record produced by every resolution.
//!
//! An envelope is built fresh per query, handed to a renderer, and dropped.
//! The payload is a closed sum type so renderers match on it exhaustively.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::kind::NamespaceKind;
use crate::core::schema::{ProviderSchema, ProvisionerSchema, ResourceSchemaInfo, SchemaInfo};

/// Message attached when no namespace had the identifier.
pub const NOT_FOUND: &str = "Not found";

/// Signature of an interpolation function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionSchema {
    pub name: String,
    pub arg_types: Vec<String>,
    pub return_type: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub variadic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variadic_type: Option<String>,
}

/// Exactly one payload shape per envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Full exported provider schema
    Provider(ProviderSchema),

    /// One resource or data source, with the provider that owns it
    Resource {
        provider: String,
        schema: ResourceSchemaInfo,
    },

    Provisioner(ProvisionerSchema),

    Function { schema: FunctionSchema },

    /// Every interpolation function, keyed by name
    FunctionCatalog {
        schema: BTreeMap<String, FunctionSchema>,
    },

    /// Backend configuration, normalized to a provider-style schema map
    Backend { schema: SchemaInfo },

    /// Result of a `names` meta-query
    Names { names: Vec<String> },

    Error { error: String },
}

impl Payload {
    /// The header kind this payload naturally belongs to.
    ///
    /// `None` for errors, which are tagged with whatever was being attempted.
    /// Resources and data sources share a payload shape, so both kinds are
    /// accepted for it.
    pub fn accepts_kind(&self, kind: NamespaceKind) -> bool {
        match self {
            Payload::Provider(_) => kind == NamespaceKind::Provider,
            Payload::Resource { .. } => {
                matches!(kind, NamespaceKind::Resource | NamespaceKind::DataSource)
            }
            Payload::Provisioner(_) => kind == NamespaceKind::Provisioner,
            Payload::Function { .. } | Payload::FunctionCatalog { .. } => {
                kind == NamespaceKind::Function
            }
            Payload::Backend { .. } => kind == NamespaceKind::Backend,
            Payload::Names { .. } => kind == NamespaceKind::Names,
            Payload::Error { .. } => true,
        }
    }
}

/// Header plus payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: NamespaceKind,

    #[serde(flatten)]
    pub payload: Payload,
}

impl ResultEnvelope {
    /// Wrap a payload.
    pub fn new(name: impl Into<String>, kind: NamespaceKind, payload: Payload) -> Self {
        let envelope = ResultEnvelope {
            name: name.into(),
            kind,
            payload,
        };
        debug_assert!(
            envelope.payload.accepts_kind(kind),
            "payload does not match kind {}",
            kind
        );
        envelope
    }

    /// Create an error envelope.
    pub fn error(name: impl Into<String>, kind: NamespaceKind, message: impl Into<String>) -> Self {
        ResultEnvelope {
            name: name.into(),
            kind,
            payload: Payload::Error {
                error: message.into(),
            },
        }
    }

    /// Create a "Not found" error envelope.
    pub fn not_found(name: impl Into<String>, kind: NamespaceKind) -> Self {
        ResultEnvelope::error(name, kind, NOT_FOUND)
    }

    /// Check whether this envelope carries an error.
    pub fn is_error(&self) -> bool {
        matches!(self.payload, Payload::Error { .. })
    }

    /// Get the error message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match &self.payload {
            Payload::Error { error } => Some(error),
            _ => None,
        }
    }

    /// Process exit status for this envelope.
    pub fn exit_code(&self) -> i32 {
        if self.is_error() {
            1
        } else {
            0
        }
    }
}
