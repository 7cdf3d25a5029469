//! Errors raised by plugin registries.

use thiserror::Error;

/// A plugin exists but could not produce its schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ExportError {
    pub message: String,
}

impl ExportError {
    pub fn new(message: impl Into<String>) -> Self {
        ExportError {
            message: message.into(),
        }
    }
}

/// A plugin factory failed to construct an instance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to instantiate `{name}`: {message}")]
pub struct InstantiateError {
    pub name: String,
    pub message: String,
}

impl InstantiateError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        InstantiateError {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// The provider resolver itself could not satisfy a lookup.
///
/// Distinct from "not installed": an unknown name simply resolves to nothing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("provider.{name}: no suitable version installed (constraint `{constraint}`, available: {})", available_list(.available))]
    NoSuitableVersion {
        name: String,
        constraint: String,
        available: Vec<String>,
    },

    #[error("provider.{name}: {message}")]
    Plugin { name: String, message: String },

    #[error("{} problems resolving providers: {}", .0.len(), join(.0))]
    Multiple(Vec<ResolveError>),
}

impl ResolveError {
    /// Collapse a list of errors into one.
    ///
    /// Returns `None` for an empty list.
    pub fn combine(mut errors: Vec<ResolveError>) -> Option<ResolveError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(ResolveError::Multiple(errors)),
        }
    }
}

fn available_list(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

fn join(errors: &[ResolveError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
