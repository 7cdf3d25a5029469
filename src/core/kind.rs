//! Namespace kinds and type hints.
//!
//! Every identifier resolves into exactly one namespace. The six probeable
//! namespaces are disjoint registries; `names` and `unknown` only ever appear
//! as envelope tags.

use serde::{Deserialize, Serialize};

/// Tag carried in every result envelope header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamespaceKind {
    Provider,
    Resource,
    DataSource,
    Provisioner,
    Function,
    Backend,
    /// Meta-query listing every entity of a sub-kind.
    Names,
    /// Nothing matched, or the type hint itself was not understood.
    Unknown,
}

impl NamespaceKind {
    /// Get the kind as it appears in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            NamespaceKind::Provider => "provider",
            NamespaceKind::Resource => "resource",
            NamespaceKind::DataSource => "data-source",
            NamespaceKind::Provisioner => "provisioner",
            NamespaceKind::Function => "function",
            NamespaceKind::Backend => "backend",
            NamespaceKind::Names => "names",
            NamespaceKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One of the six registries that can be probed for an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Provider,
    Resource,
    DataSource,
    Provisioner,
    Function,
    Backend,
}

impl Namespace {
    /// All namespaces, in default priority order.
    pub const ALL: [Namespace; 6] = [
        Namespace::Provider,
        Namespace::Resource,
        Namespace::DataSource,
        Namespace::Provisioner,
        Namespace::Function,
        Namespace::Backend,
    ];

    /// The envelope tag for results from this namespace.
    pub fn kind(&self) -> NamespaceKind {
        match self {
            Namespace::Provider => NamespaceKind::Provider,
            Namespace::Resource => NamespaceKind::Resource,
            Namespace::DataSource => NamespaceKind::DataSource,
            Namespace::Provisioner => NamespaceKind::Provisioner,
            Namespace::Function => NamespaceKind::Function,
            Namespace::Backend => NamespaceKind::Backend,
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind())
    }
}

impl std::str::FromStr for Namespace {
    type Err = NamespaceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "provider" => Ok(Namespace::Provider),
            "resource" => Ok(Namespace::Resource),
            "data-source" => Ok(Namespace::DataSource),
            "provisioner" => Ok(Namespace::Provisioner),
            "function" => Ok(Namespace::Function),
            "backend" => Ok(Namespace::Backend),
            _ => Err(NamespaceParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized namespace or type hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceParseError(pub String);

impl std::fmt::Display for NamespaceParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unexpected type {}", self.0)
    }
}

impl std::error::Error for NamespaceParseError {}

/// Caller-supplied restriction on which namespace to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeHint {
    /// Run the fallback cascade.
    #[default]
    Any,
    /// Probe exactly one namespace.
    Only(Namespace),
}

impl std::str::FromStr for TypeHint {
    type Err = NamespaceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("any") {
            return Ok(TypeHint::Any);
        }
        s.parse().map(TypeHint::Only)
    }
}

impl std::fmt::Display for TypeHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeHint::Any => write!(f, "any"),
            TypeHint::Only(ns) => write!(f, "{}", ns),
        }
    }
}
