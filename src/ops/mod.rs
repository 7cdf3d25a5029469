//! High-level operations.
//!
//! Probing individual registries, orchestrating the fallback cascade, and
//! rendering the resulting envelope.

pub mod format;
pub mod probe;
pub mod resolve;

pub use format::{render, FormatError, FormatOptions, OutputFormat};
pub use probe::{ProbeOutcome, Prober};
pub use resolve::{resolve, Cascade, CascadeStep, SchemaResolver};
