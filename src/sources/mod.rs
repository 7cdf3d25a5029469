//! Plugin sources.
//!
//! Catalog files stand in for installed plugins: they are read once at
//! startup and turned into a [`crate::registry::Registries`] snapshot.

pub mod catalog;

pub use catalog::{Catalog, CatalogError, CatalogProvider};
