//! Command implementations

pub mod completions;
pub mod list;
pub mod show;

use std::path::PathBuf;

use anyhow::Result;

use tfschema::ops::{render, SchemaResolver};
use tfschema::util::context::CATALOG_ENV;
use tfschema::util::GlobalContext;

use crate::cli::OutputArgs;

/// Resolve one identifier, print the rendered envelope and return the exit
/// status it calls for.
pub(crate) fn query(
    name: &str,
    hint: &str,
    output: &OutputArgs,
    catalogs: &[PathBuf],
    no_color: bool,
) -> Result<i32> {
    let ctx = GlobalContext::new()?;
    if let Some(project) = ctx.project_dir() {
        tracing::debug!("using project directory {}", project.display());
    }
    let env = std::env::var_os(CATALOG_ENV);
    let paths = ctx.catalog_paths(env.as_deref(), catalogs);
    let registries = ctx.load_registries(&paths)?;

    let envelope = SchemaResolver::new(&registries).resolve(name, hint);
    let opts = output.format_options(ctx.config(), no_color);
    let rendered = render(&envelope, &opts)?;
    println!("{}", rendered);

    Ok(envelope.exit_code())
}
