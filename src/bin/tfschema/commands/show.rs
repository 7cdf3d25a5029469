//! `tfschema show` command

use anyhow::Result;

use crate::cli::ShowArgs;

pub fn execute(args: ShowArgs, no_color: bool) -> Result<i32> {
    super::query(
        &args.name,
        &args.type_hint,
        &args.output,
        &args.catalogs.catalogs,
        no_color,
    )
}
