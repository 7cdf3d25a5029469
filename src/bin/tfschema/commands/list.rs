//! `tfschema list` command
//!
//! Shorthand for `show provisioners` and `show functions`.

use anyhow::Result;

use crate::cli::ListArgs;

pub fn execute(args: ListArgs, no_color: bool) -> Result<i32> {
    super::query(
        args.what.identifier(),
        "any",
        &args.output,
        &args.catalogs.catalogs,
        no_color,
    )
}
