//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use tfschema::ops::{FormatOptions, OutputFormat};
use tfschema::util::{ColorChoice, Config};

/// tfschema - show the schema of providers, resources, data sources,
/// provisioners, functions and backends
#[derive(Parser)]
#[command(name = "tfschema")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the schema of a named entity
    Show(ShowArgs),

    /// List provisioner names or every interpolation function
    List(ListArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ShowArgs {
    /// Identifier to look up (e.g. `aws`, `aws_instance`, `upper`, `functions`)
    pub name: String,

    /// Restrict the lookup to one kind: provider, resource, data-source,
    /// provisioner, function, backend (or `any`)
    #[arg(short = 't', long = "type", value_name = "KIND", default_value = "any")]
    pub type_hint: String,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub catalogs: CatalogArgs,
}

#[derive(Args)]
pub struct ListArgs {
    /// What to list
    #[arg(value_enum)]
    pub what: ListKind,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub catalogs: CatalogArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ListKind {
    Provisioners,
    Functions,
}

impl ListKind {
    /// The meta-query identifier this listing maps to.
    pub fn identifier(&self) -> &'static str {
        match self {
            ListKind::Provisioners => "provisioners",
            ListKind::Functions => "functions",
        }
    }
}

#[derive(Args)]
pub struct OutputArgs {
    /// Output JSON
    #[arg(long, conflicts_with = "xml")]
    pub json: bool,

    /// Output XML (not supported)
    #[arg(long)]
    pub xml: bool,

    /// Indent nested output
    #[arg(long)]
    pub indent: bool,
}

impl OutputArgs {
    /// Combine flags with configured defaults; flags win.
    pub fn format_options(&self, config: &Config, no_color: bool) -> FormatOptions {
        let format = if self.json {
            OutputFormat::Json
        } else if self.xml {
            OutputFormat::Xml
        } else {
            config.output.format.unwrap_or_default()
        };

        let indent = self.indent || config.output.indent.unwrap_or(false);
        let color = !no_color && config.output.color.unwrap_or(ColorChoice::Auto).for_stdout();

        FormatOptions::new(format)
            .with_indent(indent)
            .with_color(color)
    }
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Additional plugin catalog (repeatable)
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalogs: Vec<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
