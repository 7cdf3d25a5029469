//! tfschema CLI - look up plugin and function schemas

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the rendered result.
    let filter = if cli.verbose {
        EnvFilter::new("tfschema=debug")
    } else {
        EnvFilter::new("tfschema=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Show(args) => commands::show::execute(args, cli.no_color),
        Commands::List(args) => commands::list::execute(args, cli.no_color),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
