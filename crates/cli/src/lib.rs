//! Command-line surface for the specification compiler.
//!
//! Commands load documents, hand them to `specgen-core` and write the result.
//! Each command returns a process exit code.

#![forbid(unsafe_code)]
#![deny(warnings, unused_must_use, dead_code, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;
mod common;

/// Prefix shared by every crate of the workspace, used as the log target.
const LOG_TARGET: &str = "specgen";

#[derive(Parser)]
#[command(
    name = "specgen",
    version,
    about = "Compile OpenAPI documents into templated server code"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge documents into one and print it as YAML
    Merge(commands::merge::MergeArgs),
    /// Compile documents and print the IR as JSON
    Compile(commands::compile::CompileArgs),
    /// Compile documents and render a template with the IR
    Render(commands::render::RenderArgs),
}

/// Parse `args` (including the program name) and run the selected command.
pub fn run(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Merge(args)) => commands::merge::run(args),
            Some(Commands::Compile(args)) => commands::compile::run(args),
            Some(Commands::Render(args)) => commands::render::run(args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Install the stderr log subscriber.
///
/// SPECGEN_LOG takes a plain level ("debug") or a full filter spec
/// ("specgen_core=trace,specgen_cli=info").
pub fn init_tracing() {
    let filter = match std::env::var("SPECGEN_LOG") {
        Ok(level) if is_plain_level(&level) => format!("{LOG_TARGET}={level}"),
        Ok(spec) => spec,
        Err(_) => format!("{LOG_TARGET}=info"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_levels() {
        assert!(is_plain_level("debug"));
        assert!(is_plain_level("WARN"));
        assert!(!is_plain_level("specgen_core=trace"));
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
