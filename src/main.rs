//! pkgsplit CLI - split a compiled source tree into publishable packages
//!
//! Usage: pkgsplit <COMMAND>
//!
//! Commands:
//!   build   Split the emitted tree into packages
//!   plan    Print the planned changes as JSON

mod cli;
mod commands;

use std::io;

use anyhow::Result;
use clap::Parser;
use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

/// Log filter: `PKGSPLIT_LOG`, then `RUST_LOG`, then the verbosity flag
fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = std::env::var("PKGSPLIT_LOG")
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Build {
            project,
            dry_run,
            no_ignore_list,
        } => commands::build::cmd_build(project, *dry_run, *no_ignore_list, cli.json),
        Commands::Plan { project } => commands::plan::cmd_plan(project),
    }
}
