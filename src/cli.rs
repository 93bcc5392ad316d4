use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// pkgsplit - split a compiled source tree into publishable packages
#[derive(Parser, Debug)]
#[command(name = "pkgsplit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print a JSON summary instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the project lives and how it is configured
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project directory
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    /// Config file (defaults to <directory>/pkgsplit.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit report written by the compiler step
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Emission root, relative to the project directory
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Worker threads (0 = available parallelism)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split the emitted tree into packages
    Build {
        #[command(flatten)]
        project: ProjectArgs,

        /// Dry run - plan without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Do not write the ignore list
        #[arg(long)]
        no_ignore_list: bool,
    },

    /// Print the planned changes as JSON
    Plan {
        #[command(flatten)]
        project: ProjectArgs,
    },
}
