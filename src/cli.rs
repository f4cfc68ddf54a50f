//! CLI argument parsing for the package workflow.
//!
//! The CLI stays thin: it only routes arguments into the workflow module.
use crate::file_kind::FileKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "server-package",
    version,
    about = "Scaffold server packages and keep their generated defaults current",
    after_help = "Examples:\n  server-package init --root ./mailer\n  server-package update-defaults --dry-run\n  server-package update-defaults --file app --yes\n  server-package update-defaults --yes --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    UpdateDefaults(UpdateDefaultsArgs),
}

impl Command {
    pub fn verbose(&self) -> bool {
        match self {
            Self::Init(args) => args.verbose,
            Self::UpdateDefaults(args) => args.verbose,
        }
    }
}

/// Init command inputs for installing the source scaffold.
#[derive(Parser, Debug)]
#[command(about = "Install the standard source scaffold into an existing package")]
pub struct InitArgs {
    /// Package root containing Package.swift (defaults to the current directory)
    #[arg(long, short = 'r', value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Overwrite existing scaffold files (previous content is backed up)
    #[arg(long)]
    pub force: bool,

    /// Emit debug logging on stderr
    #[arg(long)]
    pub verbose: bool,
}

/// Update command inputs for migrating generated defaults.
#[derive(Parser, Debug)]
#[command(about = "Migrate generated files to the latest templates")]
pub struct UpdateDefaultsArgs {
    /// Package root containing Package.swift (defaults to the current directory)
    #[arg(long, short = 'r', value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Only process these kinds (repeatable; defaults to all)
    #[arg(long = "file", short = 'f', value_enum, value_name = "KIND")]
    pub files: Vec<FileKind>,

    /// Apply every update without prompting
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Report what would change without prompting or writing anything
    #[arg(long, short = 'd')]
    pub dry_run: bool,

    /// Stop after the first kind that fails
    #[arg(long)]
    pub fail_fast: bool,

    /// Print a machine-readable run summary on stdout
    #[arg(long)]
    pub json: bool,

    /// Emit debug logging on stderr
    #[arg(long)]
    pub verbose: bool,
}
