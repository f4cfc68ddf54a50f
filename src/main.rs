//! `server-package` command line entrypoint.
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod config;
mod console;
mod diff;
mod file_kind;
mod matcher;
mod package;
mod safe_write;
mod templates;
mod util;
mod workflow;

use cli::{Command, RootArgs};

const LOG_ENV: &str = "SERVER_PACKAGE_LOG";

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let args = RootArgs::parse();
    init_tracing(args.command.verbose());

    match &args.command {
        Command::Init(args) => workflow::run_init(args),
        Command::UpdateDefaults(args) => workflow::run_update_defaults(args),
    }
}
