//! Workflow orchestration for the package commands.
//!
//! `init` lays down the scaffold once; `update-defaults` keeps the generated
//! files in step with the template history afterwards.
mod init;
mod update;

pub(crate) use init::run_init;
pub(crate) use update::run_update_defaults;
