//! Workflow init step.
//!
//! Init installs the standard source scaffold into an existing package so
//! `update-defaults` has generated files to track from then on.
use crate::catalog::TemplateCatalog;
use crate::cli::InitArgs;
use crate::config::load_config;
use crate::console::{OutputSink, Stdout};
use crate::file_kind::FileKind;
use crate::package::{resolve_package_root, PackagePaths, MANIFEST_FILE_NAME};
use crate::safe_write::{write_file, WriteError, WriteOptions};
use crate::templates;
use crate::util::display_path;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// One file the scaffold places under the package source directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaffoldFile<'a> {
    pub relative_path: &'static str,
    pub body: &'a str,
    /// Migratable kind this file belongs to, if any.
    pub kind: Option<FileKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScaffoldOutcome {
    Written {
        path: PathBuf,
        backup: Option<PathBuf>,
    },
    Kept {
        path: PathBuf,
    },
    /// A legacy file already plays this role; migrating it is left to `update-defaults`.
    Deferred {
        path: PathBuf,
        legacy: PathBuf,
    },
}

/// Scaffold files in install order. Migratable kinds start at their latest template.
pub fn scaffold_files(catalog: &TemplateCatalog) -> Result<Vec<ScaffoldFile<'_>>> {
    let mut files = Vec::new();
    for kind in FileKind::ALL {
        let set = catalog.lookup(kind)?;
        files.push(ScaffoldFile {
            relative_path: kind.filename(),
            body: set.latest(),
            kind: Some(kind),
        });
    }
    files.extend([
        ScaffoldFile {
            relative_path: "routes.swift",
            body: templates::ROUTES_SWIFT,
            kind: None,
        },
        ScaffoldFile {
            relative_path: "objects/model/model.swift",
            body: templates::MODEL_SWIFT,
            kind: None,
        },
        ScaffoldFile {
            relative_path: "objects/operation/operation.swift",
            body: templates::OPERATION_SWIFT,
            kind: None,
        },
    ]);
    Ok(files)
}

/// Write every scaffold file into `source_dir`.
///
/// Files that already exist are kept unless `options.override_existing` is
/// set. An entrypoint still living under a legacy name is never duplicated.
pub fn install_scaffold(
    source_dir: &Path,
    catalog: &TemplateCatalog,
    options: &WriteOptions,
    out: &mut dyn OutputSink,
) -> Result<Vec<ScaffoldOutcome>> {
    let mut outcomes = Vec::new();
    for file in scaffold_files(catalog)? {
        let path = source_dir.join(file.relative_path);
        let shown = display_path(&path, Some(source_dir));

        let legacy = file
            .kind
            .filter(|_| !path.is_file())
            .and_then(|kind| kind.existing_legacy_paths(source_dir).into_iter().next());
        if let Some(legacy) = legacy {
            out.line(&format!(
                "Keeping {} in place of {shown}; run update-defaults to migrate it.",
                display_path(&legacy, Some(source_dir))
            ));
            outcomes.push(ScaffoldOutcome::Deferred { path, legacy });
            continue;
        }

        match write_file(&path, file.body, options) {
            Ok(written) => {
                match &written.backup_path {
                    Some(backup) => out.line(&format!(
                        "wrote {shown} (backup: {})",
                        backup.display()
                    )),
                    None => out.line(&format!("wrote {shown}")),
                }
                outcomes.push(ScaffoldOutcome::Written {
                    path,
                    backup: written.backup_path,
                });
            }
            Err(WriteError::AlreadyExists { .. }) => {
                out.line(&format!("{shown} already exists; keeping it (use --force to overwrite)"));
                outcomes.push(ScaffoldOutcome::Kept { path });
            }
            Err(err) => {
                return Err(err).with_context(|| format!("install {}", path.display()));
            }
        }
    }
    Ok(outcomes)
}

/// Run the init step against an existing package.
pub fn run_init(args: &InitArgs) -> Result<ExitCode> {
    let root = resolve_package_root(args.root.as_deref())?;
    if !root.join(MANIFEST_FILE_NAME).is_file() {
        return Err(anyhow!(
            "{MANIFEST_FILE_NAME} not found in {} (create the package first)",
            root.display()
        ));
    }
    let config = load_config(&root)?;
    let paths = PackagePaths::detect(root)?;
    let catalog = TemplateCatalog::builtin().context("load template catalog")?;
    let options = config.scaffold_write_options(args.force);
    let source_dir = paths.source_dir();
    tracing::debug!(package = paths.name(), source_dir = %source_dir.display(), "installing scaffold");

    let mut out = Stdout;
    let outcomes = install_scaffold(&source_dir, &catalog, &options, &mut out)?;
    let written = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, ScaffoldOutcome::Written { .. }))
        .count();
    out.line(&format!(
        "{}: {written} of {} scaffold files written to {}",
        paths.name(),
        outcomes.len(),
        display_path(&source_dir, Some(paths.root()))
    ));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
