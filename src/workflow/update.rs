//! Migration of generated defaults to the latest templates.
//!
//! Each file kind goes through the same sequence: resolve the file on disk,
//! detect which template version produced it, diff against the latest
//! template, report, ask for a decision and write. Kinds are handled one at a
//! time; a failure in one kind does not stop the others unless fail-fast is
//! requested.
use crate::catalog::{MissingTemplates, TemplateCatalog, TemplateVersion};
use crate::cli::UpdateDefaultsArgs;
use crate::config::load_config;
use crate::console::{
    AssumeYes, Decision, DecisionSource, OutputSink, Prompt, Stderr, StdinDecisions, Stdout,
};
use crate::diff::{diff_lines, LineTag, TextDiff};
use crate::file_kind::{select_kinds, FileKind};
use crate::matcher::match_version;
use crate::package::{resolve_package_root, PackagePaths};
use crate::safe_write::{back_up_file, write_file, WriteError, WriteOptions};
use crate::util::file_name;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: WriteError,
    },
    #[error(transparent)]
    CatalogMismatch(#[from] MissingTemplates),
    #[error("failed to read confirmation")]
    Decision(#[source] io::Error),
}

/// Everything a single kind's migration needs besides the collaborators.
#[derive(Debug, Clone, Copy)]
pub struct MigrationContext<'a> {
    pub catalog: &'a TemplateCatalog,
    pub source_dir: &'a Path,
    pub write_options: &'a WriteOptions,
    pub dry_run: bool,
}

/// A computed update waiting to be reported and confirmed.
#[derive(Debug, Clone)]
pub struct PendingUpdate<'a> {
    pub existing_path: PathBuf,
    pub target_path: PathBuf,
    pub from_version: Option<TemplateVersion>,
    pub to_version: TemplateVersion,
    pub diff: TextDiff,
    pub latest: &'a str,
}

impl PendingUpdate<'_> {
    /// The file moves off a legacy name onto the canonical one.
    pub fn is_rename(&self) -> bool {
        self.existing_path != self.target_path
    }
}

#[derive(Debug, Clone)]
pub enum Plan<'a> {
    NotFound { searched: PathBuf },
    UpToDate { path: PathBuf, version: TemplateVersion },
    Pending(PendingUpdate<'a>),
}

/// Terminal state reached for one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KindOutcome {
    NotFound {
        searched: PathBuf,
    },
    UpToDate {
        path: PathBuf,
        version: TemplateVersion,
    },
    DryRun {
        target: PathBuf,
        from_version: Option<TemplateVersion>,
        to_version: TemplateVersion,
        is_rename: bool,
    },
    Declined {
        target: PathBuf,
    },
    Applied {
        target: PathBuf,
        from_version: Option<TemplateVersion>,
        to_version: TemplateVersion,
        backup: Option<PathBuf>,
        removed_legacy: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct KindReport {
    pub kind: FileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<KindOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub reports: Vec<KindReport>,
}

impl RunSummary {
    pub fn failures(&self) -> usize {
        self.reports
            .iter()
            .filter(|report| report.error.is_some())
            .count()
    }
}

fn read_text(path: &Path) -> Result<String, MigrationError> {
    let read_error = |source| MigrationError::Read {
        path: path.to_path_buf(),
        source,
    };
    let bytes = fs::read(path).map_err(read_error)?;
    String::from_utf8(bytes)
        .map_err(|err| read_error(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// Resolve, match and diff one kind. Nothing is written.
pub fn plan_kind<'a>(
    catalog: &'a TemplateCatalog,
    kind: FileKind,
    source_dir: &Path,
) -> Result<Plan<'a>, MigrationError> {
    let set = catalog.lookup(kind)?;
    let latest = set.latest();
    let to_version = set.latest_version();

    let Some(existing_path) = kind.resolve_existing(source_dir) else {
        return Ok(Plan::NotFound {
            searched: source_dir.to_path_buf(),
        });
    };
    let target_path = kind.target_path(source_dir);
    tracing::debug!(%kind, existing = %existing_path.display(), "resolved generated file");

    let current = read_text(&existing_path)?;
    let in_place = existing_path == target_path;
    if in_place && current == latest {
        return Ok(Plan::UpToDate {
            path: existing_path,
            version: to_version,
        });
    }

    let (from_version, old_text, old_label) = match match_version(&current, set.previous()) {
        Some((version, body)) => (Some(version), body, format!("template v{version}")),
        None => (None, current.as_str(), "current file".to_string()),
    };
    tracing::debug!(%kind, ?from_version, "matched template history");
    let diff = diff_lines(
        old_text,
        latest,
        &old_label,
        &format!("latest template v{to_version}"),
    );
    debug_assert!(diff.is_empty() || (diff.old_text() == old_text && diff.new_text() == latest));
    tracing::debug!(
        %kind,
        added = diff.count(LineTag::Added),
        removed = diff.count(LineTag::Removed),
        "diffed against latest template"
    );

    if diff.is_empty() && in_place {
        return Ok(Plan::UpToDate {
            path: existing_path,
            version: to_version,
        });
    }

    Ok(Plan::Pending(PendingUpdate {
        existing_path,
        target_path,
        from_version,
        to_version,
        diff,
        latest,
    }))
}

fn report_pending(pending: &PendingUpdate<'_>, out: &mut dyn OutputSink) {
    let existing_name = file_name(&pending.existing_path);
    let target_name = file_name(&pending.target_path);
    out.blank();
    match pending.from_version {
        Some(version) => out.line(&format!(
            "{existing_name}: detected known server-package template v{version} -> v{}",
            pending.to_version
        )),
        None => out.line(&format!(
            "{existing_name}: does not match any known template; diffing against latest template v{}.",
            pending.to_version
        )),
    }

    if pending.diff.is_empty() {
        out.line(&format!(
            "No content changes, but will create {target_name} from {existing_name}."
        ));
        return;
    }
    out.blank();
    for line in pending.diff.render().lines() {
        out.line(line);
    }
    out.blank();
}

/// Run the full sequence for one kind, returning the terminal state reached.
pub fn migrate_kind(
    ctx: &MigrationContext<'_>,
    kind: FileKind,
    decisions: &mut dyn DecisionSource,
    out: &mut dyn OutputSink,
) -> Result<KindOutcome, MigrationError> {
    let pending = match plan_kind(ctx.catalog, kind, ctx.source_dir)? {
        Plan::NotFound { searched } => {
            out.line(&format!(
                "Skipping {kind}: no file found in {}",
                searched.display()
            ));
            return Ok(KindOutcome::NotFound { searched });
        }
        Plan::UpToDate { path, version } => {
            out.line(&format!(
                "Already up to date: {} (v{version})",
                file_name(&path)
            ));
            return Ok(KindOutcome::UpToDate { path, version });
        }
        Plan::Pending(pending) => pending,
    };

    report_pending(&pending, out);
    let existing_name = file_name(&pending.existing_path);
    let target_name = file_name(&pending.target_path);

    if ctx.dry_run {
        out.line(&format!("DRY RUN: no changes written for {target_name}."));
        return Ok(KindOutcome::DryRun {
            target: pending.target_path.clone(),
            from_version: pending.from_version,
            to_version: pending.to_version,
            is_rename: pending.is_rename(),
        });
    }

    let prompt = Prompt::Apply {
        target_name: target_name.clone(),
        source_name: existing_name.clone(),
        is_rename: pending.is_rename(),
    };
    if decisions.decide(&prompt).map_err(MigrationError::Decision)? == Decision::Skip {
        out.line(&format!("Skipping {existing_name}."));
        return Ok(KindOutcome::Declined {
            target: pending.target_path,
        });
    }

    let written = write_file(&pending.target_path, pending.latest, ctx.write_options).map_err(
        |source| MigrationError::Write {
            path: pending.target_path.clone(),
            source,
        },
    )?;
    let backup_note = match &written.backup_path {
        Some(backup) => format!(" Backup: {}", backup.display()),
        None => String::new(),
    };
    match pending.from_version {
        Some(version) => out.line(&format!(
            "Updated {target_name} from v{version} -> v{}.{backup_note}",
            pending.to_version
        )),
        None => out.line(&format!(
            "Updated {target_name} to latest template v{}.{backup_note}",
            pending.to_version
        )),
    }

    let removed_legacy = if kind.is_entrypoint() {
        remove_superseded(kind, &pending.target_path, ctx, decisions, out)
    } else {
        Vec::new()
    };

    Ok(KindOutcome::Applied {
        target: pending.target_path,
        from_version: pending.from_version,
        to_version: pending.to_version,
        backup: written.backup_path,
        removed_legacy,
    })
}

/// Offer to delete legacy entrypoint files now that the canonical one exists.
///
/// A legacy file is copied into its backup family before it is deleted.
/// Best effort: the canonical file is already written, so failures here are
/// reported but do not fail the kind.
fn remove_superseded(
    kind: FileKind,
    target_path: &Path,
    ctx: &MigrationContext<'_>,
    decisions: &mut dyn DecisionSource,
    out: &mut dyn OutputSink,
) -> Vec<PathBuf> {
    let mut removed = Vec::new();
    for legacy in kind.existing_legacy_paths(ctx.source_dir) {
        let legacy_name = file_name(&legacy);
        out.blank();
        out.line(&format!("You now have {}:", file_name(target_path)));
        out.line(&format!("  {}", target_path.display()));
        out.line(&format!("Which means you can remove {legacy_name}:"));
        out.line(&format!("  {}", legacy.display()));
        out.blank();

        let prompt = Prompt::RemoveLegacy {
            path: legacy.clone(),
        };
        match decisions.decide(&prompt) {
            Ok(Decision::Apply) => {
                let backup = match back_up_file(&legacy, ctx.write_options) {
                    Ok(backup) => backup,
                    Err(err) => {
                        let message = format!("{:#}", anyhow::Error::from(err));
                        tracing::warn!(path = %legacy.display(), error = %message, "failed to back up legacy file");
                        out.line(&format!("Keeping {legacy_name}: {message}"));
                        continue;
                    }
                };
                match fs::remove_file(&legacy) {
                    Ok(()) => {
                        tracing::info!(path = %legacy.display(), "removed legacy file");
                        out.line(&format!(
                            "Removed {legacy_name}. Backup: {}",
                            backup.display()
                        ));
                        removed.push(legacy);
                    }
                    Err(err) => {
                        tracing::warn!(path = %legacy.display(), error = %err, "failed to remove legacy file");
                        out.line(&format!("Could not remove {legacy_name}: {err}"));
                    }
                }
            }
            Ok(Decision::Skip) => out.line(&format!("Keeping {legacy_name}.")),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read confirmation");
                out.line(&format!("Keeping {legacy_name}."));
            }
        }
    }
    removed
}

/// Migrate `kinds` in order, collecting every outcome.
///
/// With `fail_fast`, processing stops after the first kind that fails.
pub fn migrate_kinds(
    ctx: &MigrationContext<'_>,
    kinds: &[FileKind],
    fail_fast: bool,
    decisions: &mut dyn DecisionSource,
    out: &mut dyn OutputSink,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for &kind in kinds {
        match migrate_kind(ctx, kind, decisions, out) {
            Ok(outcome) => summary.reports.push(KindReport {
                kind,
                outcome: Some(outcome),
                error: None,
            }),
            Err(err) => {
                let message = format!("{:#}", anyhow::Error::from(err));
                tracing::error!(%kind, error = %message, "migration failed");
                out.line(&format!("error: {kind}: {message}"));
                summary.reports.push(KindReport {
                    kind,
                    outcome: None,
                    error: Some(message),
                });
                if fail_fast {
                    break;
                }
            }
        }
    }
    summary
}

/// Entry point for `update-defaults`.
pub fn run_update_defaults(args: &UpdateDefaultsArgs) -> Result<ExitCode> {
    let root = resolve_package_root(args.root.as_deref())?;
    let config = load_config(&root)?;
    let paths = PackagePaths::detect(root)?;
    let catalog = TemplateCatalog::builtin().context("load template catalog")?;
    let write_options = config.migration_write_options();
    let source_dir = paths.source_dir();
    let kinds = select_kinds(&args.files);

    let ctx = MigrationContext {
        catalog: &catalog,
        source_dir: &source_dir,
        write_options: &write_options,
        dry_run: args.dry_run,
    };
    // With --json, stdout carries only the summary, so prompts move to stderr too.
    let mut decisions: Box<dyn DecisionSource> = match (args.yes, args.json) {
        (true, _) => Box::new(AssumeYes),
        (false, true) => Box::new(StdinDecisions::from_stdin(io::stderr())),
        (false, false) => Box::new(StdinDecisions::from_stdin(io::stdout())),
    };
    let mut out: Box<dyn OutputSink> = if args.json {
        Box::new(Stderr)
    } else {
        Box::new(Stdout)
    };

    let summary = migrate_kinds(
        &ctx,
        &kinds,
        args.fail_fast || config.fail_fast,
        decisions.as_mut(),
        out.as_mut(),
    );

    if args.json {
        let text = serde_json::to_string_pretty(&summary).context("serialize run summary")?;
        println!("{text}");
    }
    if summary.failures() > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
