//! Generated file kinds and their on-disk names.
//!
//! Each kind owns one canonical filename plus any older names it may still
//! be found under, so migration can pick up files generated by earlier
//! releases.
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A category of generated file with its own template history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Process configuration and logger wiring (`state.swift`).
    State,
    /// Process entrypoint (`app.swift`, formerly `runtime.swift`).
    App,
}

impl FileKind {
    /// Every kind, in the order the workflow processes them.
    pub const ALL: [FileKind; 2] = [FileKind::State, FileKind::App];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::App => "app",
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            Self::State => "state.swift",
            Self::App => "app.swift",
        }
    }

    /// Superseded names, checked in order when the canonical file is absent.
    pub fn legacy_filenames(self) -> &'static [&'static str] {
        match self {
            Self::State => &[],
            Self::App => &["runtime.swift"],
        }
    }

    /// Whether this kind holds the process entrypoint.
    pub fn is_entrypoint(self) -> bool {
        matches!(self, Self::App)
    }

    pub fn target_path(self, source_dir: &Path) -> PathBuf {
        source_dir.join(self.filename())
    }

    /// Resolve the file to migrate: canonical name first, then legacy names.
    pub fn resolve_existing(self, source_dir: &Path) -> Option<PathBuf> {
        let primary = self.target_path(source_dir);
        if primary.is_file() {
            return Some(primary);
        }
        self.legacy_filenames()
            .iter()
            .map(|name| source_dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Legacy files that still exist next to the canonical target.
    pub fn existing_legacy_paths(self, source_dir: &Path) -> Vec<PathBuf> {
        self.legacy_filenames()
            .iter()
            .map(|name| source_dir.join(name))
            .filter(|path| path.is_file())
            .collect()
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keep the declared processing order while honoring a user selection.
///
/// An empty selection means every kind.
pub fn select_kinds(selected: &[FileKind]) -> Vec<FileKind> {
    FileKind::ALL
        .into_iter()
        .filter(|kind| selected.is_empty() || selected.contains(kind))
        .collect()
}
