//! Versioned template catalog.
//!
//! History is append-only: a new revision moves the current latest body into
//! `previous` under the next version number, then replaces latest. Assigned
//! versions are never edited.
use crate::file_kind::FileKind;
use crate::templates;
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;

pub type TemplateVersion = u32;

/// Template history for a single file kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    previous: BTreeMap<TemplateVersion, String>,
    latest: String,
}

impl TemplateSet {
    /// Build a set, rejecting version 0 and duplicate version numbers.
    pub fn new<'a>(
        previous: impl IntoIterator<Item = (TemplateVersion, &'a str)>,
        latest: &str,
    ) -> Result<Self> {
        let mut history = BTreeMap::new();
        for (version, body) in previous {
            if version == 0 {
                return Err(anyhow!("template versions start at 1"));
            }
            if history.insert(version, body.to_string()).is_some() {
                return Err(anyhow!("duplicate template version {version}"));
            }
        }
        Ok(Self {
            previous: history,
            latest: latest.to_string(),
        })
    }

    pub fn previous(&self) -> &BTreeMap<TemplateVersion, String> {
        &self.previous
    }

    pub fn latest(&self) -> &str {
        &self.latest
    }

    /// Version number assigned to `latest`: one past the newest historical body.
    pub fn latest_version(&self) -> TemplateVersion {
        self.previous.keys().next_back().copied().unwrap_or(0) + 1
    }
}

/// Lookup failure for a kind the catalog has no history for.
#[derive(Debug, thiserror::Error)]
#[error("no template history registered for {kind}")]
pub struct MissingTemplates {
    pub kind: FileKind,
}

/// Immutable mapping from file kind to template history.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    sets: BTreeMap<FileKind, TemplateSet>,
}

impl TemplateCatalog {
    /// Catalog of every template revision shipped with this binary.
    pub fn builtin() -> Result<Self> {
        let state = TemplateSet::new(
            [(1, templates::STATE_V1_SWIFT), (2, templates::STATE_V2_SWIFT)],
            templates::STATE_LATEST_SWIFT,
        )?;
        let app = TemplateSet::new(
            [
                (1, templates::APP_V1_SWIFT),
                (2, templates::APP_V2_SWIFT),
                (3, templates::APP_V3_SWIFT),
            ],
            templates::APP_LATEST_SWIFT,
        )?;
        Ok(Self::default()
            .with_set(FileKind::State, state)
            .with_set(FileKind::App, app))
    }

    /// Register the history for one kind, replacing any earlier registration.
    pub fn with_set(mut self, kind: FileKind, set: TemplateSet) -> Self {
        self.sets.insert(kind, set);
        self
    }

    pub fn lookup(&self, kind: FileKind) -> Result<&TemplateSet, MissingTemplates> {
        self.sets.get(&kind).ok_or(MissingTemplates { kind })
    }
}
