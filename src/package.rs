//! Package layout resolution.
//!
//! Generated files live in `Sources/<package name>/`, where the name is read
//! from the package manifest.
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const MANIFEST_FILE_NAME: &str = "Package.swift";

fn package_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"name:\s*"([^"]+)""#).expect("regex for package name"))
}

/// Resolve the package root, defaulting to the current directory.
pub fn resolve_package_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => env::current_dir().context("resolve current directory")?,
    };
    root.canonicalize()
        .with_context(|| format!("resolve package root {}", root.display()))
}

/// Typed paths into a package layout.
#[derive(Debug, Clone)]
pub struct PackagePaths {
    root: PathBuf,
    name: String,
}

impl PackagePaths {
    /// Read the package name from the manifest under `root`.
    pub fn detect(root: PathBuf) -> Result<Self> {
        let manifest = root.join(MANIFEST_FILE_NAME);
        let contents = fs::read_to_string(&manifest)
            .with_context(|| format!("read {}", manifest.display()))?;
        let name = detect_package_name(&contents).ok_or_else(|| {
            anyhow!(
                "could not detect package name in {}",
                manifest.display()
            )
        })?;
        Ok(Self { root, name })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the `Sources/<name>/` directory holding generated files.
    pub fn source_dir(&self) -> PathBuf {
        self.root.join("Sources").join(&self.name)
    }
}

/// First `name: "..."` value in a package manifest.
pub fn detect_package_name(manifest: &str) -> Option<String> {
    package_name_pattern()
        .captures(manifest)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
}
