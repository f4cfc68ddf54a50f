//! Package-owned configuration for template migration.
//!
//! The config file is optional; a missing `server-package.json` means every
//! default applies.
use crate::safe_write::WriteOptions;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};

pub const CONFIG_FILE_NAME: &str = "server-package.json";
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub schema_version: u32,
    /// Stop after the first file kind that fails instead of attempting all.
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default)]
    pub backups: BackupConfig,
}

/// Backup layout used when migrated files are overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackupConfig {
    pub directory_name: String,
    pub prefix: String,
    pub suffix: String,
    pub max_sets: usize,
    pub add_timestamp: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory_name: "safe-file-backups".to_string(),
            prefix: "server-defaults_".to_string(),
            suffix: "_previous_version.bak".to_string(),
            max_sets: 10,
            add_timestamp: true,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            fail_fast: false,
            backups: BackupConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Write options for replacing generated defaults with a newer template.
    pub fn migration_write_options(&self) -> WriteOptions {
        WriteOptions {
            override_existing: true,
            make_backup_on_override: true,
            whitespace_only_is_blank: false,
            backup_suffix: self.backups.suffix.clone(),
            add_timestamp_if_backup_exists: self.backups.add_timestamp,
            create_intermediate_directories: true,
            atomic: true,
            create_backup_directory: true,
            backup_directory_name: self.backups.directory_name.clone(),
            backup_set_prefix: self.backups.prefix.clone(),
            max_backup_sets: Some(self.backups.max_sets),
        }
    }

    /// Write options for installing scaffold files into a package.
    pub fn scaffold_write_options(&self, force: bool) -> WriteOptions {
        WriteOptions {
            override_existing: force,
            whitespace_only_is_blank: true,
            ..self.migration_write_options()
        }
    }
}

/// Load `server-package.json` from the package root, falling back to defaults.
pub fn load_config(package_root: &Path) -> Result<ProjectConfig> {
    let path = package_root.join(CONFIG_FILE_NAME);
    if !path.is_file() {
        return Ok(ProjectConfig::default());
    }
    let bytes = fs::read(&path).with_context(|| format!("read config {}", path.display()))?;
    let config: ProjectConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &ProjectConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.backups.max_sets == 0 {
        return Err(anyhow!("backups.max_sets must be at least 1"));
    }
    validate_file_name(&config.backups.directory_name, "backups.directory_name", false)?;
    validate_file_name(&config.backups.suffix, "backups.suffix", false)?;
    validate_file_name(&config.backups.prefix, "backups.prefix", true)?;
    Ok(())
}

fn validate_file_name(value: &str, label: &str, allow_empty: bool) -> Result<()> {
    if value.is_empty() {
        if allow_empty {
            return Ok(());
        }
        return Err(anyhow!("{label} must be non-empty"));
    }
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !value.contains(['/', '\\']) => Ok(()),
        _ => Err(anyhow!("{label} must be a single file name (got {value:?})")),
    }
}
