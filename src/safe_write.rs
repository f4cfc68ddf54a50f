//! Crash-safe file writes with rotated backups.
//!
//! New content is staged in a temporary file beside the target and renamed
//! over it, so the target is never observed half-written. When an existing
//! file is replaced, a copy of it lands in a bounded backup family first.
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Replace an existing target instead of failing with `AlreadyExists`.
    pub override_existing: bool,
    pub make_backup_on_override: bool,
    /// Treat an existing whitespace-only target as absent.
    pub whitespace_only_is_blank: bool,
    pub backup_suffix: String,
    /// Keep older backups by appending `.<epoch-millis>` instead of overwriting.
    pub add_timestamp_if_backup_exists: bool,
    pub create_intermediate_directories: bool,
    pub atomic: bool,
    /// Place backups in `backup_directory_name` rather than beside the target.
    pub create_backup_directory: bool,
    pub backup_directory_name: String,
    pub backup_set_prefix: String,
    /// Upper bound on backups per family; `None` keeps all of them.
    pub max_backup_sets: Option<usize>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            override_existing: false,
            make_backup_on_override: true,
            whitespace_only_is_blank: false,
            backup_suffix: ".bak".to_string(),
            add_timestamp_if_backup_exists: true,
            create_intermediate_directories: true,
            atomic: true,
            create_backup_directory: true,
            backup_directory_name: "safe-file-backups".to_string(),
            backup_set_prefix: String::new(),
            max_backup_sets: Some(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub target_path: PathBuf,
    pub backup_created: bool,
    pub backup_path: Option<PathBuf>,
    /// Backups deleted to keep the family within `max_backup_sets`.
    pub evicted: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("{} already exists and overriding is disabled", .path.display())]
    AlreadyExists { path: PathBuf },
    #[error("failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_error<'a>(
    action: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> WriteError + 'a {
    move |source| WriteError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

type Publish = fn(NamedTempFile, &Path) -> io::Result<()>;

fn persist_temp(temp: NamedTempFile, target: &Path) -> io::Result<()> {
    temp.persist(target).map(|_| ()).map_err(|err| err.error)
}

/// Write `content` to `target` according to `options`.
///
/// On failure the previous target content is left in place.
pub fn write_file(
    target: &Path,
    content: &str,
    options: &WriteOptions,
) -> Result<WriteOutcome, WriteError> {
    write_with_publish(target, content, options, persist_temp)
}

fn write_with_publish(
    target: &Path,
    content: &str,
    options: &WriteOptions,
    publish: Publish,
) -> Result<WriteOutcome, WriteError> {
    let parent = parent_dir(target);
    if options.create_intermediate_directories {
        fs::create_dir_all(parent).map_err(io_error("create directory", parent))?;
    }

    let exists = target.exists();
    let blank = exists && options.whitespace_only_is_blank && is_blank_file(target)?;
    if exists && !blank && !options.override_existing {
        return Err(WriteError::AlreadyExists {
            path: target.to_path_buf(),
        });
    }

    let backup = if exists && !blank && options.make_backup_on_override {
        let backup = create_backup(target, options)?;
        tracing::info!(target = %target.display(), backup = %backup.path.display(), "backed up previous content");
        Some(backup)
    } else {
        None
    };

    let published = if options.atomic {
        publish_atomic(target, content, exists, publish)
    } else {
        fs::write(target, content.as_bytes()).map_err(io_error("write", target))
    };
    if let Err(err) = published {
        // The target still holds what the backup copied, so a fresh backup is redundant.
        if let Some(backup) = backup.as_ref().filter(|backup| backup.fresh) {
            discard_backup(&backup.path);
        }
        return Err(err);
    }
    tracing::info!(target = %target.display(), bytes = content.len(), "wrote file");

    // Eviction waits for a successful publish so a failed write never costs an older backup.
    let evicted = match &backup {
        Some(backup) => rotate_backups(target, &backup.path, options)?,
        None => Vec::new(),
    };

    Ok(WriteOutcome {
        target_path: target.to_path_buf(),
        backup_created: backup.is_some(),
        backup_path: backup.map(|backup| backup.path),
        evicted,
    })
}

/// Copy `target` into its backup family without touching the target itself.
///
/// Used before deleting a file outright; the family is rotated as for writes.
pub fn back_up_file(target: &Path, options: &WriteOptions) -> Result<PathBuf, WriteError> {
    let backup = create_backup(target, options)?;
    rotate_backups(target, &backup.path, options)?;
    tracing::info!(target = %target.display(), backup = %backup.path.display(), "backed up file");
    Ok(backup.path)
}

fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn is_blank_file(path: &Path) -> Result<bool, WriteError> {
    let bytes = fs::read(path).map_err(io_error("read", path))?;
    Ok(bytes.iter().all(u8::is_ascii_whitespace))
}

fn publish_atomic(
    target: &Path,
    content: &str,
    keep_permissions: bool,
    publish: Publish,
) -> Result<(), WriteError> {
    let parent = parent_dir(target);
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "staged".to_string());
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(io_error("create temporary file in", parent))?;
    temp.write_all(content.as_bytes())
        .and_then(|()| temp.as_file().sync_all())
        .map_err(io_error("write temporary file for", target))?;
    if keep_permissions {
        let permissions = fs::metadata(target)
            .map_err(io_error("read metadata of", target))?
            .permissions();
        fs::set_permissions(temp.path(), permissions)
            .map_err(io_error("set permissions for", target))?;
    }
    publish(temp, target).map_err(io_error("publish", target))
}

/// Directory holding the backup family for `target`.
pub fn backup_dir(target: &Path, options: &WriteOptions) -> PathBuf {
    let parent = parent_dir(target);
    if options.create_backup_directory {
        parent.join(&options.backup_directory_name)
    } else {
        parent.to_path_buf()
    }
}

/// Base backup name: `<prefix><filename><suffix>`.
pub fn backup_base_name(target: &Path, options: &WriteOptions) -> String {
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "{}{}{}",
        options.backup_set_prefix, file_name, options.backup_suffix
    )
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

/// A backup just taken; `fresh` is false when it overwrote an older one in place.
struct NewBackup {
    path: PathBuf,
    fresh: bool,
}

fn create_backup(target: &Path, options: &WriteOptions) -> Result<NewBackup, WriteError> {
    let dir = backup_dir(target, options);
    fs::create_dir_all(&dir).map_err(io_error("create backup directory", &dir))?;
    let base = backup_base_name(target, options);
    let newest_stamp = backup_family(target, options)?
        .into_iter()
        .map(|entry| entry.stamp)
        .max();
    // Stamps only ever grow, so they settle ties between equal modification times.
    let path = match newest_stamp {
        Some((newest_millis, newest_counter)) if options.add_timestamp_if_backup_exists => {
            let now = epoch_millis();
            if now > newest_millis {
                dir.join(format!("{base}.{now}"))
            } else {
                dir.join(format!("{base}.{newest_millis}-{}", newest_counter + 1))
            }
        }
        _ => dir.join(&base),
    };
    let fresh = !path.exists();
    fs::copy(target, &path).map_err(io_error("back up", target))?;
    Ok(NewBackup { path, fresh })
}

fn discard_backup(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        tracing::warn!(backup = %path.display(), error = %err, "failed to discard unused backup");
    }
}

/// Name stamp inside a family: `(epoch-millis, counter)`, the bare name lowest.
fn family_rank(name: &str, base: &str) -> Option<(u128, u32)> {
    if name == base {
        return Some((0, 0));
    }
    let stamp = name.strip_prefix(base)?.strip_prefix('.')?;
    let (millis, counter) = match stamp.split_once('-') {
        Some((millis, counter)) => (millis, counter.parse().ok()?),
        None => (stamp, 0),
    };
    Some((millis.parse().ok()?, counter))
}

/// One backup on disk; field order is the age order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct BackupEntry {
    modified: SystemTime,
    stamp: (u128, u32),
    path: PathBuf,
}

fn backup_family(target: &Path, options: &WriteOptions) -> Result<Vec<BackupEntry>, WriteError> {
    let dir = backup_dir(target, options);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let base = backup_base_name(target, options);
    let mut family = Vec::new();
    for entry in fs::read_dir(&dir).map_err(io_error("list backups in", &dir))? {
        let entry = entry.map_err(io_error("list backups in", &dir))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(stamp) = family_rank(&name, &base) else {
            continue;
        };
        let path = entry.path();
        let metadata = fs::metadata(&path).map_err(io_error("read metadata of", &path))?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata
            .modified()
            .map_err(io_error("read modification time of", &path))?;
        family.push(BackupEntry {
            modified,
            stamp,
            path,
        });
    }
    family.sort();
    Ok(family)
}

/// Existing backups of `target`, oldest modification time first.
pub fn list_backups(target: &Path, options: &WriteOptions) -> Result<Vec<PathBuf>, WriteError> {
    Ok(backup_family(target, options)?
        .into_iter()
        .map(|entry| entry.path)
        .collect())
}

/// Evict the oldest backups beyond `max_backup_sets`. `keep` is the backup
/// just taken and is never a candidate.
fn rotate_backups(
    target: &Path,
    keep: &Path,
    options: &WriteOptions,
) -> Result<Vec<PathBuf>, WriteError> {
    let Some(max) = options.max_backup_sets else {
        return Ok(Vec::new());
    };
    let backups = list_backups(target, options)?;
    let excess = backups.len().saturating_sub(max);
    let mut evicted = Vec::with_capacity(excess);
    for path in backups.into_iter().filter(|path| path != keep).take(excess) {
        fs::remove_file(&path).map_err(io_error("evict backup", &path))?;
        tracing::info!(backup = %path.display(), "evicted old backup");
        evicted.push(path);
    }
    Ok(evicted)
}
