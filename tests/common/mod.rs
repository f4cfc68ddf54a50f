//! Shared test infrastructure for integration tests.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};
use tempfile::TempDir;

#[allow(dead_code)]
pub const STATE_V1: &str = include_str!("../../templates/state/v1.swift");
pub const STATE_LATEST: &str = include_str!("../../templates/state/latest.swift");
#[allow(dead_code)]
pub const APP_V3: &str = include_str!("../../templates/app/v3.swift");
pub const APP_LATEST: &str = include_str!("../../templates/app/latest.swift");

/// A throwaway package with a manifest and an empty source directory.
pub struct PackageFixture {
    _temp: TempDir,
    root: PathBuf,
    name: String,
}

/// Captured result of one `server-package` invocation.
#[derive(Debug)]
pub struct RunResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for RunResult {
    fn from(output: Output) -> Self {
        Self {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl PackageFixture {
    pub fn new(name: &str) -> anyhow::Result<Self> {
        let temp = TempDir::new()?;
        let root = temp.path().join(name);
        fs::create_dir_all(root.join("Sources").join(name))?;
        fs::write(
            root.join("Package.swift"),
            format!(
                "// swift-tools-version: 5.9\nimport PackageDescription\n\nlet package = Package(\n    name: \"{name}\",\n    targets: [.executableTarget(name: \"{name}\")]\n)\n"
            ),
        )?;
        Ok(Self {
            _temp: temp,
            root,
            name: name.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join("Sources").join(&self.name)
    }

    pub fn write_source(&self, rel: &str, contents: &str) -> anyhow::Result<PathBuf> {
        let path = self.source_dir().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_source(&self, rel: &str) -> anyhow::Result<String> {
        Ok(fs::read_to_string(self.source_dir().join(rel))?)
    }

    /// Backups currently stored for generated files, sorted by name.
    #[allow(dead_code)]
    pub fn backups(&self) -> anyhow::Result<Vec<String>> {
        let dir = self.source_dir().join("safe-file-backups");
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = fs::read_dir(dir)?
            .map(|entry| Ok(entry?.file_name().to_string_lossy().into_owned()))
            .collect::<anyhow::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    /// Run the binary against this package with stdin closed.
    pub fn run(&self, args: &[&str]) -> anyhow::Result<RunResult> {
        self.run_with_input(args, "")
    }

    /// Run the binary against this package, feeding `input` on stdin.
    pub fn run_with_input(&self, args: &[&str], input: &str) -> anyhow::Result<RunResult> {
        let mut child = Command::new(env!("CARGO_BIN_EXE_server-package"))
            .args(args)
            .arg("--root")
            .arg(&self.root)
            .env_remove("SERVER_PACKAGE_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes())?;
        }
        Ok(child.wait_with_output()?.into())
    }
}
