//! Terminal-facing collaborators: confirmation prompts and report output.
//!
//! The migration workflow only sees the `DecisionSource` and `OutputSink`
//! traits, so it can run without a terminal.
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Apply,
    Skip,
}

/// What the user is being asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Write the latest template to `target_name`, possibly moving it off a legacy name.
    Apply {
        target_name: String,
        source_name: String,
        is_rename: bool,
    },
    /// Delete a legacy file superseded by the canonical one.
    RemoveLegacy { path: PathBuf },
}

impl Prompt {
    pub fn question(&self) -> String {
        match self {
            Self::Apply {
                target_name,
                source_name,
                is_rename: false,
            } if target_name == source_name => format!("Apply changes to {target_name}?"),
            Self::Apply {
                target_name,
                source_name,
                ..
            } => format!("Apply changes and write to {target_name} (from {source_name})?"),
            Self::RemoveLegacy { path } => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                format!("Remove {name}?")
            }
        }
    }
}

pub trait DecisionSource {
    fn decide(&mut self, prompt: &Prompt) -> io::Result<Decision>;
}

/// Approves every prompt (`--yes`).
#[derive(Debug, Default)]
pub struct AssumeYes;

impl DecisionSource for AssumeYes {
    fn decide(&mut self, _prompt: &Prompt) -> io::Result<Decision> {
        Ok(Decision::Apply)
    }
}

/// Writes the question to `prompts` and reads one line; only `y`/`yes` approves.
pub struct StdinDecisions<R, W> {
    input: R,
    prompts: W,
}

impl<W: Write> StdinDecisions<io::StdinLock<'static>, W> {
    /// Read answers from stdin, asking on `prompts` (stderr when stdout is reserved).
    pub fn from_stdin(prompts: W) -> Self {
        Self::new(io::stdin().lock(), prompts)
    }
}

impl<R: BufRead, W: Write> StdinDecisions<R, W> {
    pub fn new(input: R, prompts: W) -> Self {
        Self { input, prompts }
    }
}

impl<R: BufRead, W: Write> DecisionSource for StdinDecisions<R, W> {
    fn decide(&mut self, prompt: &Prompt) -> io::Result<Decision> {
        write!(self.prompts, "{} (y/N): ", prompt.question())?;
        self.prompts.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(parse_answer(&line))
    }
}

pub fn parse_answer(line: &str) -> Decision {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Decision::Apply,
        _ => Decision::Skip,
    }
}

/// Destination for human-readable progress messages.
pub trait OutputSink {
    fn line(&mut self, text: &str);

    fn blank(&mut self) {
        self.line("");
    }
}

/// Prints messages to stdout.
#[derive(Debug, Default)]
pub struct Stdout;

impl OutputSink for Stdout {
    fn line(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Prints messages to stderr, keeping stdout free for machine-readable output.
#[derive(Debug, Default)]
pub struct Stderr;

impl OutputSink for Stderr {
    fn line(&mut self, text: &str) {
        eprintln!("{text}");
    }
}

/// Captures messages in memory.
impl OutputSink for Vec<String> {
    fn line(&mut self, text: &str) {
        self.push(text.to_string());
    }
}
