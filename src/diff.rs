//! Line-oriented diff between a generated file and a template body.
//!
//! Lines are split on `\n` only, so trailing empty lines and `\r` bytes stay
//! significant. The result keeps context lines so the new text can be
//! rebuilt from it, but an unchanged pair yields an empty diff.
use similar::{capture_diff_slices, Algorithm, ChangeTag};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    Context,
    Removed,
    Added,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: LineTag,
    pub text: String,
}

/// Annotated line sequence plus the labels used for its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDiff {
    pub old_label: String,
    pub new_label: String,
    pub lines: Vec<DiffLine>,
}

impl TextDiff {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn count(&self, tag: LineTag) -> usize {
        self.lines.iter().filter(|line| line.tag == tag).count()
    }

    /// Rebuild the new side: context and added lines, in order.
    pub fn new_text(&self) -> String {
        self.side(LineTag::Added)
    }

    /// Rebuild the old side: context and removed lines, in order.
    pub fn old_text(&self) -> String {
        self.side(LineTag::Removed)
    }

    fn side(&self, keep: LineTag) -> String {
        self.lines
            .iter()
            .filter(|line| line.tag == LineTag::Context || line.tag == keep)
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render with a `---`/`+++` header and a fixed-width marker per line.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        let _ = writeln!(out, "--- {}", self.old_label);
        let _ = writeln!(out, "+++ {}", self.new_label);
        for line in &self.lines {
            let marker = match line.tag {
                LineTag::Context => "   ",
                LineTag::Removed => " - ",
                LineTag::Added => " + ",
            };
            let _ = writeln!(out, "{marker}{}", line.text);
        }
        out
    }
}

fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').collect()
}

pub fn diff_lines(old: &str, new: &str, old_label: &str, new_label: &str) -> TextDiff {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let ops = capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines);

    let mut lines = Vec::with_capacity(old_lines.len().max(new_lines.len()));
    let mut changed = false;
    for op in &ops {
        for change in op.iter_changes(&old_lines, &new_lines) {
            let tag = match change.tag() {
                ChangeTag::Equal => LineTag::Context,
                ChangeTag::Delete => LineTag::Removed,
                ChangeTag::Insert => LineTag::Added,
            };
            changed |= tag != LineTag::Context;
            lines.push(DiffLine {
                tag,
                text: change.value().to_string(),
            });
        }
    }
    if !changed {
        lines.clear();
    }

    TextDiff {
        old_label: old_label.to_string(),
        new_label: new_label.to_string(),
        lines,
    }
}
