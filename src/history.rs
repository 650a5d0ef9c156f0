//! Append-only audit log of executed actions.
//!
//! ```text
//! [2026-10-18 14:02:11] install_repo rc=0
//!   sudo pacman -S --needed --noconfirm git
//!
//! ```
//!
//! The file holds the newest block last; [`HistoryLog::parse`] returns the
//! newest first.

use crate::error::{PickerError, Result};
use fs2::FileExt;
use regex::Regex;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const DEFAULT_PARSE_LIMIT: usize = 500;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(.*?)\]\s+(\w+)\s+rc=(-?\d+)").expect("Invalid regex pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub action: String,
    pub rc: i32,
    pub commands: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one block. Earlier blocks are never touched.
    pub fn append(&self, action: &str, commands: &[String], rc: i32) -> Result<()> {
        if action.is_empty() || !action.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(PickerError::HistoryCorrupt(format!(
                "action name {:?} cannot be parsed back",
                action
            )));
        }

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| PickerError::IoError {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let block = render_block(
            &chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            action,
            commands,
            rc,
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PickerError::IoError {
                path: self.path.clone(),
                source: e,
            })?;

        file.lock_exclusive()?;
        let written = file.write_all(block.as_bytes()).and_then(|()| file.sync_data());
        let _ = FileExt::unlock(&file);
        written?;

        tracing::debug!(action, rc, "history entry appended");
        Ok(())
    }

    /// Up to `max` of the most recent entries, newest first. A missing file
    /// is an empty history; unparsable blocks are skipped.
    pub fn parse(&self, max: usize) -> Result<Vec<HistoryEntry>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PickerError::IoError {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        Ok(parse_text(&text, max))
    }
}

fn render_block(timestamp: &str, action: &str, commands: &[String], rc: i32) -> String {
    let mut block = format!("[{}] {} rc={}\n", timestamp, action, rc);
    for cmd in commands {
        // a newline inside a command would split the block
        let line = cmd.replace(['\r', '\n'], " ");
        block.push_str("  ");
        block.push_str(line.trim_end());
        block.push('\n');
    }
    block.push('\n');
    block
}

fn parse_text(text: &str, max: usize) -> Vec<HistoryEntry> {
    let blocks: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();
    let start = blocks.len().saturating_sub(max);

    let mut entries: Vec<HistoryEntry> = blocks[start..]
        .iter()
        .filter_map(|block| {
            let mut lines = block.lines();
            let header = lines.next()?.trim();
            let Some(caps) = HEADER.captures(header) else {
                tracing::debug!("{}", PickerError::HistoryCorrupt(header.to_string()));
                return None;
            };
            let rc = caps[3].parse().ok()?;
            Some(HistoryEntry {
                timestamp: caps[1].to_string(),
                action: caps[2].to_string(),
                rc,
                commands: lines
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from)
                    .collect(),
            })
        })
        .collect();

    entries.reverse();
    entries
}
