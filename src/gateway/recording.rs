//! In-memory gateway that records calls instead of touching the host.
//!
//! Used by the apply tests and available to embedders that want a dry run.

use super::{CommandGateway, CommandOutput};
use crate::error::Result;
use crate::utils::platform::Elevation;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Vec<String>),
    PrivilegedWrite { path: PathBuf, content: String },
    UserWrite { path: PathBuf, content: String },
}

#[derive(Debug, Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<Invocation>>,
    responses: Vec<(String, CommandOutput)>,
    missing: HashSet<String>,
    elevation: Elevation,
}

impl RecordingGateway {
    /// Every tool present, every command answering `(0, "")`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands whose program (after any elevation prefix) is
    /// `program` with `output`. First registered match wins.
    pub fn respond_to(mut self, program: &str, output: CommandOutput) -> Self {
        self.responses.push((program.to_string(), output));
        self
    }

    /// Make `probe(program)` report the tool as absent.
    pub fn without_tool(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    pub fn with_elevation(mut self, elevation: Elevation) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.lock().clone()
    }

    /// Only the argv of `run` calls, in order.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                Invocation::Run(argv) => Some(argv.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Invocation>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn program_of<'a>(&self, argv: &'a [String]) -> Option<&'a str> {
        let first = argv.first()?;
        match self.elevation.program() {
            Some(prefix) if first == prefix => argv.get(1).map(String::as_str),
            _ => Some(first.as_str()),
        }
    }
}

impl CommandGateway for RecordingGateway {
    fn run(&self, argv: &[String]) -> CommandOutput {
        self.lock().push(Invocation::Run(argv.to_vec()));
        let program = self.program_of(argv);
        self.responses
            .iter()
            .find(|(p, _)| Some(p.as_str()) == program)
            .map(|(_, out)| out.clone())
            .unwrap_or_default()
    }

    fn probe(&self, program: &str) -> bool {
        !self.missing.contains(program)
    }

    fn privileged_write(&self, path: &Path, content: &str) -> CommandOutput {
        self.lock().push(Invocation::PrivilegedWrite {
            path: path.to_path_buf(),
            content: content.to_string(),
        });
        CommandOutput::default()
    }

    fn user_write(&self, path: &Path, content: &str) -> Result<PathBuf> {
        self.lock().push(Invocation::UserWrite {
            path: path.to_path_buf(),
            content: content.to_string(),
        });
        Ok(path.to_path_buf())
    }

    fn elevation(&self) -> Elevation {
        self.elevation
    }
}
