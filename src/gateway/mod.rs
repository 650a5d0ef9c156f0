//! # Command gateway
//!
//! Every external process and every write outside the data directory goes
//! through [`CommandGateway`]. The trait exists so the apply path can be
//! exercised against a [`RecordingGateway`] instead of a real host.
//!
//! Failures of external programs are never errors here: they come back as
//! exit codes with the captured output. Only local IO problems in
//! [`CommandGateway::user_write`] surface as `Err`.

mod exec;
pub mod recording;
mod writes;

pub use recording::{Invocation, RecordingGateway};
pub use writes::backup_timestamp;

use crate::error::Result;
use crate::utils::platform::Elevation;
use std::path::{Path, PathBuf};

/// Exit status reported when the program is not on PATH.
pub const RC_NOT_FOUND: i32 = 127;
/// Exit status reported when the program exists but could not be started.
pub const RC_NOT_EXECUTABLE: i32 = 126;

/// Exit code and merged stdout/stderr of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub code: i32,
    pub output: String,
}

impl CommandOutput {
    pub fn new(code: i32, output: impl Into<String>) -> Self {
        Self {
            code,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }
}

pub trait CommandGateway: Send + Sync {
    /// Run `argv` to completion, capturing output. Never fails.
    fn run(&self, argv: &[String]) -> CommandOutput;

    /// Whether `program` resolves on the executable search path.
    fn probe(&self, program: &str) -> bool;

    /// Replace `path` with `content` with elevated privileges, keeping a
    /// timestamped copy of any previous file next to it.
    fn privileged_write(&self, path: &Path, content: &str) -> CommandOutput;

    /// Write a file in user scope (`~` is expanded), keeping a timestamped
    /// copy of any previous file. Returns the resolved path.
    fn user_write(&self, path: &Path, content: &str) -> Result<PathBuf>;

    /// Elevation used for privileged argv built by callers.
    fn elevation(&self) -> Elevation;
}

/// Gateway backed by real processes and the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct SystemGateway {
    elevation: Elevation,
}

impl SystemGateway {
    pub fn new(elevation: Elevation) -> Self {
        Self { elevation }
    }
}

impl CommandGateway for SystemGateway {
    fn run(&self, argv: &[String]) -> CommandOutput {
        exec::run_capture(argv)
    }

    fn probe(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn privileged_write(&self, path: &Path, content: &str) -> CommandOutput {
        let argv = writes::privileged_write_argv(path, content, self.elevation);
        let out = exec::run_capture(&argv);
        if out.success() {
            tracing::info!(path = %path.display(), "privileged write done");
        } else {
            tracing::warn!(path = %path.display(), rc = out.code, "privileged write failed");
        }
        out
    }

    fn user_write(&self, path: &Path, content: &str) -> Result<PathBuf> {
        writes::user_write(path, content)
    }

    fn elevation(&self) -> Elevation {
        self.elevation
    }
}
