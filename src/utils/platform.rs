use crate::error::{PickerError, Result};
use std::fmt;
use std::process::Command;
use std::str::FromStr;

/// How privileged commands are elevated.
///
/// `None` runs them as the current user, which is what tests and root
/// shells want.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Elevation {
    #[default]
    Sudo,
    Doas,
    None,
}

impl Elevation {
    pub fn program(self) -> Option<&'static str> {
        match self {
            Self::Sudo => Some("sudo"),
            Self::Doas => Some("doas"),
            Self::None => None,
        }
    }

    /// Prefix `argv` with the elevation program, if any.
    pub fn wrap(self, argv: Vec<String>) -> Vec<String> {
        match self.program() {
            Some(prog) => std::iter::once(prog.to_string()).chain(argv).collect(),
            None => argv,
        }
    }
}

impl fmt::Display for Elevation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sudo => write!(f, "sudo"),
            Self::Doas => write!(f, "doas"),
            Self::None => write!(f, "none"),
        }
    }
}

impl FromStr for Elevation {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sudo" => Ok(Self::Sudo),
            "doas" => Ok(Self::Doas),
            "none" | "off" => Ok(Self::None),
            other => Err(PickerError::ConfigError(format!(
                "Unknown elevation '{}'. Valid: sudo, doas, none",
                other
            ))),
        }
    }
}

/// Build the argv for `sh -c <script>`, elevated when requested.
pub fn shell_argv(script: &str, elevation: Elevation) -> Vec<String> {
    elevation.wrap(vec!["sh".to_string(), "-c".to_string(), script.to_string()])
}

/// Build a direct program invocation from an argv.
pub fn build_program_command(argv: &[String]) -> Result<Command> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| PickerError::Other("Cannot run an empty command line".to_string()))?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}
