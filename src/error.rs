use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error at '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    StdIoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// A required external tool is not on PATH.
    #[error("Tool not found: {0}")]
    ToolMissing(String),

    /// An external command exited non-zero.
    #[error("Command '{command}' failed with rc={rc}")]
    CommandFailed { command: String, rc: i32 },

    /// A cache document could not be read; it is rebuilt from empty.
    #[error("Cache file '{path}' is unreadable: {reason}")]
    CacheCorrupt { path: PathBuf, reason: String },

    /// A history block did not match the header grammar.
    #[error("Malformed history block: {0}")]
    HistoryCorrupt(String),

    /// The plan failed conflict validation; nothing was executed.
    #[error("Plan violates {} conflict rule(s):\n{}", .0.len(), .0.join("\n"))]
    ConflictViolation(Vec<String>),

    #[error("Apply requested while engine is {0}")]
    ApplyBusy(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Path resolution or validation error
    #[error("Path error: {0}")]
    PathError(String),

    /// The coordinating worker has shut down.
    #[error("Session closed")]
    SessionClosed,

    #[error("Operation interrupted by user")]
    Interrupted,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PickerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_violation_lists_every_rule() {
        let err = PickerError::ConflictViolation(vec![
            "greeter: too many selected: [greetd, sddm]".to_string(),
            "audio: expected exactly 1, found: none".to_string(),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("Plan violates 2 conflict rule(s)"));
        assert!(text.contains("greeter"));
        assert!(text.contains("audio"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PickerError = io_err.into();
        assert!(matches!(err, PickerError::StdIoError(_)));
    }
}
