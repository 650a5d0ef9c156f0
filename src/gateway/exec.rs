use super::{CommandOutput, RC_NOT_EXECUTABLE, RC_NOT_FOUND};
use crate::utils::platform::build_program_command;
use crate::utils::sanitize::render_argv;
use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};

/// Execute a command to completion (non-interactive, no timeout).
///
/// stdout and stderr are captured separately and merged stdout-first.
pub(super) fn run_capture(argv: &[String]) -> CommandOutput {
    let mut cmd = match build_program_command(argv) {
        Ok(cmd) => cmd,
        Err(e) => return CommandOutput::new(RC_NOT_FOUND, e.to_string()),
    };

    tracing::debug!(command = %render_argv(argv), "running");

    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output();

    match output {
        Ok(output) => {
            let mut merged = String::from_utf8_lossy(&output.stdout).into_owned();
            merged.push_str(&String::from_utf8_lossy(&output.stderr));
            let code = exit_code(output.status);
            tracing::debug!(command = %argv[0], rc = code, "finished");
            CommandOutput::new(code, merged)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            CommandOutput::new(RC_NOT_FOUND, format!("Command not found: {}", argv[0]))
        }
        Err(e) => CommandOutput::new(
            RC_NOT_EXECUTABLE,
            format!("Failed to start {}: {}", argv[0], e),
        ),
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_program_reports_127() {
        let out = run_capture(&argv(&["pkgpicker-definitely-not-a-binary", "-x"]));
        assert_eq!(out.code, 127);
        assert!(out.output.contains("Command not found"));
    }

    #[test]
    fn output_and_exit_code_are_captured() {
        let out = run_capture(&argv(&["sh", "-c", "echo out; echo err >&2; exit 3"]));
        assert_eq!(out.code, 3);
        assert!(out.output.contains("out"));
        assert!(out.output.contains("err"));
    }
}
