//! Runs local commands requested through the control surface.
//!
//! Output is discarded and the exit status is only logged; nothing flows
//! back to the HTTP caller.

use core::error::Error;
use std::process::ExitStatus;
use std::process::Stdio;

use error_stack::Report;
use error_stack::ResultExt;
use tokio::process::Command;
use tracing::info;

#[derive(Debug, derive_more::Display)]
pub enum ExecError {
    #[display("Empty command")]
    EmptyCommand,
    #[display("Failed to run {program}")]
    SpawnFailed { program: String },
    #[display("{program} exited with {status}")]
    NonZeroExit { program: String, status: ExitStatus },
}

impl Error for ExecError {}

/// Split a command line on single spaces into program and arguments.
///
/// Consecutive spaces yield empty arguments; no quoting is understood.
pub fn split_command(cmdline: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = cmdline.split(' ');
    let program = parts.next().filter(|program| !program.is_empty())?;
    Some((program, parts.collect()))
}

/// Run a command line to completion.
pub async fn run_command(cmdline: &str) -> Result<ExitStatus, Report<ExecError>> {
    let (program, args) = split_command(cmdline).ok_or(ExecError::EmptyCommand)?;

    info!(program, ?args, "Executing command");

    let status = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .change_context_lazy(|| ExecError::SpawnFailed {
            program: program.to_string(),
        })?;

    if !status.success() {
        return Err(Report::new(ExecError::NonZeroExit {
            program: program.to_string(),
            status,
        }));
    }

    Ok(status)
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn split_program_and_arguments() {
        assert_eq!(
            split_command("docker run -d nginx"),
            Some(("docker", vec!["run", "-d", "nginx"]))
        );
        assert_eq!(split_command("ls"), Some(("ls", vec![])));
        assert_eq!(split_command("echo  a"), Some(("echo", vec!["", "a"])));
    }

    #[test]
    fn split_rejects_empty_program() {
        assert_eq!(split_command(""), None);
        assert_eq!(split_command(" ls"), None);
    }

    #[tokio::test]
    async fn run_successful_command() {
        let status = run_command("true").await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn run_reports_failures() {
        let err = run_command("false").await.unwrap_err();
        assert!(matches!(err.current_context(), ExecError::NonZeroExit { .. }));

        let err = run_command("kubeproxy-no-such-program --flag").await.unwrap_err();
        assert!(matches!(err.current_context(), ExecError::SpawnFailed { .. }));

        let err = run_command("").await.unwrap_err();
        assert!(matches!(err.current_context(), ExecError::EmptyCommand));
    }
}
