//! External tool execution.
//!
//! Every macOS tool the pipeline drives (`hdiutil`, `SetFile`, `osascript`,
//! `Rez`, `codesign`, `security`) goes through [`run`] or [`output`], so
//! failures carry the full command line and the tool's stderr.

use crate::bundler::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::process::{Output, Stdio};

/// Runs `program` and fails with [`Error::CommandFailed`] on a non-zero exit.
pub async fn run<I, S>(program: &str, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args = collect_args(args);
    let output = spawn(program, &args).await?;

    if !output.status.success() {
        return Err(Error::CommandFailed {
            command: command_line(program, &args),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

/// Runs `program` and returns its output regardless of the exit status.
///
/// Only failing to start the process is an error.
pub async fn output<I, S>(program: &str, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args = collect_args(args);
    spawn(program, &args).await
}

fn collect_args<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter().map(|arg| arg.as_ref().to_os_string()).collect()
}

async fn spawn(program: &str, args: &[OsString]) -> Result<Output> {
    log::debug!("Running {}", command_line(program, args));

    tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::GenericError(format!("Failed to execute {program}: {e}")))
}

/// Renders a command line for messages, quoting arguments with spaces.
pub fn command_line(program: &str, args: &[OsString]) -> String {
    let mut line = program.to_string();
    for arg in args {
        let arg = arg.to_string_lossy();
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(&arg.replace('"', "\\\""));
            line.push('"');
        } else {
            line.push_str(&arg);
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_quotes_spaces() {
        let args: Vec<OsString> = ["convert", "My App 1.0.dmg", ""]
            .iter()
            .map(OsString::from)
            .collect();
        assert_eq!(
            command_line("hdiutil", &args),
            r#"hdiutil convert "My App 1.0.dmg" """#
        );
    }

    #[tokio::test]
    async fn run_reports_failure_with_stderr() {
        let err = run("sh", ["-c", "echo broken >&2; exit 3"]).await.unwrap_err();
        match err {
            Error::CommandFailed { command, stderr } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn output_ignores_exit_status() {
        let out = output("sh", ["-c", "echo hi; exit 1"]).await.unwrap();
        assert!(!out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hi");
    }

    #[tokio::test]
    async fn missing_program_is_generic_error() {
        let err = run("create-dmg-no-such-tool", Vec::<&str>::new()).await.unwrap_err();
        assert!(err.to_string().contains("create-dmg-no-such-tool"));
    }
}
