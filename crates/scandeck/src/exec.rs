//! External process execution.
//!
//! Every hardware interaction goes through here: the scan, merge and print
//! executables are spawned as child processes with both output streams
//! captured. A nonzero exit status is data for the caller to interpret, never
//! an `Err`; the only failure mode is not being able to launch the program at
//! all.

use crate::error::ServiceError;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// Captured result of one external command invocation.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// User-facing detail: stdout on success, stderr otherwise.
    pub fn detail(&self) -> &str {
        if self.success() {
            &self.stdout
        } else {
            &self.stderr
        }
    }

    /// Both streams concatenated, for tools that report errors on either.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Run an executable and capture exit code, stdout and stderr.
///
/// Output is decoded as lossy UTF-8; a child killed by a signal reports exit
/// code -1.
pub async fn run(program: &str, args: &[String]) -> Result<ProcessOutcome, ServiceError> {
    info!("Executing: {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| ServiceError::Spawn {
            program: program.to_string(),
            source,
        })?;

    Ok(ProcessOutcome {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run an executable through the privilege-elevation wrapper.
///
/// Only used by administrative operations (service install); the scan
/// pipelines never need it.
pub async fn run_privileged(program: &str, args: &[String]) -> Result<ProcessOutcome, ServiceError> {
    let mut wrapped = Vec::with_capacity(args.len() + 1);
    wrapped.push(program.to_string());
    wrapped.extend_from_slice(args);
    run("sudo", &wrapped).await
}
