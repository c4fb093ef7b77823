//! ipmitool subprocess executor.
//! Spawns ipmitool against a remote BMC over lanplus with a per-call timeout.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::AdapterError;

/// Exit status and captured text of one external invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful exit with the given stdout. Used by runners that fake the BMC.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            status: "exit status: 0".to_string(),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed exit with the given stderr.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            status: "exit status: 1".to_string(),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// stdout followed by stderr.
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// Turn a non-zero exit into [`AdapterError::Failed`], otherwise return stdout.
    pub fn into_stdout(self, command: &str) -> Result<String, AdapterError> {
        if self.success {
            Ok(self.stdout)
        } else {
            Err(AdapterError::Failed {
                command: command.to_string(),
                status: self.status.clone(),
                output: self.combined(),
            })
        }
    }
}

/// Black-box execution of one ipmitool call. The argument vector excludes
/// the connection prefix, which the runner owns.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn invoke(&self, args: &[String]) -> Result<CommandOutput, AdapterError>;
}

/// Connection parameters for `ipmitool -I lanplus`.
#[derive(Debug, Clone)]
pub struct LanplusTarget {
    pub host: String,
    pub username: String,
    pub password: String,
}

/// Production runner: `ipmitool -I lanplus -H <host> -U <user> -P <pass> <args>`.
pub struct IpmitoolRunner {
    target: LanplusTarget,
    timeout: Duration,
}

impl IpmitoolRunner {
    pub fn new(target: LanplusTarget, timeout: Duration) -> Self {
        Self { target, timeout }
    }

    /// Build an ipmitool Command with the lanplus interface flags.
    fn build_ipmitool_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("ipmitool");
        cmd.args([
            "-I",
            "lanplus",
            "-H",
            &self.target.host,
            "-U",
            &self.target.username,
            "-P",
            &self.target.password,
        ]);
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl CommandRunner for IpmitoolRunner {
    async fn invoke(&self, args: &[String]) -> Result<CommandOutput, AdapterError> {
        let description = describe(args);
        let mut cmd = self.build_ipmitool_command();
        cmd.args(args);

        // Never log the full argument vector, it carries the password.
        trace!("Executing: {} (host {})", description, self.target.host);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result.map_err(|source| AdapterError::Spawn {
                command: description.clone(),
                source,
            })?,
            Err(_) => {
                return Err(AdapterError::Timeout {
                    command: description,
                    secs: self.timeout.as_secs(),
                })
            }
        };

        let result = CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.success {
            debug!("{} returned {}", description, result.status);
        }

        Ok(result)
    }
}

/// Human readable form of an ipmitool call for logs and errors.
pub fn describe(args: &[String]) -> String {
    format!("ipmitool {}", args.join(" "))
}
