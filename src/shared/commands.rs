use crate::connection::ConnectionTarget;
use crate::errors::{BackupToolError, Result};
use crate::shared::constants::{CONTAINER_DUMP_DIR, RESTORE_TOOL};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Quote a value as one literal POSIX shell word.
///
/// Wraps in single quotes and turns each embedded `'` into `'\''`.
pub fn shell_escape(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// The `myloader` invocation run inside the restore container
#[derive(Debug, Clone)]
pub struct RestoreCommand<'a> {
    target: &'a ConnectionTarget,
    backup_file: &'a str,
}

impl<'a> RestoreCommand<'a> {
    pub fn new(target: &'a ConnectionTarget, backup_file: &'a str) -> Self {
        Self {
            target,
            backup_file,
        }
    }

    /// Path of the backup as seen from inside the container
    pub fn container_path(&self) -> String {
        format!("{}/{}", CONTAINER_DUMP_DIR, self.backup_file)
    }

    /// Shell line for `sh -c`, every dynamic value escaped
    pub fn to_shell_line(&self) -> String {
        self.render(&shell_escape(&self.target.password))
    }

    /// Same line with the password masked, safe for logs
    pub fn to_redacted_line(&self) -> String {
        self.render("'***'")
    }

    fn render(&self, password: &str) -> String {
        [
            RESTORE_TOOL.to_string(),
            "--host".to_string(),
            shell_escape(&self.target.host),
            "--port".to_string(),
            shell_escape(&self.target.port),
            "--user".to_string(),
            shell_escape(&self.target.user),
            "--password".to_string(),
            password.to_string(),
            "--database".to_string(),
            shell_escape(&self.target.database),
            "--drop-table".to_string(),
            "--drop-database".to_string(),
            "--stream".to_string(),
            "--verbose 3".to_string(),
            "--protocol tcp".to_string(),
            format!("< {}", shell_escape(&self.container_path())),
        ]
        .join(" ")
    }
}

/// Bind mount from a host directory into the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub host_path: PathBuf,
    pub container_path: String,
}

/// A disposable container run: image, mounts and the `sh -c` line
#[derive(Debug, Clone)]
pub struct ContainerInvocation {
    pub image: String,
    pub mounts: Vec<Mount>,
    pub shell_command: String,
}

impl ContainerInvocation {
    /// Arguments after the runtime binary.
    ///
    /// The container is removed on exit and the command goes through
    /// `sh -c` so the input redirect resolves inside the container.
    pub fn runtime_args(&self) -> Vec<String> {
        let mut args = vec!["run".to_string(), "--rm".to_string()];
        for mount in &self.mounts {
            args.push("-v".to_string());
            args.push(format!(
                "{}:{}",
                mount.host_path.display(),
                mount.container_path
            ));
        }
        args.push(self.image.clone());
        args.push("sh".to_string());
        args.push("-c".to_string());
        args.push(self.shell_command.clone());
        args
    }
}

/// How the isolated execution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    /// Exit code, `None` when killed by a signal
    Failure(Option<i32>),
}

impl From<std::process::ExitStatus> for ExitOutcome {
    fn from(status: std::process::ExitStatus) -> Self {
        if status.success() {
            ExitOutcome::Success
        } else {
            ExitOutcome::Failure(status.code())
        }
    }
}

/// Runs a container and reports how it exited
#[async_trait]
pub trait ContainerRunner: Send + Sync {
    async fn run(&self, invocation: &ContainerInvocation) -> Result<ExitOutcome>;
}

/// Container runner that shells out to the docker CLI (or a compatible one)
#[derive(Debug, Clone)]
pub struct DockerRunner {
    binary: String,
}

impl DockerRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl ContainerRunner for DockerRunner {
    async fn run(&self, invocation: &ContainerInvocation) -> Result<ExitOutcome> {
        debug!(binary = %self.binary, image = %invocation.image, "Starting restore container");

        // Output goes straight to the operator's terminal
        let status = Command::new(&self.binary)
            .args(invocation.runtime_args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| {
                BackupToolError::CommandNotFound(format!("Failed to execute {}: {}", self.binary, e))
            })?;

        Ok(status.into())
    }
}
