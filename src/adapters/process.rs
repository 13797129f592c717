use crate::domain::model::PgCommand;
use crate::domain::ports::{CommandRunner, ExitStatus};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Spawns the real binaries found on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &PgCommand) -> Result<ExitStatus> {
        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if let Some(password) = &command.password {
            process.env("PGPASSWORD", password);
        }

        let status = process.status().await.inspect_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                tracing::error!("'{}' not found on PATH", command.program);
            }
        })?;

        Ok(ExitStatus {
            code: status.code(),
        })
    }
}
